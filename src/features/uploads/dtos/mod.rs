mod upload_dtos;

pub use upload_dtos::*;
