mod auth_dtos;

pub use auth_dtos::*;
