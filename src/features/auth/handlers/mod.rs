mod auth_handlers;

pub use auth_handlers::*;
