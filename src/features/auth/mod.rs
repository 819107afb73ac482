mod authenticator;

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;

pub use authenticator::{AdminAuthenticator, AuthError, StaticCredentialAuthenticator};
