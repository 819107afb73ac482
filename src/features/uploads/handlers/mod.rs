pub mod admin_handlers;
pub mod upload_handlers;
