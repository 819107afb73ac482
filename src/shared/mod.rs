pub mod constants;
pub mod format;
pub mod test_helpers;
pub mod types;
pub mod validation;
