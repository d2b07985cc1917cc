use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Environment variable {name} must be a number, got {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("Environment variable {name} must be greater than zero")]
    NotPositive { name: String },
}
