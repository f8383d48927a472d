use thiserror::Error;

use crate::location::interface::PermissionKind;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Permission denied: {0}")]
    PermissionDenied(PermissionKind),
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Emission failed: {0}")]
    EmissionFailed(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
