//! Application errors

/// Errors raised while starting an application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No `run` phase was supplied.
    #[error("Application entry point is not a function: no run function was declared")]
    MissingEntryPoint,

    /// The supplied options were not a JSON object.
    #[error("Invalid application options: {0}")]
    InvalidOptions(String),

    /// The background phase thread could not be created.
    #[error("Failed to spawn phase thread: {0}")]
    Spawn(String),
}
