use thiserror::Error;

/// Precondition violations raised by [`MoneyAmount`](crate::currency::MoneyAmount).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount exceeds the representable range")]
    Overflow,
    #[error("Subtraction would produce a negative amount")]
    NegativeResult,
    #[error("Invalid scale factor: {0}")]
    InvalidFactor(i64),
}

/// Failures while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Configuration directory unavailable")]
    MissingBaseDir,
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}
