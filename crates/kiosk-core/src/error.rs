use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Naming errors
    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Unknown menu: {0}")]
    UnknownMenu(String),

    // Argument errors
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
