use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    /// A time entry or capacity the workload aggregator cannot sum.
    #[error("invalid_entry - {0}")]
    InvalidEntry(String),
    /// A task template whose day range is inverted or unrepresentable.
    #[error("invalid_template - {0}")]
    InvalidTemplate(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn invalid_entry<M: Into<String>>(message: M) -> Self {
        Self::InvalidEntry(message.into())
    }

    pub fn invalid_template<M: Into<String>>(message: M) -> Self {
        Self::InvalidTemplate(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::InvalidEntry(_) => "invalid_entry",
            Self::InvalidTemplate(_) => "invalid_template",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::InvalidEntry(message)
            | Self::InvalidTemplate(message) => message,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
