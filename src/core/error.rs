use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Datasource '{0}.{1}' not found")]
    DatasourceNotFound(String, String),

    #[error("Group '{0}' not found")]
    GroupNotFound(String),

    #[error("Invalid config for '{0}': {1}")]
    InvalidConfig(String, String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Teardown error: {0}")]
    TeardownError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl<T> From<std::sync::PoisonError<T>> for ProxyError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
