use events_domain::error::EventError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] EventError),

    #[error("{0}")]
    InvalidEvent(String),

    #[error("store: {0}")]
    Store(String),
}

pub type AppResult<T> = Result<T, AppError>;
