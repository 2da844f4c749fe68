#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(#[from] rsc_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("Invalid request path: {0}")]
    InvalidPath(#[from] url::ParseError),
}

impl Error {
    /// Whether the page asked for does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Render(err) if err.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
