use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported element parser: {0}")]
    UnsupportedShape(String),

    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("no such property: {0}")]
    Missing(String),

    #[error("configuration error: {0}")]
    Config(String),
}
