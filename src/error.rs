use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("page is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("content nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("no pages to process")]
    NoPages,

    #[error("settings: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
