use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Path escapes the store root: {0}")]
    PathEscape(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a folder: {0}")]
    NotAFolder(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Could not derive a unique name for: {0}")]
    NameSpaceExhausted(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Assistant error: {0}")]
    Assist(String),
}

/// Stable tag for each failure category, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidIdentifier,
    PathEscape,
    NotFound,
    NotAFile,
    NotAFolder,
    Conflict,
    NameSpaceExhausted,
    BadRequest,
    IoFailure,
    Config,
    Assist,
}

impl ErrorKind {
    /// Conventional HTTP status for adapters exposing the store over a network API.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidIdentifier
            | ErrorKind::PathEscape
            | ErrorKind::NotAFile
            | ErrorKind::NotAFolder
            | ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::NameSpaceExhausted
            | ErrorKind::IoFailure
            | ErrorKind::Config
            | ErrorKind::Assist => 500,
        }
    }
}

impl NotesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotesError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            NotesError::PathEscape(_) => ErrorKind::PathEscape,
            NotesError::NotFound(_) => ErrorKind::NotFound,
            NotesError::NotAFile(_) => ErrorKind::NotAFile,
            NotesError::NotAFolder(_) => ErrorKind::NotAFolder,
            NotesError::Conflict(_) => ErrorKind::Conflict,
            NotesError::NameSpaceExhausted(_) => ErrorKind::NameSpaceExhausted,
            NotesError::BadRequest(_) => ErrorKind::BadRequest,
            NotesError::Io(_) => ErrorKind::IoFailure,
            NotesError::Serialization(_) | NotesError::Config(_) => ErrorKind::Config,
            NotesError::Assist(_) => ErrorKind::Assist,
        }
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_conventional_status() {
        assert_eq!(
            NotesError::NotFound("x".into()).kind().status_code(),
            404
        );
        assert_eq!(NotesError::Conflict("x".into()).kind().status_code(), 409);
        assert_eq!(
            NotesError::PathEscape("..".into()).kind().status_code(),
            400
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(NotesError::from(io).kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NameSpaceExhausted).unwrap();
        assert_eq!(json, "\"name_space_exhausted\"");
    }
}
