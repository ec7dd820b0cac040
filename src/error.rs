use std::fmt;

#[derive(Debug)]
pub enum AwesomeTableError {
    InvalidLine(String),
    InvalidLineMode(String),
    InvalidAnchor(String),
    InvalidAlign(String),
    InvalidMerge(String),
    CellOutOfRange { row: usize, col: usize },
    EmptyTable,
    Font(String),
    FontNotFound(String),
    Image(String),
    InvalidConfiguration(String),
    Io(std::io::Error),
}

impl fmt::Display for AwesomeTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwesomeTableError::InvalidLine(message) => write!(f, "invalid line: {}", message),
            AwesomeTableError::InvalidLineMode(mode) => {
                write!(f, "invalid line mode '{}'", mode)
            }
            AwesomeTableError::InvalidAnchor(code) => write!(f, "invalid anchor '{}'", code),
            AwesomeTableError::InvalidAlign(code) => {
                write!(f, "invalid alignment code '{}'", code)
            }
            AwesomeTableError::InvalidMerge(message) => write!(f, "invalid merge: {}", message),
            AwesomeTableError::CellOutOfRange { row, col } => {
                write!(f, "no cell at row {} column {}", row, col)
            }
            AwesomeTableError::EmptyTable => write!(f, "a table needs at least one cell"),
            AwesomeTableError::Font(message) => write!(f, "font error: {}", message),
            AwesomeTableError::FontNotFound(name) => write!(f, "font not found: {}", name),
            AwesomeTableError::Image(message) => write!(f, "image error: {}", message),
            AwesomeTableError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            AwesomeTableError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for AwesomeTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AwesomeTableError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AwesomeTableError {
    fn from(value: std::io::Error) -> Self {
        AwesomeTableError::Io(value)
    }
}

impl From<image::ImageError> for AwesomeTableError {
    fn from(value: image::ImageError) -> Self {
        match value {
            image::ImageError::IoError(err) => AwesomeTableError::Io(err),
            other => AwesomeTableError::Image(other.to_string()),
        }
    }
}
