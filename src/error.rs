use core::fmt;

/// Errors raised while constructing a [`crate::FlowDocument`].
#[derive(Debug)]
pub enum FlowError {
    /// An empty path was supplied to a path-based loader.
    EmptyPath,
    /// The source could not be read.
    Io(std::io::Error),
    /// The markup tokenizer rejected the input.
    Markup {
        /// Human-readable failure detail.
        detail: String,
        /// Byte offset reported by the tokenizer.
        byte_offset: u64,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "document path is empty"),
            Self::Io(err) => write!(f, "document read failed: {}", err),
            Self::Markup {
                detail,
                byte_offset,
            } => write!(f, "markup error at byte {}: {}", byte_offset, detail),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FlowError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
