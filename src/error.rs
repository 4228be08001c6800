use miette::Diagnostic;
use thiserror::Error;

/// Main error type for arlunio operations
#[derive(Error, Diagnostic, Debug)]
pub enum ArlunioError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(arlunio::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(arlunio::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Raised while a definition's parameter list is being classified.
    #[error("{message}")]
    #[diagnostic(code(arlunio::declaration))]
    Declaration {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Raised while an instance is built from attribute overrides.
    #[error("{message}")]
    #[diagnostic(code(arlunio::construction))]
    Construction {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Evaluation error: {message}")]
    #[diagnostic(code(arlunio::evaluation))]
    Evaluation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Image construction and channel assignment failures.
    #[error("{message}")]
    #[diagnostic(code(arlunio::image))]
    Image {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl ArlunioError {
    pub(crate) fn declaration(message: impl Into<String>) -> Self {
        Self::Declaration {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn image(message: impl Into<String>) -> Self {
        Self::Image {
            message: message.into(),
            help: None,
        }
    }

    /// Attach help text to any variant that carries it.
    pub(crate) fn with_help(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::Parse { help, .. }
            | Self::Declaration { help, .. }
            | Self::Construction { help, .. }
            | Self::Evaluation { help, .. }
            | Self::Image { help, .. } => *help = Some(text.into()),
            Self::Io { .. } => {}
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, ArlunioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_message_is_verbatim() {
        let err = ArlunioError::declaration("Unknown input 'x'");
        assert_eq!(err.to_string(), "Unknown input 'x'");
    }

    #[test]
    fn test_with_help() {
        let err = ArlunioError::evaluation("bad signature").with_help("use x or y");
        match err {
            ArlunioError::Evaluation { help, .. } => assert_eq!(help.as_deref(), Some("use x or y")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
