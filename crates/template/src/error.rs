use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("only received one delimiter; need none or both")]
    PartialDelimiters,

    #[error("failed to parse template {name}")]
    Parse { name: String, diagnostic: String },

    #[error("failed to render template {name}")]
    Render { name: String, diagnostic: String },
}

impl TemplateError {
    /// The underlying engine diagnostic, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            TemplateError::PartialDelimiters => None,
            TemplateError::Parse { diagnostic, .. } | TemplateError::Render { diagnostic, .. } => {
                Some(diagnostic)
            }
        }
    }
}

/// Flattens an error and its sources into one line. Tera reports the useful
/// part (missing variable, unexpected token) in the source chain.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
