use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use texpress_cache::CacheError;
use texpress_resource::ResourceError;
use texpress_template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("error while decoding details json {id}")]
    Details { id: String, diagnostic: String },

    #[error("compilation failed: {message}")]
    Compile { message: String, output: String },

    #[error("compilation exceeded {0:?} and was stopped")]
    Timeout(std::time::Duration),

    #[error("error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Template(TemplateError::PartialDelimiters) => StatusCode::BAD_REQUEST,
            Self::Resource(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic detail for the `data` field of the error body.
    fn data(&self) -> Option<String> {
        match self {
            Self::Template(e) => e.diagnostic().map(str::to_string),
            Self::Details { diagnostic, .. } => Some(diagnostic.clone()),
            Self::Compile { output, .. } if !output.is_empty() => Some(output.clone()),
            Self::Io { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::info!("rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            data: self.data(),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use texpress_resource::Kind;

    #[test]
    fn test_client_errors_are_bad_request() {
        let not_found = ServiceError::from(ResourceError::NotFound {
            kind: Kind::Template,
            id: "welcome".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found.to_string(), "template with id welcome not found");

        let partial = ServiceError::from(TemplateError::PartialDelimiters);
        assert_eq!(partial.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ServiceError::Decode("bad base64".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_server_errors_carry_diagnostics() {
        let parse = ServiceError::from(TemplateError::Parse {
            name: "t".to_string(),
            diagnostic: "unclosed #!".to_string(),
        });
        assert_eq!(parse.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(parse.data().as_deref(), Some("unclosed #!"));

        let compile = ServiceError::Compile {
            message: "exit status: 1".to_string(),
            output: "! Undefined control sequence.".to_string(),
        };
        assert_eq!(compile.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(compile.data().as_deref(), Some("! Undefined control sequence."));
    }
}
