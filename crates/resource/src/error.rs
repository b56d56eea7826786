use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// What an identifier names; only used to word messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Template,
    Resource,
    Details,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Template => "template",
            Kind::Resource => "resource",
            Kind::Details => "details json",
        })
    }
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: Kind, id: String },

    #[error("invalid {kind} id {id:?}")]
    InvalidIdentifier { kind: Kind, id: String },

    #[error("error while fetching {kind} {id} from {store}: {message}")]
    Store {
        kind: Kind,
        id: String,
        store: &'static str,
        message: String,
    },

    #[error("error while writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while linking {} into workspace: {source}", target.display())]
    Link {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResourceError {
    /// True for failures caused by the caller (bad or unknown identifier).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ResourceError::NotFound { .. } | ResourceError::InvalidIdentifier { .. }
        )
    }
}
