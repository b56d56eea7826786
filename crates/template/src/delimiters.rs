use crate::error::TemplateError;
use serde::{Deserialize, Serialize};

/// The open/close markers surrounding substitution sites.
///
/// Part of a template's cache identity: the same text parses differently
/// under different markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub const DEFAULT_LEFT: &'static str = "#!";
    pub const DEFAULT_RIGHT: &'static str = "!#";

    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Result<Self, TemplateError> {
        let (left, right) = (left.into(), right.into());
        if left.is_empty() || right.is_empty() {
            return Err(TemplateError::PartialDelimiters);
        }
        Ok(Self { left, right })
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            left: Self::DEFAULT_LEFT.to_string(),
            right: Self::DEFAULT_RIGHT.to_string(),
        }
    }
}
