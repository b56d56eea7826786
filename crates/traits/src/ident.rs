//! Identifier validation.
//!
//! Identifiers double as file names under the root directory and inside
//! workspaces, so anything that could resolve outside the directory it is
//! joined onto is refused.

use std::path::{Component, Path};

/// Returns `true` if `id` names a plain relative path with no parent or
/// root components.
pub fn is_safe_identifier(id: &str) -> bool {
    if id.is_empty() || id.contains('\0') {
        return false;
    }
    let path = Path::new(id);
    if path.is_absolute() {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
