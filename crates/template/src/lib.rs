//! Templates for the texpress document service.
//!
//! A template is raw typesetting markup with substitution sites marked by a
//! configurable [`Delimiters`] pair. Parsing produces an immutable
//! [`Template`] that can be shared across requests and rendered any number
//! of times against a details mapping.

mod delimiters;
mod error;
mod key;
mod template;
mod translate;

pub use delimiters::Delimiters;
pub use error::TemplateError;
pub use key::{content_key, identifier_key};
pub use template::{Details, Template};
