//! Local-disk resolution for the texpress document service.
//!
//! ## Components
//!
//! - [`Mirror`]: the root directory as a local copy of the remote store.
//!   Every by-identifier lookup (templates, resources, details payloads)
//!   goes disk first, then store, persisting what the store returns.
//! - [`ResourceMaterializer`]: resolves resource identifiers to paths through
//!   an LRU path cache and the mirror, then links them into a workspace.

mod error;
mod materializer;
mod mirror;

pub use error::{Kind, ResourceError};
pub use materializer::ResourceMaterializer;
pub use mirror::Mirror;
