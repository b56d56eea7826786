//! texpress: a document generation service.
//!
//! A request names a template, optional resources and a details mapping,
//! each either inline or by identifier. The template is rendered with the
//! details straight into an external typesetting compiler, which runs in a
//! per-request workspace holding the linked resources; the compiled PDF is
//! returned.
//!
//! ## Crates
//!
//! - `texpress-traits`: the [`Store`](texpress_traits::Store) collaborator
//! - `texpress-cache`: keyed LRU cache and per-key in-flight locks
//! - `texpress-template`: delimiter-aware template parsing and rendering
//! - `texpress-resource`: the local disk mirror and resource linking
//!
//! This crate wires them into a [`Pipeline`] behind an axum router.

pub mod api;
pub mod compiler;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod state;
pub mod workspace;

pub use compiler::Compiler;
pub use config::Config;
pub use error::{Result, ServiceError};
pub use pipeline::{Artifact, JobRequest, Pipeline};
pub use state::AppState;
pub use workspace::Workspace;
