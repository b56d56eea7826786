//! Collaborator abstractions shared by the texpress crates.
//!
//! The only external collaborator the resolution core talks to is the
//! durable [`Store`], addressed purely by opaque string identifier.

pub mod filesystem;
pub mod ident;
pub mod store;

pub use filesystem::FilesystemStore;
pub use ident::is_safe_identifier;
pub use store::{Fetched, InMemoryStore, SharedStore, Store, StoreError};
