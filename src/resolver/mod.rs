//! Request-scoped resolution of templates and details payloads.
//!
//! Resources are resolved by [`texpress_resource::ResourceMaterializer`];
//! the two resolvers here share its [`texpress_resource::Mirror`].

mod details;
mod templates;

pub use details::DetailsResolver;
pub use templates::TemplateStore;
