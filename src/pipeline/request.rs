use texpress_template::{Delimiters, Details};

/// What a caller asked for. Inline values take precedence over identifiers
/// naming the same thing.
#[derive(Debug, Clone, Default)]
pub struct JobRequest {
    pub inline_template: Option<Vec<u8>>,
    pub template_id: Option<String>,
    pub delimiters: Delimiters,
    pub details: Option<Details>,
    pub details_id: Option<String>,
    /// Written straight into the workspace; never cached.
    pub inline_resources: Vec<(String, Vec<u8>)>,
    pub resource_ids: Vec<String>,
}

/// A compiled document.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// File name of the artifact, `<job>.pdf`.
    pub name: String,
    pub bytes: Vec<u8>,
}
