//! Per-request document generation.
//!
//! - [`JobRequest`]: everything a caller may supply, inline or by identifier
//! - [`Pipeline`]: resolves a request into a job and compiles it
//! - [`Artifact`]: the compiled document, read back into memory
//!
//! Resolution within one request is strictly sequential: workspace, template,
//! resources, details, compilation. Each step may produce inputs the next
//! step needs, and the first failure aborts the request.

mod request;
mod runner;

pub use request::{Artifact, JobRequest};
pub use runner::Pipeline;
