use crate::delimiters::Delimiters;
use crate::error::{TemplateError, describe};
use crate::translate::translate;
use std::io::Write;
use tera::{Context, Tera};

/// The data a template renders against: a JSON object.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// A parsed, render-ready template.
///
/// Immutable once parsed; share it behind an `Arc`.
#[derive(Debug)]
pub struct Template {
    name: String,
    engine: Tera,
}

impl Template {
    /// Parses `source` using `delimiters` to find substitution sites.
    ///
    /// `name` identifies the template in diagnostics; callers use the cache
    /// key.
    pub fn parse(
        name: impl Into<String>,
        source: &str,
        delimiters: &Delimiters,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let parse_error = |diagnostic: String| TemplateError::Parse {
            name: name.clone(),
            diagnostic,
        };

        let engine_source = translate(source, delimiters).map_err(parse_error)?;

        let mut engine = Tera::default();
        engine.autoescape_on(vec![]);
        engine
            .add_raw_template(&name, &engine_source)
            .map_err(|e| parse_error(describe(&e)))?;

        tracing::debug!(template = %name, bytes = source.len(), "parsed template");
        Ok(Self { name, engine })
    }

    /// Parses raw bytes, which must be UTF-8.
    pub fn parse_bytes(
        name: impl Into<String>,
        source: &[u8],
        delimiters: &Delimiters,
    ) -> Result<Self, TemplateError> {
        let name = name.into();
        let source = std::str::from_utf8(source).map_err(|e| TemplateError::Parse {
            name: name.clone(),
            diagnostic: format!("template is not valid UTF-8: {}", e),
        })?;
        Self::parse(name, source, delimiters)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders against `details` into `writer`.
    pub fn render_to(&self, details: &Details, writer: impl Write) -> Result<(), TemplateError> {
        let context = Context::from_serialize(details).map_err(|e| self.render_error(&e))?;
        self.engine
            .render_to(&self.name, &context, writer)
            .map_err(|e| self.render_error(&e))
    }

    /// Renders against `details` into memory.
    pub fn render(&self, details: &Details) -> Result<Vec<u8>, TemplateError> {
        let mut out = Vec::new();
        self.render_to(details, &mut out)?;
        Ok(out)
    }

    fn render_error(&self, err: &tera::Error) -> TemplateError {
        TemplateError::Render {
            name: self.name.clone(),
            diagnostic: describe(err),
        }
    }
}
