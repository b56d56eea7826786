use crate::error::{Result, ServiceError};
use crate::pipeline::JobRequest;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::collections::BTreeMap;
use texpress_template::{Delimiters, Details};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    /// Base64 encoded template source.
    pub template: Option<String>,
    pub details: Option<Details>,
    /// File name to base64 encoded contents.
    pub resources: BTreeMap<String, String>,
    pub delimiters: Option<DelimitersBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DelimitersBody {
    pub left: Option<String>,
    pub right: Option<String>,
}

/// Generation endpoint, `GET` or `POST /generate`.
///
/// Inline values come from a JSON body (read only when the request says it
/// is JSON); identifiers come from the query: `tmpl`, `rsc` (repeatable) and
/// `dtls`. Responds with the compiled PDF.
pub async fn generate(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let request = job_request(&query, &headers, &body)?;
    tracing::info!(
        template_id = request.template_id.as_deref(),
        inline = request.inline_template.is_some(),
        resources = request.resource_ids.len() + request.inline_resources.len(),
        "generation request"
    );

    let artifact = state.pipeline.run(request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", artifact.name),
            ),
        ],
        artifact.bytes,
    ))
}

fn job_request(query: &[(String, String)], headers: &HeaderMap, body: &[u8]) -> Result<JobRequest> {
    let mut request = JobRequest::default();

    if is_json(headers) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ServiceError::BadRequest(
                "request header Content-Type set to application/json; received empty body"
                    .to_string(),
            ));
        }
        let body: GenerateRequest = serde_json::from_slice(body)
            .map_err(|e| ServiceError::Decode(format!("invalid request body: {e}")))?;

        // A delimiters object, once present, must name both sides.
        if let Some(DelimitersBody { left, right }) = body.delimiters {
            request.delimiters =
                Delimiters::new(left.unwrap_or_default(), right.unwrap_or_default())?;
        }
        if let Some(template) = body.template.filter(|t| !t.is_empty()) {
            request.inline_template = Some(decode("template", &template)?);
        }
        request.details = body.details.filter(|d| !d.is_empty());
        for (name, data) in body.resources {
            let bytes = decode(&format!("resource {name}"), &data)?;
            request.inline_resources.push((name, bytes));
        }
    }

    for (key, value) in query {
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "tmpl" if request.template_id.is_none() => request.template_id = Some(value.clone()),
            "dtls" if request.details_id.is_none() => request.details_id = Some(value.clone()),
            "rsc" => request.resource_ids.push(value.clone()),
            _ => {}
        }
    }

    Ok(request)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn decode(what: &str, data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| ServiceError::Decode(format!("invalid base64 in {what}: {e}")))
}
