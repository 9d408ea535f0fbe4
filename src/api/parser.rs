use crate::model::Run;
use color_eyre::eyre::Result;
use serde::Deserialize;

/// An empty list is encoded as `null` by the server.
pub fn parse_runs(json: &str) -> Result<Vec<Run>> {
    let runs: Option<Vec<Run>> = serde_json::from_str(json)?;
    Ok(runs.unwrap_or_default())
}

pub fn parse_run(json: &str) -> Result<Run> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Deserialize)]
struct VersionResponse {
    #[serde(default)]
    version: String,
}

pub fn parse_version(json: &str) -> Option<String> {
    serde_json::from_str::<VersionResponse>(json)
        .ok()
        .map(|v| v.version)
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Message for a non-2xx response, preferring the server's `{"error": ...}` body.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(resp) if !resp.error.is_empty() => resp.error,
        _ => format!("HTTP {status}"),
    }
}
