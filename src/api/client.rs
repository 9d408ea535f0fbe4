use crate::api::parser;
use crate::model::Run;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::{Client, Url};
use std::time::Duration;

/// Read-only view of a tfjournal server.
#[async_trait]
pub trait RunsApi: Send + Sync {
    async fn list_runs(&self, query: &[(&'static str, String)]) -> Result<Vec<Run>>;
    async fn get_run(&self, id: &str) -> Result<Run>;
    /// `None` when the run has no output or the request failed.
    async fn get_output(&self, id: &str) -> Option<String>;
    /// `None` on any failure.
    async fn get_version(&self) -> Option<String>;
}

pub struct HttpRunsApi {
    client: Client,
    base: Url,
}

impl HttpRunsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base =
            Url::parse(base_url).wrap_err_with(|| format!("invalid server URL {base_url:?}"))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        tracing::debug!("GET {url}");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(eyre!(parser::error_message(status.as_u16(), &body)));
        }
        Ok(body)
    }

    async fn fetch_output(&self, id: &str) -> Result<String> {
        let url = endpoint(&self.base, &["api", "runs", id, "output"], &[])?;
        self.get_text(url).await
    }

    async fn fetch_version(&self) -> Result<Option<String>> {
        let url = endpoint(&self.base, &["api", "version"], &[])?;
        Ok(parser::parse_version(&self.get_text(url).await?))
    }
}

#[async_trait]
impl RunsApi for HttpRunsApi {
    async fn list_runs(&self, query: &[(&'static str, String)]) -> Result<Vec<Run>> {
        let url = endpoint(&self.base, &["api", "runs"], query)?;
        parser::parse_runs(&self.get_text(url).await?)
    }

    async fn get_run(&self, id: &str) -> Result<Run> {
        let url = endpoint(&self.base, &["api", "runs", id], &[])?;
        parser::parse_run(&self.get_text(url).await?)
    }

    async fn get_output(&self, id: &str) -> Option<String> {
        match self.fetch_output(id).await {
            Ok(body) if !body.is_empty() => Some(body),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("no output for {id}: {e}");
                None
            }
        }
    }

    async fn get_version(&self) -> Option<String> {
        self.fetch_version().await.unwrap_or_else(|e| {
            tracing::debug!("version unavailable: {e}");
            None
        })
    }
}

/// Appends path segments (percent-encoded) and, when non-empty, the query
/// string to `base`. A path prefix on `base` is kept.
pub fn endpoint(base: &Url, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| eyre!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
}
