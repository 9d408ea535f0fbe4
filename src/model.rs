//! Run records as served by the tfjournal API.
//!
//! The server is written against Go's `encoding/json`, so a few shapes need
//! normalising on the way in: zero instants (`0001-01-01T00:00:00Z`) mean
//! "not recorded", `null` slices mean empty, and a zero `duration_ms` means
//! no duration was measured.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
    Running,
    Canceled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Running => "running",
            RunStatus::Canceled => "canceled",
            RunStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Local,
    Remote,
    Synced,
    #[default]
    #[serde(other)]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAction {
    Create,
    #[serde(alias = "change")]
    Update,
    Destroy,
    #[default]
    #[serde(other)]
    Other,
}

impl ResourceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceAction::Create => "create",
            ResourceAction::Update => "update",
            ResourceAction::Destroy => "destroy",
            ResourceAction::Other => "other",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ResourceAction::Create => "+",
            ResourceAction::Destroy => "-",
            ResourceAction::Update | ResourceAction::Other => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Changes {
    #[serde(default)]
    pub add: u32,
    #[serde(default)]
    pub change: u32,
    #[serde(default)]
    pub destroy: u32,
    #[serde(default)]
    pub output_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GitInfo {
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub dirty: bool,
    #[serde(default)]
    pub remote: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CiInfo {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub workflow: String,
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Resource {
    pub address: String,
    #[serde(default)]
    pub action: ResourceAction,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default, deserialize_with = "positive_ms")]
    pub duration_ms: Option<u64>,
    #[serde(default, deserialize_with = "recorded_instant")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "recorded_instant")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub workspace: String,
    #[serde(default)]
    pub status: RunStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "positive_ms")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default)]
    pub program: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: Vec<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub user: Option<String>,
    #[serde(default)]
    pub changes: Option<Changes>,
    #[serde(default)]
    pub sync_status: SyncStatus,
    #[serde(default)]
    pub git: Option<GitInfo>,
    #[serde(default)]
    pub ci: Option<CiInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
}

impl Run {
    /// Program name as shown to the operator; runs recorded before the field
    /// existed were always terraform.
    pub fn program_name(&self) -> &str {
        if self.program.is_empty() {
            "terraform"
        } else {
            &self.program
        }
    }

    pub fn user_name(&self) -> &str {
        self.user.as_deref().unwrap_or("unknown")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

fn positive_ms<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = Option::<i64>::deserialize(deserializer)?;
    Ok(ms.filter(|&ms| ms > 0).map(|ms| ms as u64))
}

fn recorded_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let ts = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(ts.filter(|ts| ts.year() > 1))
}
