//! Data models for NEWT gateway payloads
//!
//! Text fields of result records accept JSON numbers as well as strings; the
//! gateway is not consistent about quoting counters such as sizes. Job records
//! keep every value exactly as sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Answer to `/login`, `/logout` and `/auth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthStatus {
    pub auth: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Seconds the session stays valid after login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_lifetime: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newt_sessionid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(deserialize_with = "text")]
    pub system: String,
    #[serde(default, deserialize_with = "text")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SystemStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

/// `/status` returns every system, `/status/<system>` a single one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusReport {
    All(Vec<SystemStatus>),
    System(SystemStatus),
}

impl StatusReport {
    pub fn systems(&self) -> Vec<&SystemStatus> {
        match self {
            StatusReport::All(all) => all.iter().collect(),
            StatusReport::System(one) => vec![one],
        }
    }
}

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inode {
    /// Modification date as reported by the remote `ls`
    #[serde(default, deserialize_with = "text")]
    pub date: String,
    #[serde(default, deserialize_with = "text")]
    pub user: String,
    #[serde(default, deserialize_with = "text")]
    pub group: String,
    /// Passed through untouched
    #[serde(default)]
    pub hardlinks: Value,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub perms: String,
    #[serde(default, deserialize_with = "text")]
    pub size: String,
}

impl Inode {
    pub fn is_dir(&self) -> bool {
        self.perms.starts_with('d')
    }
}

/// Result of `/command/<machine>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    /// stderr
    #[serde(default, deserialize_with = "text")]
    pub error: String,
    /// stdout
    #[serde(default, deserialize_with = "text")]
    pub output: String,
    /// OK | ERROR
    #[serde(default, deserialize_with = "text")]
    pub status: String,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Result of a job submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResult {
    #[serde(default, deserialize_with = "text")]
    pub status: String,
    #[serde(default, deserialize_with = "text")]
    pub error: String,
    #[serde(default, deserialize_with = "text")]
    pub jobid: String,
}

impl SubmitResult {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Result of deleting a job from the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    #[serde(default, deserialize_with = "text")]
    pub status: String,
    #[serde(default, deserialize_with = "text")]
    pub output: String,
    #[serde(default, deserialize_with = "text")]
    pub error: String,
}

impl DeleteResult {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Field names the gateway documents for a queued job
pub const JOB_FIELDS: &[&str] = &[
    "jobid",
    "hostname",
    "name",
    "nodes",
    "procs",
    "queue",
    "rank",
    "repo",
    "state",
    "status",
    "submittime",
    "timereq",
    "timeuse",
    "user",
];

/// A batch job as reported by the queue listing
///
/// The record keeps the server's values untouched; the accessors give a typed
/// view of the documented fields. `state` and `status` are opaque strings such
/// as "Running" or "Complete". `rank` and `repo` are passed through as-is.
/// Fields beyond [`JOB_FIELDS`] are reachable through [`get`](JobInfo::get)
/// and [`extra`](JobInfo::extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct JobInfo {
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for JobInfo {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get("jobid") {
            Some(Value::String(_)) | Some(Value::Number(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("job record has an unusable jobid: {}", other)),
            None => Err("job record is missing 'jobid'".to_string()),
        }
    }
}

impl From<JobInfo> for Map<String, Value> {
    fn from(job: JobInfo) -> Self {
        job.fields
    }
}

impl JobInfo {
    /// Textual form of a scalar field; null and missing fields give `None`
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// Server job id, possibly with a `.server` suffix
    pub fn jobid(&self) -> Cow<'_, str> {
        self.text("jobid").unwrap_or_default()
    }

    /// Job id without the `.`-separated server suffix, as used in per-job URLs
    pub fn short_jobid(&self) -> String {
        let jobid = self.jobid();
        jobid.split('.').next().unwrap_or_default().to_string()
    }

    /// Machine the job was submitted to
    pub fn hostname(&self) -> Option<Cow<'_, str>> {
        self.text("hostname")
    }

    pub fn name(&self) -> Option<Cow<'_, str>> {
        self.text("name")
    }

    pub fn nodes(&self) -> Option<Cow<'_, str>> {
        self.text("nodes")
    }

    pub fn procs(&self) -> Option<Cow<'_, str>> {
        self.text("procs")
    }

    pub fn queue(&self) -> Option<Cow<'_, str>> {
        self.text("queue")
    }

    pub fn rank(&self) -> Option<&Value> {
        self.get("rank")
    }

    pub fn repo(&self) -> Option<&Value> {
        self.get("repo")
    }

    pub fn state(&self) -> Option<Cow<'_, str>> {
        self.text("state")
    }

    pub fn status(&self) -> Option<Cow<'_, str>> {
        self.text("status")
    }

    pub fn submittime(&self) -> Option<Cow<'_, str>> {
        self.text("submittime")
    }

    pub fn timereq(&self) -> Option<Cow<'_, str>> {
        self.text("timereq")
    }

    pub fn timeuse(&self) -> Option<Cow<'_, str>> {
        self.text("timeuse")
    }

    pub fn user(&self) -> Option<Cow<'_, str>> {
        self.text("user")
    }

    /// Any field by its gateway name, exactly as the server sent it
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Fields outside [`JOB_FIELDS`]
    pub fn extra(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| !JOB_FIELDS.contains(&key.as_str()))
    }

    /// Overwrite every field present in `fresh`; fields absent from it keep
    /// their previous values.
    pub fn merge(&mut self, fresh: &Map<String, Value>) {
        for (key, value) in fresh {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}
