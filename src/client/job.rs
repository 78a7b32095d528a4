//! Handle on one batch job returned by a queue listing

use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

use super::errors::{NewtError, Result};
use super::newt_client::NewtClient;
use crate::models::{DeleteResult, JobInfo};

/// A queued or running job, borrowed from the client that listed it.
///
/// The handle cannot outlive its client and never controls the session.
/// Its fields go stale as soon as the server-side job changes; call
/// [`refresh`](Job::refresh) to pull the current record.
pub struct Job<'a> {
    client: &'a NewtClient,
    info: JobInfo,
}

impl fmt::Debug for Job<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("info", &self.info).finish()
    }
}

impl<'a> Job<'a> {
    pub(crate) fn new(client: &'a NewtClient, info: JobInfo) -> Self {
        Self { client, info }
    }

    pub fn info(&self) -> &JobInfo {
        &self.info
    }

    pub fn into_info(self) -> JobInfo {
        self.info
    }

    pub fn jobid(&self) -> Cow<'_, str> {
        self.info.jobid()
    }

    pub fn hostname(&self) -> Option<Cow<'_, str>> {
        self.info.hostname()
    }

    /// Any field by its gateway name, as the server last reported it
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.info.get(field)
    }

    /// Fetch the job's current record and copy every returned field onto
    /// this handle. Fields missing from the response keep their old values.
    /// Returns the raw record.
    pub fn refresh(&mut self) -> Result<Value> {
        let path = self.path()?;
        let fresh = self.client.fetch_job(&path)?;
        self.info.merge(&fresh);
        Ok(Value::Object(fresh))
    }

    /// Ask the gateway to remove the job from the queue. The handle itself
    /// is left untouched.
    pub fn delete(&self) -> Result<DeleteResult> {
        let path = self.path()?;
        self.client.delete_job(&path)
    }

    fn path(&self) -> Result<String> {
        let hostname = self
            .info
            .hostname()
            .ok_or(NewtError::MissingField("hostname"))?;
        let jobid = self.info.short_jobid();
        if jobid.is_empty() {
            return Err(NewtError::MissingField("jobid"));
        }
        Ok(format!("/queue/{}/{}", hostname, jobid))
    }
}
