//! Session client for the NEWT gateway
//!
//! A [`NewtClient`] exists only while authenticated: constructing one logs in,
//! and a rejected login fails construction. Each method issues exactly one
//! HTTP request and decodes one response. Nothing is retried.

use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

use super::errors::{NewtError, Result};
use super::files::{copy_chunks, remote_file_name, split_remote_path};
use super::job::Job;
use super::machines::MachineRegistry;
use super::session::AuthSession;
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::config::NewtConfig;
use crate::models::{
    AuthStatus, CommandResult, DeleteResult, Inode, JobInfo, StatusReport, SubmitResult,
};

/// Parameters for listing a machine's batch queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueQuery {
    pub index: usize,
    pub limit: usize,
    /// Extra filters passed through verbatim, e.g. `("queue", "debug")`
    pub filters: Vec<(String, String)>,
}

impl Default for QueueQuery {
    fn default() -> Self {
        Self {
            index: 0,
            limit: 10,
            filters: Vec::new(),
        }
    }
}

impl QueueQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

pub struct NewtClient {
    transport: Box<dyn Transport>,
    registry: MachineRegistry,
    session: AuthSession,
    download_chunk_size: usize,
}

impl NewtClient {
    /// Log in using the configuration found in the standard locations
    /// (see [`NewtConfig::load`]), or the defaults if none can be read
    pub fn new(username: &str, password: &str) -> Result<Self> {
        let config = NewtConfig::load().unwrap_or_else(|e| {
            warn!("Ignoring unreadable NEWT configuration: {:#}", e);
            NewtConfig::default()
        });
        Self::from_config(&config, username, password)
    }

    pub fn from_config(config: &NewtConfig, username: &str, password: &str) -> Result<Self> {
        let transport = HttpTransport::new(&config.client)?;
        Self::with_transport(config, Box::new(transport), username, password)
    }

    /// Log in through an arbitrary transport
    pub fn with_transport(
        config: &NewtConfig,
        transport: Box<dyn Transport>,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let session = authenticate(transport.as_ref(), username, password)?;
        Ok(Self {
            transport,
            registry: config.client.registry(),
            session,
            download_chunk_size: config.client.download_chunk_size,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn registry(&self) -> &MachineRegistry {
        &self.registry
    }

    /// Cookie currently presented to the gateway, if the transport exposes it
    pub fn session_cookie(&self) -> Option<String> {
        self.transport.session_cookie()
    }

    /// Log in again, replacing the session identity
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        match authenticate(self.transport.as_ref(), username, password) {
            Ok(session) => {
                self.session = session;
                Ok(true)
            }
            Err(err) => {
                if matches!(err, NewtError::Authentication { .. }) {
                    self.session.mark_logged_out();
                }
                Err(err)
            }
        }
    }

    /// Returns true if the gateway reports the session as closed
    pub fn logout(&mut self) -> Result<bool> {
        let status: AuthStatus = self.send(ApiRequest::get("/logout"))?.json()?;
        if !status.auth {
            info!("Logged out of NEWT as {}", self.session.username());
            self.session.mark_logged_out();
        }
        Ok(!status.auth)
    }

    /// Ask the gateway whether the session is still authenticated
    pub fn is_auth(&self) -> Result<bool> {
        let status: AuthStatus = self.send(ApiRequest::get("/auth"))?.json()?;
        Ok(status.auth)
    }

    /// Status of one system, or of every system when `system` is `None`
    pub fn status(&self, system: Option<&str>) -> Result<StatusReport> {
        let path = match system {
            Some(system) => {
                self.registry.check_system(system)?;
                format!("/status/{}", system)
            }
            None => "/status".to_string(),
        };
        self.send(ApiRequest::get(path))?.json()
    }

    /// Message of the day
    pub fn motd(&self) -> Result<String> {
        self.send(ApiRequest::get("/status/motd"))?.text()
    }

    /// List a remote directory, in the order the gateway returns entries
    pub fn list(&self, machine: &str, remote_dir: &str) -> Result<Vec<Inode>> {
        self.registry.check_machine(machine)?;
        let path = format!("/file/{}{}", machine, remote_dir);
        self.send(ApiRequest::get(path))?.json()
    }

    /// Download a remote file, overwriting `local_path` (default: the remote
    /// file name in the current directory). Returns the path written.
    pub fn download(
        &self,
        machine: &str,
        remote_path: &str,
        local_path: Option<&Path>,
    ) -> Result<PathBuf> {
        self.registry.check_machine(machine)?;
        let local_path = match local_path {
            Some(path) => path.to_path_buf(),
            None => {
                let name = remote_file_name(remote_path);
                if name.is_empty() {
                    return Err(NewtError::InvalidPath(format!(
                        "cannot derive a local file name from '{}'",
                        remote_path
                    )));
                }
                PathBuf::from(name)
            }
        };

        let request =
            ApiRequest::get(format!("/file/{}{}", machine, remote_path)).with_query("view", "read");
        let response = self.send(request)?;

        let mut reader = response.into_reader();
        let mut writer = BufWriter::new(File::create(&local_path)?);
        let written = copy_chunks(&mut reader, &mut writer, self.download_chunk_size)?;
        info!(
            "Downloaded {}:{} to {} ({} bytes)",
            machine,
            remote_path,
            local_path.display(),
            written
        );
        Ok(local_path)
    }

    /// Upload `source` to `remote_path`. When the path ends in a file name the
    /// file is stored under it; otherwise `source_name` is used.
    pub fn upload<R: Read>(
        &self,
        machine: &str,
        remote_path: &str,
        mut source: R,
        source_name: &str,
    ) -> Result<bool> {
        self.registry.check_machine(machine)?;
        let (remote_dir, remote_name) = split_remote_path(remote_path);
        let file_name = if remote_name.is_empty() {
            source_name
        } else {
            remote_name
        };
        if file_name.is_empty() {
            return Err(NewtError::InvalidPath(format!(
                "no file name in '{}' and the source is unnamed",
                remote_path
            )));
        }

        let mut content = Vec::new();
        source.read_to_end(&mut content)?;
        let size = content.len();

        let request = ApiRequest::post(format!("/file/{}{}", machine, remote_dir))
            .with_file("file", file_name, content);
        self.send(request)?;
        info!(
            "Uploaded {} bytes to {}:{}/{}",
            size, machine, remote_dir, file_name
        );
        Ok(true)
    }

    /// Upload a local file, named after the local file unless `remote_path`
    /// carries its own file name
    pub fn upload_file(&self, machine: &str, remote_path: &str, local_path: &Path) -> Result<bool> {
        let source_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(local_path)?;
        self.upload(machine, remote_path, file, &source_name)
    }

    /// Run a command as the authenticated user. With `loginenv` the command
    /// runs in a login shell, which costs extra time on the server.
    pub fn run_command(&self, machine: &str, command: &str, loginenv: bool) -> Result<CommandResult> {
        self.registry.check_machine(machine)?;
        let request = ApiRequest::post(format!("/command/{}", machine)).with_form(vec![
            ("executable".to_string(), command.to_string()),
            ("loginenv".to_string(), form_bool(loginenv).to_string()),
        ]);
        self.send(request)?.json()
    }

    /// List jobs in a machine's queue, in server order
    pub fn queue_stat(&self, machine: &str, query: &QueueQuery) -> Result<Vec<Job<'_>>> {
        self.registry.check_machine(machine)?;
        let mut request = ApiRequest::get(format!("/queue/{}", machine))
            .with_query("index", query.index.to_string())
            .with_query("limit", query.limit.to_string());
        for (key, value) in &query.filters {
            request.set_query(key.as_str(), value.as_str());
        }

        let jobs: Vec<JobInfo> = self.send(request)?.json()?;
        debug!("Queue on {} returned {} jobs", machine, jobs.len());
        Ok(jobs.into_iter().map(|info| Job::new(self, info)).collect())
    }

    /// Submit a job. A non-empty `jobfile` (a path on the machine) takes
    /// precedence and `jobscript` is then ignored.
    pub fn queue_submit(
        &self,
        machine: &str,
        jobscript: &str,
        jobfile: Option<&str>,
    ) -> Result<SubmitResult> {
        self.registry.check_machine(machine)?;
        self.submit(machine, jobscript, jobfile)
    }

    /// Submit the contents of a local script file inline
    pub fn queue_submit_script_file(&self, machine: &str, local_script: &Path) -> Result<SubmitResult> {
        self.registry.check_machine(machine)?;
        let script = fs::read_to_string(local_script)?;
        self.submit(machine, &script, None)
    }

    fn submit(&self, machine: &str, jobscript: &str, jobfile: Option<&str>) -> Result<SubmitResult> {
        let fields = match jobfile.filter(|f| !f.is_empty()) {
            Some(jobfile) => vec![
                ("jobscript".to_string(), String::new()),
                ("jobfile".to_string(), jobfile.to_string()),
            ],
            None => vec![
                ("jobscript".to_string(), jobscript.to_string()),
                ("jobfile".to_string(), String::new()),
            ],
        };

        let request = ApiRequest::post(format!("/queue/{}", machine)).with_form(fields);
        let result: SubmitResult = self.send(request)?.json()?;
        if result.is_ok() {
            info!("Submitted job {} on {}", result.jobid, machine);
        } else {
            warn!("Job submission on {} failed: {}", machine, result.error);
        }
        Ok(result)
    }

    pub(crate) fn fetch_job(&self, path: &str) -> Result<Map<String, Value>> {
        self.send(ApiRequest::get(path))?.json()
    }

    pub(crate) fn delete_job(&self, path: &str) -> Result<DeleteResult> {
        let result: DeleteResult = self.send(ApiRequest::delete(path))?.json()?;
        info!("Deleted {}: status={}", path, result.status);
        Ok(result)
    }

    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        send(self.transport.as_ref(), request)
    }
}

fn send(transport: &dyn Transport, request: ApiRequest) -> Result<ApiResponse> {
    debug!("{} {}", request.method, request.path);
    let response = transport.execute(request)?;
    debug!("{} returned HTTP {}", response.url, response.status);
    response.error_for_status()
}

fn authenticate(transport: &dyn Transport, username: &str, password: &str) -> Result<AuthSession> {
    let request = ApiRequest::post("/login").with_form(vec![
        ("username".to_string(), username.to_string()),
        ("password".to_string(), password.to_string()),
    ]);
    let status: AuthStatus = send(transport, request)?.json()?;

    if status.auth && status.username.as_deref() == Some(username) {
        info!("Authenticated to NEWT as {}", username);
        Ok(AuthSession::authenticated(username, &status))
    } else {
        warn!("NEWT rejected login for {}", username);
        Err(NewtError::Authentication {
            username: username.to_string(),
        })
    }
}

/// Booleans in form bodies use the gateway's `True`/`False` spelling
fn form_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
