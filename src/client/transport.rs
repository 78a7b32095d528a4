//! HTTP transport used by the NEWT client
//!
//! Every client operation is expressed as one [`ApiRequest`] handed to a
//! [`Transport`]. The production implementation is [`HttpTransport`], a
//! blocking reqwest client holding the session cookies. Tests substitute a
//! scripted transport through the same trait.

use log::trace;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::errors::{NewtError, Result};
use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// application/x-www-form-urlencoded fields, in order
    Form(Vec<(String, String)>),
    /// multipart/form-data with a single file part
    Multipart {
        field: String,
        file_name: String,
        content: Vec<u8>,
    },
}

/// One request against the gateway. `path` is appended verbatim to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a query parameter, replacing any earlier value for the same key
    pub fn set_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.query.push((key, value)),
        }
    }

    pub fn with_form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn with_file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        self.body = RequestBody::Multipart {
            field: field.into(),
            file_name: file_name.into(),
            content,
        };
        self
    }

    /// Value of a form field, if the body is a form
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A gateway response with a streaming body
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    body: Box<dyn Read + Send>,
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl ApiResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            url: url.into(),
            body: Box::new(body),
        }
    }

    pub fn from_bytes(status: u16, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, url, Cursor::new(body.into()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`NewtError::Http`] without decoding it
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status;
        let url = self.url.clone();
        let body = self.text().unwrap_or_default();
        Err(NewtError::Http { status, url, body })
    }

    pub fn text(mut self) -> Result<String> {
        let mut raw = Vec::new();
        self.body.read_to_end(&mut raw)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.clone();
        let text = self.text()?;
        trace!("Response body from {}: {}", url, text);
        serde_json::from_str(&text).map_err(|source| NewtError::Decode { url, source })
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.body
    }
}

/// Sends requests to the gateway on behalf of one authenticated session
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Cookie header currently presented to the gateway, if any
    fn session_cookie(&self) -> Option<String> {
        None
    }
}

/// Blocking reqwest transport with a private cookie jar
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    base: Url,
    cookies: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)?;
        let cookies = Arc::new(Jar::default());

        let mut builder = reqwest::blocking::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            base,
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = Url::parse(&format!("{}{}", self.base_url, request.path))?;

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart {
                field,
                file_name,
                content,
            } => builder.multipart(Form::new().part(field, Part::bytes(content).file_name(file_name))),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        Ok(ApiResponse::new(status, url, response))
    }

    fn session_cookie(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(|s| s.to_string()))
    }
}
