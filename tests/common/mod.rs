//! Scripted transport shared by the integration tests

#![allow(dead_code)]

use newt::client::{ApiRequest, ApiResponse, HttpMethod, Transport};
use newt::{NewtClient, NewtConfig, Result};
use rstest::fixture;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::io::Read;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://newt.test/newt";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct horse";

#[derive(Clone)]
enum CannedBody {
    Bytes(Vec<u8>),
    Chunks(Vec<Vec<u8>>),
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: CannedBody,
}

struct Route {
    method: HttpMethod,
    path: String,
    response: Canned,
}

#[derive(Default)]
struct FakeState {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
}

/// Transport that records every request and answers from canned responses.
///
/// Registering a route again replaces its response. Unknown routes answer 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, method: HttpMethod, path: &str, canned: Canned) {
        let mut state = self.state.lock().unwrap();
        if let Some(route) = state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            route.response = canned;
            return;
        }
        state.routes.push(Route {
            method,
            path: path.to_string(),
            response: canned,
        });
    }

    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.set(
            method,
            path,
            Canned {
                status,
                body: CannedBody::Bytes(body.into()),
            },
        );
    }

    pub fn respond_json(&self, method: HttpMethod, path: &str, value: Value) {
        self.respond(method, path, 200, value.to_string());
    }

    /// Serve a body one piece per read
    pub fn respond_chunks(&self, method: HttpMethod, path: &str, chunks: Vec<Vec<u8>>) {
        self.set(
            method,
            path,
            Canned {
                status: 200,
                body: CannedBody::Chunks(chunks),
            },
        );
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        let url = format!("{}{}", BASE_URL, request.path);

        let canned = state
            .routes
            .iter()
            .find(|r| r.method == request.method && r.path == request.path)
            .map(|route| route.response.clone());

        Ok(match canned {
            Some(Canned {
                status,
                body: CannedBody::Bytes(bytes),
            }) => ApiResponse::from_bytes(status, url, bytes),
            Some(Canned {
                status,
                body: CannedBody::Chunks(chunks),
            }) => ApiResponse::new(status, url, ChunkedBody { chunks: chunks.into() }),
            None => ApiResponse::from_bytes(404, url, "not found"),
        })
    }
}

/// Reader handing out one chunk per call
struct ChunkedBody {
    chunks: VecDeque<Vec<u8>>,
}

impl Read for ChunkedBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let Some(chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk[n..].to_vec());
        }
        Ok(n)
    }
}

pub fn login_ok(username: &str) -> Value {
    json!({
        "auth": true,
        "username": username,
        "session_lifetime": 43200,
        "newt_sessionid": "0123456789abcdef"
    })
}

pub fn test_config() -> NewtConfig {
    let mut config = NewtConfig::default();
    config.client.base_url = BASE_URL.to_string();
    config
}

/// Transport that accepts the test user's login
#[fixture]
pub fn transport() -> FakeTransport {
    let transport = FakeTransport::new();
    transport.respond_json(HttpMethod::Post, "/login", login_ok(USERNAME));
    transport
}

pub fn connect(transport: &FakeTransport) -> NewtClient {
    NewtClient::with_transport(&test_config(), Box::new(transport.clone()), USERNAME, PASSWORD)
        .expect("login should succeed")
}
