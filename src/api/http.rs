//! HTTP transport backed by a `ureq` agent.
//!
//! The agent keeps a cookie store, so the session cookie set by login or
//! registration rides along on every later call, the same way a browser
//! sends same-origin credentials. Clones share the agent and therefore the
//! session. No client-side timeout is applied: the transport decides when a
//! call has failed.

use super::{ApiRequest, ApiResponse, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        // On Windows, "localhost" may resolve to ::1 first while dev servers
        // often bind only IPv4.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let call = self
            .agent
            .request(request.method.as_str(), &url)
            .set("Accept", "application/json");

        let result = match &request.body {
            Some(body) => call.send_json(body),
            None => call.call(),
        };

        match result {
            Ok(response) => read_response(response),
            Err(ureq::Error::Status(_, response)) => read_response(response),
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!(method = %request.method, path = %request.path, error = %err, "request failed");
                Err(TransportError(err.to_string()))
            }
        }
    }
}

fn read_response(response: ureq::Response) -> Result<ApiResponse, TransportError> {
    let status = response.status();
    let body = response
        .into_string()
        .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
    Ok(ApiResponse { status, body })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
