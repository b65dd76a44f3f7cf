//! In-memory transport for session and resolver tests.

use super::{Request, Response, Transport};
use crate::error::{Result, TailorError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers requests from a fixed route table and records every request.
///
/// Unrouted URLs behave like a refused connection.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, Response>,
    requests: Mutex<Vec<Request>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(url.to_string(), response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.to_string())
            .collect()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: Request) -> Result<Response> {
        let url = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        self.routes
            .get(&url)
            .cloned()
            .ok_or_else(|| TailorError::transport(format!("Failed to connect to {}", url)))
    }
}
