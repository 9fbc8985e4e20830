//! Executes the core's plain-data requests over real HTTP.

use std::collections::VecDeque;
use std::time::Duration;

use task_core::{Effect, HttpMethod, HttpRequest, HttpResponse, Outgoing, TaskManager};

pub struct Transport {
    agent: ureq::Agent,
}

impl Transport {
    pub fn new() -> Self {
        // 4xx/5xx come back as data; the core interprets status codes.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Perform one round-trip. Failures that produce no HTTP response are
    /// reported as transport-failure responses rather than errors.
    pub fn execute(&self, req: HttpRequest) -> HttpResponse {
        tracing::debug!(method = req.method.as_str(), path = %req.path, "sending request");
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&req.path).send_empty(),
        };

        match result {
            Ok(mut response) => {
                let status = response.status().as_u16();
                match response.body_mut().read_to_string() {
                    Ok(body) => HttpResponse::new(status, body),
                    Err(e) => HttpResponse::transport_failure(e.to_string()),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "request failed");
                HttpResponse::transport_failure(e.to_string())
            }
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `outgoing` and every follow-up effect in order. `SendAfter` delays are
/// handed to `sleep` before the delayed request goes out.
pub fn drive(
    manager: &mut TaskManager,
    outgoing: Outgoing,
    mut execute: impl FnMut(HttpRequest) -> HttpResponse,
    mut sleep: impl FnMut(Duration),
) {
    let mut queue = VecDeque::from([(Duration::ZERO, outgoing)]);
    while let Some((delay, Outgoing { action, request })) = queue.pop_front() {
        if !delay.is_zero() {
            sleep(delay);
        }
        for effect in manager.complete(action, execute(request)) {
            match effect {
                Effect::Send(next) => queue.push_back((Duration::ZERO, next)),
                Effect::SendAfter(delay, next) => queue.push_back((delay, next)),
            }
        }
    }
}
