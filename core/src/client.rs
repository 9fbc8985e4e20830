//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `TaskClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse` and unwraps the JSON envelope.

use serde::de::{DeserializeOwned, IgnoredAny};
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TRANSPORT_FAILURE};
use crate::types::{CreateTask, Envelope, ListQuery, Task, TaskStats, UpdateTask};

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct TaskClient {
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    fn task_url(&self, id: Uuid) -> String {
        format!("{}/api/tasks/{id}", self.base_url)
    }

    pub fn build_list_tasks(&self, query: &ListQuery) -> HttpRequest {
        HttpRequest::bodyless(
            HttpMethod::Get,
            format!("{}{}", self.tasks_url(), query.to_query_string()),
        )
    }

    pub fn build_get_task(&self, id: Uuid) -> HttpRequest {
        HttpRequest::bodyless(HttpMethod::Get, self.task_url(id))
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Post, self.tasks_url(), body))
    }

    pub fn build_update_task(&self, id: Uuid, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::json(HttpMethod::Put, self.task_url(id), body))
    }

    pub fn build_delete_task(&self, id: Uuid) -> HttpRequest {
        HttpRequest::bodyless(HttpMethod::Delete, self.task_url(id))
    }

    pub fn build_task_stats(&self) -> HttpRequest {
        HttpRequest::bodyless(
            HttpMethod::Get,
            format!("{}/stats/summary", self.tasks_url()),
        )
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        parse_data(&response, 200)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_data(&response, 200)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_data(&response, 201)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_data(&response, 200)
    }

    /// Returns the server's acknowledgment message.
    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<String, ApiError> {
        let envelope: Envelope<IgnoredAny> = parse_envelope(&response, 200)?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub fn parse_task_stats(&self, response: HttpResponse) -> Result<TaskStats, ApiError> {
        parse_data(&response, 200)
    }
}

fn parse_envelope<T: DeserializeOwned>(
    response: &HttpResponse,
    expected: u16,
) -> Result<Envelope<T>, ApiError> {
    check_status(response, expected)?;
    let envelope: Envelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(e.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Http {
            status: response.status,
            message: envelope.error.unwrap_or_default(),
        });
    }
    Ok(envelope)
}

fn parse_data<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    parse_envelope(response, expected)?
        .data
        .ok_or_else(|| ApiError::Deserialization("envelope has no data".to_string()))
}

/// Map unexpected status codes to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        TRANSPORT_FAILURE => Err(ApiError::Transport(response.body.clone())),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::Validation(error_text(response))),
        status => Err(ApiError::Http {
            status,
            message: error_text(response),
        }),
    }
}

/// The envelope's `error` field, falling back to the raw body.
fn error_text(response: &HttpResponse) -> String {
    serde_json::from_str::<Envelope<IgnoredAny>>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_else(|| response.body.clone())
}
