use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::FormFetchError;

/// HTTP verbs a fetch controller can issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn parse(method: &str) -> Result<Method, FormFetchError> {
        match method.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(FormFetchError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Method and body of one request, fixed once handed to `trigger`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub body: Option<Map<String, Value>>,
}

impl RequestDescriptor {
    pub fn new(method: Method) -> Self {
        Self { method, body: None }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post(body: Map<String, Value>) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
        }
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(body);
        self
    }

    /// Parse a JSON object literal into a request body
    pub fn parse_body(raw: &str) -> Result<Map<String, Value>, FormFetchError> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(FormFetchError::InvalidBody(format!(
                "expected a JSON object, got {}",
                other
            ))),
            Err(e) => Err(FormFetchError::InvalidBody(e.to_string())),
        }
    }
}

/// Failure surfaced to consumers for every kind of request failure
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ServerError {
    pub message: String,
    /// Structured validation payload, e.g. `{"name": ["required"]}`
    pub errors: Option<Value>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    /// Messages the server reported for one field, if the payload is keyed by field
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        match self.errors.as_ref().and_then(|errors| errors.get(field)) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other.to_string()],
        }
    }
}

/// Result of the most recent request, as observed by a consumer
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T> {
    Pending,
    Success(T),
    Failure(ServerError),
}

/// State owned by one fetch controller and broadcast to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleState<T> {
    pub is_loading: bool,
    pub data: Option<T>,
    pub error: Option<ServerError>,
    pub pending_descriptor: Option<RequestDescriptor>,
    pub settled_at: Option<DateTime<Local>>,
}

impl<T> Default for LifecycleState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            data: None,
            error: None,
            pending_descriptor: None,
            settled_at: None,
        }
    }
}

impl<T: Clone> LifecycleState<T> {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `None` before the first trigger
    pub fn outcome(&self) -> Option<RequestOutcome<T>> {
        if self.is_loading {
            return Some(RequestOutcome::Pending);
        }
        if let Some(ref error) = self.error {
            return Some(RequestOutcome::Failure(error.clone()));
        }
        self.data.clone().map(RequestOutcome::Success)
    }
}
