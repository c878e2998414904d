//! Transport-agnostic request handlers.
//!
//! # Responsibility
//! - Route `method + path` to card service calls.
//! - Map service results to status codes and JSON bodies.
//!
//! # Invariants
//! - Handlers never panic; every outcome becomes an `ApiResponse`.
//! - Path identifiers are checked (`^[0-9]+$`) before the service is called.
//! - Card bodies always carry decoded `tags`.

use crate::filter::CardFilter;
use crate::model::card::CardId;
use crate::repo::card_repo::CardRepository;
use crate::service::card_service::{CardService, CardServiceError};
use crate::validation::{parse_card_id, ValidationError};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

/// Parsed transport request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Upper-case HTTP-style method (`GET`, `POST`, `PATCH`, `DELETE`).
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Parsed request body; `Value::Null` when absent.
    pub body: Value,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            body: Value::Null,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

/// Handler outcome: a status code and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    fn serialized(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::json(status, body),
            Err(err) => {
                error!("event=api_serialize module=api status=error error={err}");
                Self::json(500, json!({ "error": "internal_error" }))
            }
        }
    }

    fn route_not_found() -> Self {
        Self::json(404, json!({ "error": "route_not_found" }))
    }

    fn method_not_allowed() -> Self {
        Self::json(405, json!({ "error": "method_not_allowed" }))
    }

    fn from_validation(err: &ValidationError) -> Self {
        Self::json(
            400,
            json!({
                "error": "validation_error",
                "field": err.field,
                "reason": err.reason.to_string(),
            }),
        )
    }

    fn from_service_error(err: &CardServiceError) -> Self {
        match err {
            CardServiceError::Validation(err) => Self::from_validation(err),
            CardServiceError::NotFound(id) => {
                Self::json(404, json!({ "error": "not_found", "id": id }))
            }
            CardServiceError::Repo(err) => {
                error!(
                    "event=api_request module=api status=error error_code=storage_failed error={err}"
                );
                Self::json(500, json!({ "error": "internal_error" }))
            }
        }
    }
}

/// Request router over a card service.
pub struct CardApi<R: CardRepository> {
    service: CardService<R>,
}

impl<R: CardRepository> CardApi<R> {
    pub fn new(service: CardService<R>) -> Self {
        Self { service }
    }

    /// Handles one request end to end.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let started_at = Instant::now();
        let response = self.route(request);
        let elapsed = started_at.elapsed().as_millis();
        if response.status >= 400 {
            warn!(
                "event=api_request module=api status=rejected method={} path={} code={} duration_ms={elapsed}",
                request.method, request.path, response.status
            );
        } else {
            info!(
                "event=api_request module=api status=ok method={} path={} code={} duration_ms={elapsed}",
                request.method, request.path, response.status
            );
        }
        response
    }

    fn route(&self, request: &ApiRequest) -> ApiResponse {
        let segments: Vec<&str> = request
            .path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let method = request.method.to_ascii_uppercase();

        match (segments.as_slice(), method.as_str()) {
            (["health"], "GET") => ApiResponse::json(200, json!({ "ok": true })),
            (["health"], _) => ApiResponse::method_not_allowed(),
            (["cards"], "GET") => self.list(request),
            (["cards"], "POST") => self.create(request),
            (["cards"], _) => ApiResponse::method_not_allowed(),
            (["cards", raw_id], "PATCH") => {
                self.with_id(raw_id, |id| self.update(id, &request.body))
            }
            (["cards", raw_id], "DELETE") => self.with_id(raw_id, |id| self.delete(id)),
            (["cards", _], _) => ApiResponse::method_not_allowed(),
            _ => ApiResponse::route_not_found(),
        }
    }

    fn with_id(&self, raw_id: &str, f: impl FnOnce(CardId) -> ApiResponse) -> ApiResponse {
        match parse_card_id(raw_id) {
            Ok(id) => f(id),
            Err(err) => ApiResponse::from_validation(&err),
        }
    }

    fn list(&self, request: &ApiRequest) -> ApiResponse {
        let filter = CardFilter::from_query(
            request
                .query
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        match self.service.list_cards(&filter) {
            Ok(cards) => ApiResponse::serialized(200, &cards),
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    fn create(&self, request: &ApiRequest) -> ApiResponse {
        match self.service.create_card(&request.body) {
            Ok(card) => ApiResponse::serialized(201, &card),
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    fn update(&self, id: CardId, body: &Value) -> ApiResponse {
        match self.service.update_card(id, body) {
            Ok(card) => ApiResponse::serialized(200, &card),
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    fn delete(&self, id: CardId) -> ApiResponse {
        match self.service.delete_card(id) {
            Ok(()) => ApiResponse::no_content(),
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }
}
