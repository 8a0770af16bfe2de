//! HTTP implementation of [`Backend`] for a hosted PostgREST-style service.
//!
//! Table operations go to `/rest/v1/{table}`, uploads to `/storage/v1/object`,
//! and authentication to `/auth/v1`. Every request carries the project API
//! key; once signed in, the session's access token is sent as the bearer.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::Backend;
use crate::config::RestConfig;
use crate::error::{Result, StorefrontError};
use crate::models::{AuthUser, Credentials, Session};
use crate::query_builder::QueryBuilder;

const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestBackend {
    config: RestConfig,
    client: Client,
    session: Option<Session>,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            config,
            client,
            session: None,
        })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self
            .session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(&self.config.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer)
    }

    /// Send a request and parse the body as JSON (`Null` for an empty body).
    fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(status = %status, message = %message, "backend request failed");
            return Err(StorefrontError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn send_auth(&self, request: RequestBuilder) -> Result<Value> {
        self.send(request).map_err(|e| match e {
            StorefrontError::Backend { status, message } if (400..500).contains(&status) => {
                StorefrontError::Auth(message)
            }
            other => other,
        })
    }
}

impl Backend for RestBackend {
    #[instrument(skip(self, query), fields(table = %query.table()))]
    fn select(&self, query: &QueryBuilder) -> Result<Vec<Value>> {
        let url = self.config.rest_url(query.table());
        let request = self.request(Method::GET, &url).query(&query.build());
        let rows = into_rows(self.send(request)?);
        debug!(rows = rows.len(), "select complete");
        Ok(rows)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        let url = self.config.rest_url(table);
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&rows);
        Ok(into_rows(self.send(request)?))
    }

    #[instrument(skip(self, query, patch), fields(table = %query.table()))]
    fn update(&self, query: &QueryBuilder, patch: &Value) -> Result<Vec<Value>> {
        require_filters(query)?;
        let url = self.config.rest_url(query.table());
        let request = self
            .request(Method::PATCH, &url)
            .query(&query.build_filters())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        Ok(into_rows(self.send(request)?))
    }

    #[instrument(skip(self, query), fields(table = %query.table()))]
    fn delete(&self, query: &QueryBuilder) -> Result<usize> {
        require_filters(query)?;
        let url = self.config.rest_url(query.table());
        let request = self
            .request(Method::DELETE, &url)
            .query(&query.build_filters())
            .header("Prefer", RETURN_REPRESENTATION);
        Ok(into_rows(self.send(request)?).len())
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = self.config.upload_url(bucket, path);
        let request = self
            .request(Method::POST, &url)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes);
        self.send(request)?;
        Ok(self.config.public_object_url(bucket, path))
    }

    #[instrument(skip(self))]
    fn remove_object(&self, bucket: &str, path: &str) -> Result<()> {
        let url = self.config.upload_url(bucket, path);
        match self.send(self.request(Method::DELETE, &url)) {
            Err(StorefrontError::Backend { status: 404, .. }) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    fn sign_up(&mut self, credentials: &Credentials) -> Result<Option<Session>> {
        let url = self.config.auth_url("signup");
        let request = self.request(Method::POST, &url).json(credentials);
        let body = self.send_auth(request)?;
        let session = parse_session(body);
        if session.is_none() {
            debug!("sign-up accepted, confirmation pending");
        }
        self.session = session.clone();
        Ok(session)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    fn sign_in(&mut self, credentials: &Credentials) -> Result<Session> {
        let url = self.config.auth_url("token");
        let request = self
            .request(Method::POST, &url)
            .query(&[("grant_type", "password")])
            .json(credentials);
        let body = self.send_auth(request)?;
        let session = parse_session(body)
            .ok_or_else(|| StorefrontError::Auth("auth service returned no session".to_string()))?;
        self.session = Some(session.clone());
        Ok(session)
    }

    #[instrument(skip(self))]
    fn sign_out(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }
        let url = self.config.auth_url("logout");
        let result = self.send(self.request(Method::POST, &url)).map(|_| ());
        self.session = None;
        result
    }

    #[instrument(skip(self))]
    fn session(&self) -> Result<Option<Session>> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        let url = self.config.auth_url("user");
        match self.send(self.request(Method::GET, &url)) {
            Ok(body) => {
                let user: AuthUser = serde_json::from_value(body)?;
                Ok(Some(Session {
                    user,
                    ..session.clone()
                }))
            }
            Err(StorefrontError::Backend { status: 401, .. }) => {
                debug!("session token rejected");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn require_filters(query: &QueryBuilder) -> Result<()> {
    if query.filters().is_empty() {
        return Err(StorefrontError::InvalidArgument(format!(
            "refusing unfiltered write to {}",
            query.table()
        )));
    }
    Ok(())
}

fn into_rows(body: Value) -> Vec<Value> {
    match body {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Token responses carry the session at the top level; some sign-up
/// responses nest it under `session`.
fn parse_session(body: Value) -> Option<Session> {
    let candidate = match body.get("session") {
        Some(nested) if nested.is_object() => nested.clone(),
        _ => body,
    };
    serde_json::from_value(candidate).ok()
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    body.chars().take(200).collect()
}
