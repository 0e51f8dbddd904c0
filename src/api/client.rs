//! Blocking HTTP client for the sync server.
//!
//! Every endpoint wraps its payload in a `{"data": ...}` envelope; the
//! helpers here unwrap it once so callers see typed bodies. The session
//! token comes from the credential store on every request, so a re-login
//! takes effect without rebuilding the client.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::api::Transport;
use crate::services::credential_store::{CredentialStore, SESSION_TOKEN_KEY};
use crate::types::errors::TransportError;
use crate::types::mutation::MutationEnvelope;
use crate::types::wire::{BootstrapSnapshot, DeltaBatch, LoginData, UserData};

const APP_SOURCE: &str = "linkvault";

pub struct HttpTransport {
    base_url: String,
    http: reqwest::blocking::Client,
    credentials: Arc<dyn CredentialStore + Send + Sync>,
}

impl HttpTransport {
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore + Send + Sync>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Option<String> {
        self.credentials
            .load(SESSION_TOKEN_KEY)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, TransportError> {
        let mut request = self
            .http
            .get(self.url(path))
            .header("X-App-Source", APP_SOURCE);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::check_status(response)
    }

    fn post(&self, path: &str, body: &Value) -> Result<reqwest::blocking::Response, TransportError> {
        let mut request = self
            .http
            .post(self.url(path))
            .header("X-App-Source", APP_SOURCE)
            .json(body);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Self::check_status(response)
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, TransportError> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(TransportError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TransportError::Http(status.as_u16()));
        }
        Ok(response)
    }

    /// Unwraps the `{"data": ...}` response envelope into `T`.
    fn unwrap_data<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, TransportError> {
        let body: Value = response
            .json()
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| TransportError::Decode("response missing data envelope".to_string()))?;
        serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl Transport for HttpTransport {
    fn fetch_user(&self) -> Result<UserData, TransportError> {
        Self::unwrap_data(self.get("/get-user")?)
    }

    fn fetch_bootstrap_snapshot(&self) -> Result<BootstrapSnapshot, TransportError> {
        Self::unwrap_data(self.get("/full-bootstrap")?)
    }

    fn fetch_backlog(&self) -> Result<String, TransportError> {
        self.get("/stream-data")?
            .text()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn fetch_delta(&self, from: i64, to: i64) -> Result<DeltaBatch, TransportError> {
        debug!(from, to, "requesting delta");
        let body = json!({ "data": { "fromSyncId": from, "toSyncId": to } });
        Self::unwrap_data(self.post("/delta-sync", &body)?)
    }

    fn push_mutation(
        &self,
        envelope: &MutationEnvelope,
        client_id: &str,
    ) -> Result<(), TransportError> {
        let mut body = json!({
            "operation": envelope.operation,
            "collection": envelope.collection,
            "data": envelope.data,
            "clientId": client_id,
        });
        if let Some(array_operation) = &envelope.array_operation {
            body["arrayOperation"] = json!(array_operation);
        }
        self.post("/mutate", &body)?;
        Ok(())
    }

    fn initiate_login(&self, email: &str) -> Result<String, TransportError> {
        let body = json!({ "operation": "initiate", "data": { "email": email } });
        let login: LoginData = Self::unwrap_data(self.post("/login", &body)?)?;
        login
            .verification_token
            .ok_or_else(|| TransportError::Decode("login response missing token".to_string()))
    }

    fn verify_login(&self, email: &str, token: &str) -> Result<String, TransportError> {
        let body = json!({
            "operation": "verify",
            "data": { "email": email, "verificationToken": token },
        });
        let login: LoginData = Self::unwrap_data(self.post("/login", &body)?)?;
        let session_id = login
            .session_id
            .ok_or_else(|| TransportError::Decode("login response missing session".to_string()))?;
        // Later requests pick the token up from the store automatically.
        self.credentials
            .save(SESSION_TOKEN_KEY, session_id.as_bytes())
            .map_err(|e| TransportError::Credential(e.to_string()))?;
        Ok(session_id)
    }
}
