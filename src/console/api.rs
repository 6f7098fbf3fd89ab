//! HTTP client for the gateway, as used by the record console.
//!
//! Carries the session cookie across calls the way a browser would, and
//! translates gateway responses into the console's error taxonomy. A 409
//! conflict keeps the server's message verbatim; everything else collapses
//! into operation-level errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// A customer record as rendered in the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_clientes: Option<i64>,
    pub dni_ruc: Option<String>,
    pub nombre_completo: Option<String>,
    pub telefono: Option<String>,
    pub correo: Option<String>,
    pub direccion: Option<String>,
    pub estado: Option<String>,
}

/// Failures the console surfaces to the user.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// No session; the caller should steer to the login flow.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Uniqueness conflict; the message is the server's, verbatim.
    #[error("{0}")]
    Conflict(String),

    /// Any other rejected operation, with the message to display.
    #[error("{0}")]
    Rejected(String),

    /// The gateway itself could not be reached.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub struct ConsoleApi {
    http: reqwest::Client,
    base: Url,
}

impl ConsoleApi {
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// POST /login. The Accept header asks for JSON so the gateway does not
    /// answer with a browser redirect.
    pub async fn login(&self, usuario: &str, password: &str) -> Result<(), ConsoleError> {
        let response = self
            .http
            .post(self.endpoint("/login"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "usuario": usuario, "password": password }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(ConsoleError::Rejected(error_message(
            &body,
            "Error de inicio de sesión",
        )))
    }

    /// GET /logout.
    pub async fn logout(&self) -> Result<(), ConsoleError> {
        self.http
            .get(self.endpoint("/logout"))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        Ok(())
    }

    /// GET /api/session → the authenticated identity.
    pub async fn session(&self) -> Result<Value, ConsoleError> {
        let response = self.http.get(self.endpoint("/api/session")).send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ConsoleError::NotAuthenticated);
        }
        let body: Value = response.json().await?;
        Ok(body.get("user").cloned().unwrap_or(Value::Null))
    }

    /// GET /api/clientes → all records.
    pub async fn list_records(&self) -> Result<Vec<CustomerRecord>, ConsoleError> {
        let response = self.http.get(self.endpoint("/api/clientes")).send().await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ConsoleError::NotAuthenticated);
        }
        let body: Value = response.json().await?;
        let records = body
            .get("clientes")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| serde_json::from_value(row.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    /// POST /api/clientes.
    pub async fn create_record(
        &self,
        payload: &CustomerRecord,
        generic_error: &str,
    ) -> Result<(), ConsoleError> {
        let response = self
            .http
            .post(self.endpoint("/api/clientes"))
            .json(payload)
            .send()
            .await?;
        reject_on_failure(response, generic_error).await
    }

    /// PUT /api/clientes/{id}.
    pub async fn update_record(
        &self,
        id: i64,
        payload: &CustomerRecord,
        generic_error: &str,
    ) -> Result<(), ConsoleError> {
        let response = self
            .http
            .put(self.endpoint(&format!("/api/clientes/{}", id)))
            .json(payload)
            .send()
            .await?;
        reject_on_failure(response, generic_error).await
    }

    /// DELETE /api/clientes/{id}.
    pub async fn delete_record(&self, id: i64) -> Result<(), ConsoleError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/api/clientes/{}", id)))
            .send()
            .await?;
        reject_on_failure(response, "Error al eliminar cliente").await
    }

    /// GET /api/clientes/check — advisory duplicate pre-check.
    ///
    /// Errors report "no duplicate": the authoritative check happens
    /// server-side at submission time.
    pub async fn check_duplicate(&self, dni_ruc: &str, exclude_id: Option<i64>) -> bool {
        let mut url = match Url::parse(&self.endpoint("/api/clientes/check")) {
            Ok(url) => url,
            Err(_) => return false,
        };
        url.query_pairs_mut().append_pair("dni_ruc", dni_ruc);
        if let Some(id) = exclude_id {
            url.query_pairs_mut().append_pair("id", &id.to_string());
        }

        let Ok(response) = self.http.get(url).send().await else {
            return false;
        };
        if !response.status().is_success() {
            return false;
        }
        let Ok(body) = response.json::<Value>().await else {
            return false;
        };
        body.get("exists").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Map a non-success response to the console error taxonomy.
async fn reject_on_failure(
    response: reqwest::Response,
    generic_error: &str,
) -> Result<(), ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ConsoleError::NotAuthenticated);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status == reqwest::StatusCode::CONFLICT {
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            return Err(ConsoleError::Conflict(message.to_string()));
        }
    }
    Err(ConsoleError::Rejected(error_message(&body, generic_error)))
}

fn error_message(body: &Value, fallback: &str) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}
