//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use records_gateway::config::GatewayConfig;
use records_gateway::{HttpServer, Shutdown};

/// In-memory stand-in for the Backend Record Service, with call counters.
#[derive(Clone, Default)]
pub struct RecordBackend {
    records: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicI64>,
    pub create_calls: Arc<AtomicU32>,
    pub update_calls: Arc<AtomicU32>,
    pub delete_calls: Arc<AtomicU32>,
    pub check_calls: Arc<AtomicU32>,
    pub list_calls: Arc<AtomicU32>,
    /// When set, the list endpoint answers with HTML instead of JSON.
    pub html_mode: Arc<AtomicBool>,
}

const DUPLICATE_MESSAGE: &str =
    "El DNI/RUC ya está registrado. Por favor utiliza uno diferente.";

impl RecordBackend {
    fn duplicate(&self, dni: &str, exclude_id: Option<i64>) -> bool {
        self.records.lock().unwrap().iter().any(|record| {
            record["dni_ruc"].as_str() == Some(dni)
                && exclude_id.map_or(true, |id| record["id_clientes"].as_i64() != Some(id))
        })
    }
}

async fn backend_login(Json(body): Json<Value>) -> Response {
    let usuario = body["usuario"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if usuario == "ana" && password == "x" {
        Json(json!({ "ok": true, "user": { "id_usuarios": 1, "usuario": "ana" } }))
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "ok": false, "error": "Credenciales inválidas" })),
        )
            .into_response()
    }
}

async fn backend_list(State(state): State<RecordBackend>) -> Response {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    if state.html_mode.load(Ordering::SeqCst) {
        return (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response();
    }
    let records = state.records.lock().unwrap().clone();
    Json(json!({ "ok": true, "clientes": records })).into_response()
}

async fn backend_create(State(state): State<RecordBackend>, Json(body): Json<Value>) -> Response {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    let dni = body["dni_ruc"].as_str().unwrap_or_default().to_string();
    if state.duplicate(&dni, None) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "ok": false, "error": "duplicate", "message": DUPLICATE_MESSAGE })),
        )
            .into_response();
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let record = json!({
        "id_clientes": id,
        "dni_ruc": dni,
        "nombre_completo": body["nombre_completo"],
        "telefono": body["telefono"],
        "correo": body["correo"],
        "direccion": body["direccion"],
        "estado": body.get("estado").cloned().unwrap_or_else(|| json!("Activo")),
    });
    state.records.lock().unwrap().push(record.clone());
    Json(json!({ "ok": true, "cliente": record })).into_response()
}

async fn backend_update(
    State(state): State<RecordBackend>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.update_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(dni) = body["dni_ruc"].as_str() {
        if state.duplicate(dni, Some(id)) {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "ok": false, "error": "duplicate", "message": DUPLICATE_MESSAGE })),
            )
                .into_response();
        }
    }
    let mut records = state.records.lock().unwrap();
    let Some(record) = records
        .iter_mut()
        .find(|record| record["id_clientes"].as_i64() == Some(id))
    else {
        return Json(json!({ "ok": true, "cliente": Value::Null })).into_response();
    };
    for field in [
        "dni_ruc",
        "nombre_completo",
        "telefono",
        "correo",
        "direccion",
        "estado",
    ] {
        if let Some(value) = body.get(field) {
            record[field] = value.clone();
        }
    }
    Json(json!({ "ok": true, "cliente": record.clone() })).into_response()
}

async fn backend_delete(State(state): State<RecordBackend>, Path(id): Path<i64>) -> Response {
    state.delete_calls.fetch_add(1, Ordering::SeqCst);
    state
        .records
        .lock()
        .unwrap()
        .retain(|record| record["id_clientes"].as_i64() != Some(id));
    Json(json!({ "ok": true })).into_response()
}

async fn backend_check(
    State(state): State<RecordBackend>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.check_calls.fetch_add(1, Ordering::SeqCst);
    let Some(dni) = params.get("dni_ruc") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "error": "dni_ruc query param required" })),
        )
            .into_response();
    };
    let exclude_id = params.get("id").and_then(|id| id.parse::<i64>().ok());
    let exists = state.duplicate(dni, exclude_id);
    Json(json!({ "ok": true, "exists": exists })).into_response()
}

/// Start the mock Backend Record Service on an ephemeral port.
pub async fn start_record_backend() -> (SocketAddr, RecordBackend, JoinHandle<()>) {
    let state = RecordBackend::default();
    let app = Router::new()
        .route("/login", post(backend_login))
        .route("/clientes", get(backend_list).post(backend_create))
        .route("/clientes/check", get(backend_check))
        .route("/clientes/{id}", put(backend_update).delete(backend_delete))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state, handle)
}

/// A listener that answers every connection with non-HTTP bytes, counting hits.
pub async fn start_garbage_backend() -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let _ = socket.write_all(b"this is not http at all\r\n").await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    (addr, hits)
}

/// A listener that speaks valid HTTP but returns an HTML body.
pub async fn start_html_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let body = "<html>database error</html>";
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway config pointing at the given upstream base and fallback.
pub fn gateway_config(base: SocketAddr, fallback: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", base);
    config.upstream.fallback_url = format!("http://{}", fallback);
    config
}

/// Spawn a gateway on an ephemeral port, returning its address.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// A browser-like client: cookie jar on, redirects left alone.
pub fn browser_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Log in as the test user and return the session-carrying client.
pub async fn login_as_ana(gateway: SocketAddr) -> reqwest::Client {
    let client = browser_client();
    let response = client
        .post(format!("http://{}/login", gateway))
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&serde_json::json!({ "usuario": "ana", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "test login should succeed");
    client
}
