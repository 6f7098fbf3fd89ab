//! Session gating and login flow tests for the gateway.

use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn record_endpoints_reject_missing_session() {
    let (backend_addr, backend, _handle) = common::start_record_backend().await;
    let (gateway, _shutdown) =
        common::spawn_gateway(common::gateway_config(backend_addr, backend_addr)).await;

    let client = common::browser_client();
    let base = format!("http://{}", gateway);

    let attempts = [
        client.get(format!("{}/api/clientes", base)),
        client.post(format!("{}/api/clientes", base)).json(&json!({
            "dni_ruc": "123", "nombre_completo": "X"
        })),
        client
            .put(format!("{}/api/clientes/1", base))
            .json(&json!({ "dni_ruc": "123" })),
        client.delete(format!("{}/api/clientes/1", base)),
        client.get(format!("{}/api/clientes/check?dni_ruc=123", base)),
    ];

    for request in attempts {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["ok"], false);
        assert!(body.get("clientes").is_none(), "no record data disclosed");
    }

    // The guard rejected before anything was forwarded.
    assert_eq!(backend.list_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(backend.create_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(backend.delete_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valid_login_establishes_session() {
    let (backend_addr, _backend, _handle) = common::start_record_backend().await;
    let (gateway, _shutdown) =
        common::spawn_gateway(common::gateway_config(backend_addr, backend_addr)).await;

    let client = common::login_as_ana(gateway).await;

    let response = client
        .get(format!("http://{}/api/session", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["usuario"], "ana");
}

#[tokio::test]
async fn invalid_login_establishes_no_session() {
    let (backend_addr, _backend, _handle) = common::start_record_backend().await;
    let (gateway, _shutdown) =
        common::spawn_gateway(common::gateway_config(backend_addr, backend_addr)).await;

    let client = common::browser_client();
    let response = client
        .post(format!("http://{}/login", gateway))
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&json!({ "usuario": "ana", "password": "wrong" }))
        .send()
        .await
        .unwrap();

    // Upstream verdict relayed unchanged.
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);

    let response = client
        .get(format!("http://{}/api/session", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn browser_form_login_redirects() {
    let (backend_addr, _backend, _handle) = common::start_record_backend().await;
    let (gateway, _shutdown) =
        common::spawn_gateway(common::gateway_config(backend_addr, backend_addr)).await;

    let client = common::browser_client();
    let response = client
        .post(format!("http://{}/login", gateway))
        .form(&[("usuario", "ana"), ("password", "x")])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[reqwest::header::LOCATION],
        "/clientes.html"
    );
}

#[tokio::test]
async fn logout_destroys_session_unconditionally() {
    let (backend_addr, _backend, _handle) = common::start_record_backend().await;
    let (gateway, _shutdown) =
        common::spawn_gateway(common::gateway_config(backend_addr, backend_addr)).await;

    let client = common::login_as_ana(gateway).await;

    let response = client
        .get(format!("http://{}/logout", gateway))
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("http://{}/api/session", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Logging out again without a session still completes.
    let response = client
        .get(format!("http://{}/logout", gateway))
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let (backend_addr, _backend, _handle) = common::start_record_backend().await;
    let mut config = common::gateway_config(backend_addr, backend_addr);
    config.session.ttl_secs = 1;
    let (gateway, _shutdown) = common::spawn_gateway(config).await;

    let client = common::login_as_ana(gateway).await;
    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;

    let response = client
        .get(format!("http://{}/api/clientes", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
