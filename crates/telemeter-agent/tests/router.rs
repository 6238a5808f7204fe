#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use telemeter_agent::{app_state::AppState, config, router};

const CFG: &str = r#"
version: 1
registry:
  labels: { host: "a" }
collectors:
  process: false
  build_info: true
storages:
  - kind: expvar
    id: metrics
"#;

async fn app() -> axum::Router {
    let cfg = config::load_from_str(CFG).unwrap();
    let state = AppState::new(&cfg).await.unwrap();
    router::build_router(state)
}

#[tokio::test(flavor = "multi_thread")]
async fn healthz_is_ok() {
    let resp = app()
        .await
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn debug_vars_renders_each_expvar_storage() {
    let resp = app()
        .await
        .oneshot(Request::builder().uri("/debug/vars").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let vars: Value = serde_json::from_slice(&body).unwrap();
    let key = format!(
        "build_info{{name=telemeter-agent,version={}}}",
        env!("CARGO_PKG_VERSION")
    );
    let info = &vars["metrics"][key.as_str()];
    assert_eq!(info["value"], 1.0);
    assert_eq!(info["labels"]["host"], "a");
    assert_eq!(info["labels"]["name"], "telemeter-agent");
}

#[tokio::test(flavor = "multi_thread")]
async fn app_state_wires_registry() {
    let cfg = config::load_from_str(CFG).unwrap();
    let state = AppState::new(&cfg).await.unwrap();
    assert_eq!(state.registry().collector_count(), 1);
    assert_eq!(state.registry().storage_ids(), vec!["metrics".to_string()]);
    assert!(!state.registry().is_running());
    assert_eq!(state.expvars().len(), 1);
}
