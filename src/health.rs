//! Built-in health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it serve traffic? |
//!
//! The post store lives in memory and is seeded before the listener opens,
//! so the service is ready as soon as it accepts connections.

use serde_json::{Value, json};

use crate::{Json, Request};

/// Always `200 OK` with `{"status":"ok"}`.
pub async fn liveness(_req: Request) -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `200 OK` with `{"status":"ready"}`.
pub async fn readiness(_req: Request) -> Json<Value> {
    Json(json!({ "status": "ready" }))
}
