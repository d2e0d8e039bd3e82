//! Health check endpoint.

use axum::Json;
use serde::Serialize;

/// Health status.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Status {
    /// Always `ok` while the server is able to answer.
    pub status: &'static str,
}

/// Reports that the server is up.
#[expect(clippy::unused_async, reason = "`axum` handler")]
pub async fn check() -> Json<Status> {
    Json(Status { status: "ok" })
}

#[cfg(test)]
mod tests {
    use crate::tests::{router, send, service};

    #[tokio::test]
    async fn reports_ok() {
        let resp =
            send(&router(service()), http::Method::GET, "/api/health", None, None)
                .await;

        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(resp.json["status"], "ok");
    }
}
