//! Health check handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm: String,
    pub retriever: String,
}

/// GET /api/health - Report that the service is up and which backends it uses.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        llm: state.tagger.provider_name().to_string(),
        retriever: state.tagger.retriever_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use carelog::Tagger;
    use carelog::llm::MockProvider;
    use carelog::retrieval::StaticRetriever;
    use tower::ServiceExt;

    use crate::server::app::create_router;
    use crate::server::state::AppState;

    #[tokio::test]
    async fn test_health_names_backends() {
        let tagger = Tagger::new(Arc::new(MockProvider::new()), Arc::new(StaticRetriever::default()));
        let response = create_router(AppState::new(tagger))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["llm"], "mock");
        assert_eq!(json["retriever"], "static");
    }
}
