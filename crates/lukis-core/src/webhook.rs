//! Webhook endpoint
//!
//! Accepts platform-pushed updates and always acknowledges with HTTP 200 so
//! the platform does not redeliver an update whose reply may already have
//! been sent. Failures are visible in the logs only.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::config::{Config, Lifecycle};
use crate::dispatch::Dispatcher;
use crate::telegram::Update;

/// Acknowledgement body returned for every call.
#[derive(Serialize)]
pub struct Ack {
    message: &'static str,
}

/// How webhook handlers obtain a dispatcher.
///
/// `Shared` reuses one dispatcher built at startup and never mutated again;
/// `PerRequest` rebuilds it on every call for execution environments that
/// cannot guarantee process reuse. External behavior is identical.
pub enum BotProvider {
    Shared(Arc<Dispatcher>),
    PerRequest(Arc<Config>),
}

impl BotProvider {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        match config.lifecycle {
            Lifecycle::Startup => Ok(Self::Shared(Arc::new(Dispatcher::from_config(&config)?))),
            Lifecycle::PerRequest => Ok(Self::PerRequest(Arc::new(config))),
        }
    }

    fn acquire(&self) -> anyhow::Result<Arc<Dispatcher>> {
        match self {
            Self::Shared(dispatcher) => Ok(dispatcher.clone()),
            Self::PerRequest(config) => Ok(Arc::new(Dispatcher::from_config(config)?)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    bots: Arc<BotProvider>,
}

impl AppState {
    pub fn new(bots: BotProvider) -> Self {
        Self {
            bots: Arc::new(bots),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root probe for deployment checks.
async fn index() -> Json<Ack> {
    Json(Ack {
        message: "Bot deployed successfully!",
    })
}

/// One platform update per call. The status is 200 no matter what happens;
/// a non-2xx here would make the platform retry delivery.
async fn webhook(State(state): State<AppState>, body: Bytes) -> Json<Ack> {
    match process_update(&state, &body).await {
        Ok(()) => Json(Ack { message: "ok" }),
        Err(e) => {
            error!("Webhook error: {}", e);
            Json(Ack { message: "error" })
        }
    }
}

async fn process_update(state: &AppState, body: &[u8]) -> anyhow::Result<()> {
    let update: Update = serde_json::from_slice(body)?;
    let dispatcher = state.bots.acquire()?;
    dispatcher.handle_update(&update).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatApi;
    use crate::dispatch::GREETING;
    use crate::generate::{Generation, ImageGenerator, SourceImage};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait::async_trait]
    impl ChatApi for RecordingChat {
        async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }

        async fn send_photo(
            &self,
            _chat_id: i64,
            _png: Vec<u8>,
            _caption: &str,
        ) -> anyhow::Result<()> {
            Ok(())
        }

        async fn fetch_photo(&self, _file_id: &str) -> anyhow::Result<Vec<u8>> {
            anyhow::bail!("no photos in this test")
        }
    }

    struct NoGenerator;

    #[async_trait::async_trait]
    impl ImageGenerator for NoGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<Generation> {
            anyhow::bail!("generator must not be called")
        }

        async fn edit(&self, _prompt: &str, _image: SourceImage) -> anyhow::Result<Generation> {
            anyhow::bail!("generator must not be called")
        }
    }

    fn test_state(chat: Arc<RecordingChat>) -> AppState {
        let dispatcher = Dispatcher::new(chat, Arc::new(NoGenerator));
        AppState::new(BotProvider::Shared(Arc::new(dispatcher)))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_webhook(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn index_reports_deployment() {
        let app = router(test_state(Arc::new(RecordingChat::default())));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            r#"{"message":"Bot deployed successfully!"}"#
        );
    }

    #[tokio::test]
    async fn malformed_update_still_returns_200() {
        let app = router(test_state(Arc::new(RecordingChat::default())));
        let response = app.oneshot(post_webhook("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"message":"error"}"#);
    }

    #[tokio::test]
    async fn start_update_is_dispatched_and_acknowledged() {
        let chat = Arc::new(RecordingChat::default());
        let app = router(test_state(chat.clone()));

        let update =
            r#"{"update_id":7,"message":{"message_id":1,"chat":{"id":42},"text":"/start"}}"#;
        let response = app.oneshot(post_webhook(update)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"message":"ok"}"#);

        let sent = chat.sent.lock().unwrap();
        assert_eq!(*sent, vec![(42, GREETING.to_string())]);
    }

    #[tokio::test]
    async fn ignored_update_is_still_acknowledged() {
        let chat = Arc::new(RecordingChat::default());
        let app = router(test_state(chat.clone()));

        let update =
            r#"{"update_id":8,"message":{"message_id":2,"chat":{"id":42},"text":"hi"}}"#;
        let response = app.oneshot(post_webhook(update)).await.unwrap();

        assert_eq!(body_string(response).await, r#"{"message":"ok"}"#);
        assert!(chat.sent.lock().unwrap().is_empty());
    }
}
