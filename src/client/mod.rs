// Client orchestrator: drawing surface + recognition endpoint + result panel
//
// Mirrors what the browser page does, so the full round trip can be driven
// (and tested) from Rust.

pub mod panel;

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error};

use crate::core::errors::{ClientError, ClientResult};
use crate::core::types::{RecognitionResponse, RecognizeRequest};
use crate::surface::{DrawingSurface, InputEvent};

pub use panel::{ConfidenceBand, ConfidenceDisplay, ResultPanel};

/// HTTP client for `POST /api/recognize`
pub struct RecognitionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl RecognitionClient {
    /// `base_url` is the server origin, e.g. `http://localhost:3000`
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/api/recognize", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn recognize(&self, image_data: &str) -> ClientResult<RecognitionResponse> {
        let body = RecognizeRequest {
            image_data: Some(image_data.to_string()),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Result of a `recognize` click
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizeOutcome {
    Recognized(RecognitionResponse),
    Failed,
    /// A request was already in flight
    Skipped,
}

/// Owns the pad, the result panel and the endpoint client
pub struct PadController {
    surface: Mutex<DrawingSurface>,
    panel: Mutex<ResultPanel>,
    client: RecognitionClient,
    in_flight: AtomicBool,
}

/// Hides the loading state and re-arms the trigger however the request ends
struct InFlightGuard<'a> {
    in_flight: &'a AtomicBool,
    panel: &'a Mutex<ResultPanel>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.panel.lock().finish_request();
        self.in_flight.store(false, Ordering::Release);
    }
}

impl PadController {
    pub fn new(surface: DrawingSurface, client: RecognitionClient) -> Self {
        Self {
            surface: Mutex::new(surface),
            panel: Mutex::new(ResultPanel::default()),
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn handle_input(&self, event: InputEvent) {
        self.surface.lock().handle_input(event);
    }

    pub fn resize(&self, container_width: u32) {
        self.surface.lock().resize(container_width);
    }

    /// Clear the pad and the result area
    pub fn clear(&self) {
        self.surface.lock().clear();
        self.panel.lock().reset();
    }

    pub fn panel(&self) -> ResultPanel {
        self.panel.lock().clone()
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&DrawingSurface) -> R) -> R {
        let surface = self.surface.lock();
        f(&*surface)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Export the pad, send it for recognition and update the panel
    pub async fn recognize(&self) -> RecognizeOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Recognition already in flight, ignoring trigger");
            return RecognizeOutcome::Skipped;
        }

        let _guard = InFlightGuard {
            in_flight: &self.in_flight,
            panel: &self.panel,
        };
        self.panel.lock().begin_request();

        match self.send_drawing().await {
            Ok(response) => {
                self.panel
                    .lock()
                    .show_result(&response.text, response.confidence);
                RecognizeOutcome::Recognized(response)
            }
            Err(e) => {
                error!("Error recognizing text: {}", e);
                self.panel.lock().show_failure();
                RecognizeOutcome::Failed
            }
        }
    }

    async fn send_drawing(&self) -> ClientResult<RecognitionResponse> {
        let image_data = self.surface.lock().export_data_uri()?;
        self.client.recognize(&image_data).await
    }
}

#[cfg(test)]
mod tests {
    use super::panel::{FAILURE_MESSAGE, NO_TEXT_PLACEHOLDER};
    use super::*;
    use crate::api::{router, testing::test_state};
    use crate::services::ocr::testing::FakeEngine;
    use crate::surface::Point;
    use std::sync::Arc;

    async fn spawn_server(engine: FakeEngine) -> (String, tempfile::TempDir) {
        let (state, temp_dir) = test_state(Arc::new(engine), &[]);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        (format!("http://{}", addr), temp_dir)
    }

    fn controller_for(base_url: &str) -> PadController {
        PadController::new(
            DrawingSurface::new(320),
            RecognitionClient::new(base_url).unwrap(),
        )
    }

    #[test]
    fn test_endpoint_url() {
        let client = RecognitionClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/recognize");
    }

    #[tokio::test]
    async fn test_recognize_updates_panel() {
        let (base_url, _dir) = spawn_server(FakeEngine::returning("Hello\n")).await;
        let controller = controller_for(&base_url);
        controller.handle_input(InputEvent::MouseDown(Point::new(10.0, 10.0)));
        controller.handle_input(InputEvent::MouseMove(Point::new(40.0, 40.0)));
        controller.handle_input(InputEvent::MouseUp);

        let outcome = controller.recognize().await;
        assert_eq!(
            outcome,
            RecognizeOutcome::Recognized(RecognitionResponse {
                text: "Hello".to_string(),
                confidence: crate::services::calculate_confidence("Hello"),
            })
        );

        let panel = controller.panel();
        assert_eq!(panel.text, "Hello");
        assert_eq!(panel.confidence.percentage, 55);
        assert_eq!(panel.confidence.band, ConfidenceBand::Medium);
        assert!(!panel.loading);
        assert!(panel.recognize_enabled);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_empty_text_shows_placeholder() {
        let (base_url, _dir) = spawn_server(FakeEngine::returning("  \n")).await;
        let controller = controller_for(&base_url);

        assert!(matches!(
            controller.recognize().await,
            RecognizeOutcome::Recognized(_)
        ));
        let panel = controller.panel();
        assert_eq!(panel.text, NO_TEXT_PLACEHOLDER);
        assert_eq!(panel.confidence.percentage, 0);
    }

    #[tokio::test]
    async fn test_server_error_shows_failure() {
        let (base_url, _dir) = spawn_server(FakeEngine::failing("engine crashed")).await;
        let controller = controller_for(&base_url);

        assert_eq!(controller.recognize().await, RecognizeOutcome::Failed);
        let panel = controller.panel();
        assert_eq!(panel.text, FAILURE_MESSAGE);
        assert_eq!(panel.confidence.percentage, 0);
        assert!(!panel.loading);
        assert!(panel.recognize_enabled);
    }

    #[tokio::test]
    async fn test_unreachable_server_shows_failure() {
        // Grab a free port, then close it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let controller = controller_for(&format!("http://{}", addr));
        assert_eq!(controller.recognize().await, RecognizeOutcome::Failed);
        assert!(!controller.panel().loading);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_overlapping_recognize_is_skipped() {
        let engine = FakeEngine::returning("abc").with_delay(Duration::from_millis(200));
        let (base_url, _dir) = spawn_server(engine).await;
        let controller = controller_for(&base_url);

        let (first, second) = tokio::join!(controller.recognize(), controller.recognize());
        assert!(matches!(first, RecognizeOutcome::Recognized(_)));
        assert_eq!(second, RecognizeOutcome::Skipped);

        // Trigger is re-armed afterwards
        assert!(matches!(
            controller.recognize().await,
            RecognizeOutcome::Recognized(_)
        ));
    }

    #[tokio::test]
    async fn test_clear_resets_pad_and_panel() {
        let (base_url, _dir) = spawn_server(FakeEngine::returning("Hello")).await;
        let controller = controller_for(&base_url);
        controller.handle_input(InputEvent::MouseDown(Point::new(50.0, 50.0)));
        controller.handle_input(InputEvent::MouseUp);
        controller.recognize().await;

        controller.clear();
        assert!(controller.with_surface(|s| s.is_blank()));
        let panel = controller.panel();
        assert!(panel.text.is_empty());
        assert_eq!(panel.confidence.percentage, 0);

        controller.resize(640);
        assert_eq!(controller.with_surface(|s| (s.width(), s.height())), (640, 300));
    }
}
