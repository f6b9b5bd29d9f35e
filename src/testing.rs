//! Test doubles for the HTTP transport and the notifier, plus a log
//! capture for asserting on emitted events.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::error::AppError;
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::models::JobItem;
use crate::notify::Notifier;

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// Scripted transport keyed by full URL. Unscripted URLs answer 404.
#[derive(Default)]
pub struct FakeHttp {
    routes: HashMap<String, Scripted>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.insert(
            url.to_string(),
            Scripted::Respond(HttpResponse {
                status,
                body: body.into(),
            }),
        );
        self
    }

    pub fn respond_json(self, url: &str, body: serde_json::Value) -> Self {
        self.respond(url, 200, body.to_string())
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.routes
            .insert(url.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().iter().map(HttpRequest::full_url).collect()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
        self.sent.lock().unwrap().push(request.clone());
        match self.routes.get(&request.full_url()) {
            Some(Scripted::Respond(resp)) => Ok(resp.clone()),
            Some(Scripted::Fail(msg)) => Err(AppError::Transport(msg.clone())),
            None => Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    items: Mutex<Vec<JobItem>>,
}

impl RecordingNotifier {
    pub fn items(&self) -> Vec<JobItem> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn dispatch(&self, item: &JobItem) {
        self.items.lock().unwrap().push(item.clone());
    }
}

/// Events recorded on the current thread while the guard is alive.
///
/// `#[tokio::test]` runs on a current-thread runtime, so everything the
/// test awaits is captured.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CapturedLogs {
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            events: logs.events.clone(),
        });
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.lock().unwrap().clone()
    }

    /// Whether some event at `level` has a message containing `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|(l, msg)| *l == level && msg.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.events().iter().filter(|(l, _)| *l == level).count()
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageVisitor::default();
        event.record(&mut message);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), message.0));
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
