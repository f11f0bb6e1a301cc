//! Mock collaborators for testing

use crate::error::{RouterError, RouterResult};
use crate::guard::{NavigationUi, SessionProvider};
use crate::service::MenuService;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

/// Shared count of fetches made by a [`MockMenuService`]
#[derive(Debug, Clone, Default)]
pub struct FetchCounter(Arc<AtomicUsize>);

impl FetchCounter {
    /// Number of fetches so far
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scripted failure returned by a [`MockMenuService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Transport failure
    Fetch(String),
    /// Session rejected
    Unauthorized(String),
}

/// Mock menu service returning a scripted payload
///
/// Clones share the payload, failure and fetch counter, so a test can keep a
/// handle and reconfigure the service after giving it to a store.
#[derive(Debug, Clone)]
pub struct MockMenuService {
    response: Arc<Mutex<serde_json::Value>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
    delay_ms: u64,
    fetches: FetchCounter,
}

impl MockMenuService {
    /// Create a mock answering with `response`
    #[must_use]
    pub fn new(response: serde_json::Value) -> Self {
        Self {
            response: Arc::new(Mutex::new(response)),
            failure: Arc::new(Mutex::new(None)),
            delay_ms: 0,
            fetches: FetchCounter::default(),
        }
    }

    /// Set fetch delay for testing
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Configure to fail fetches
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.set_failure(Some(MockFailure::Fetch(message.into())));
        self
    }

    /// Configure to reject the session
    #[must_use]
    pub fn with_unauthorized(self, message: impl Into<String>) -> Self {
        self.set_failure(Some(MockFailure::Unauthorized(message.into())));
        self
    }

    /// Replace the scripted failure, `None` to succeed again
    pub fn set_failure(&self, failure: Option<MockFailure>) {
        *self.failure.lock() = failure;
    }

    /// Replace the payload returned by later fetches
    pub fn set_response(&self, response: serde_json::Value) {
        *self.response.lock() = response;
    }

    /// Handle on the fetch count
    #[must_use]
    pub fn fetch_counter(&self) -> FetchCounter {
        self.fetches.clone()
    }
}

#[async_trait]
impl MenuService for MockMenuService {
    async fn fetch_menu(&self) -> RouterResult<serde_json::Value> {
        self.fetches.0.fetch_add(1, Ordering::SeqCst);

        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let failure = self.failure.lock().clone();
        match failure {
            Some(MockFailure::Fetch(message)) => Err(RouterError::fetch_failure(message)),
            Some(MockFailure::Unauthorized(message)) => Err(RouterError::unauthorized(message)),
            None => Ok(self.response.lock().clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Session whose authentication state is set by the test
#[derive(Debug, Default)]
pub struct StaticSession {
    authenticated: AtomicBool,
    logouts: AtomicUsize,
}

impl StaticSession {
    /// Create a session in the given state
    #[must_use]
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
            logouts: AtomicUsize::new(0),
        }
    }

    /// Change the authentication state
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Number of logout calls
    #[must_use]
    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.authenticated.store(false, Ordering::SeqCst);
    }
}

/// A call made on a [`RecordingUi`]
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Progress shown
    Show,
    /// Progress set to a percentage
    Progress(f32),
    /// Progress finished
    Finish,
    /// Progress hidden
    Hide,
    /// Document title set
    Title(String),
}

/// Navigation UI recording every call
#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Forget recorded calls
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl NavigationUi for RecordingUi {
    fn show_progress(&self) {
        self.record(UiEvent::Show);
    }

    fn set_progress(&self, percent: f32) {
        self.record(UiEvent::Progress(percent));
    }

    fn finish_progress(&self) {
        self.record(UiEvent::Finish);
    }

    fn hide_progress(&self) {
        self.record(UiEvent::Hide);
    }

    fn set_document_title(&self, title: &str) {
        self.record(UiEvent::Title(title.to_string()));
    }
}
