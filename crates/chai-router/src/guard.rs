//! Navigation guard
//!
//! Runs before every navigation attempt and decides whether it proceeds or is
//! redirected. Menu data and dynamic routes are loaded on the first
//! authenticated navigation; any failure lands on a safe page.

use crate::error::RouterError;
use crate::path::normalize_route_path;
use crate::store::MenuStore;
use crate::table::RouteTable;
use async_trait::async_trait;
use chai_core::{ConsoleConfig, RouterConfig};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Progress reached before a navigation is handed back to the router
const HANDOFF_PROGRESS: f32 = 90.0;

/// Auth/session collaborator
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Whether a user is signed in
    fn is_authenticated(&self) -> bool;

    /// End the session
    async fn logout(&self);
}

/// Progress indicator and document title collaborator
pub trait NavigationUi: Send + Sync {
    /// Show the progress indicator
    fn show_progress(&self);

    /// Set progress in percent
    fn set_progress(&self, percent: f32);

    /// Complete and dismiss the progress indicator
    fn finish_progress(&self);

    /// Dismiss the progress indicator without completing it
    fn hide_progress(&self);

    /// Set the document title
    fn set_document_title(&self, title: &str);
}

/// A navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Target path without query
    pub path: String,
    /// Target path including query and hash
    pub full_path: String,
}

impl NavigationRequest {
    /// Navigation to a path; the query, if any, is kept in `full_path`
    pub fn new(full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let path = full_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self { path, full_path }
    }
}

/// Why a navigation was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// No session, sent to login
    Unauthenticated,
    /// The user has no accessible routes
    EmptyAccessSet,
    /// Root path sent to the landing page
    RootLanding,
    /// Path not among the user's menus
    NotAccessible,
    /// Same target re-dispatched now that dynamic routes exist
    Reload,
    /// Menu data failed to load
    LoadFailed,
}

/// Redirect target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Target path
    pub path: String,
    /// Query parameters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    /// Replace the current history entry
    pub replace: bool,
    /// Why the redirect happened
    pub reason: RedirectReason,
}

impl Redirect {
    fn to(path: impl Into<String>, reason: RedirectReason) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            replace: false,
            reason,
        }
    }

    /// Path with the encoded query string
    #[must_use]
    pub fn location(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

/// Outcome of the guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    /// Proceed to the target
    Allow,
    /// Go elsewhere
    Redirect(Redirect),
}

impl NavigationDecision {
    /// Redirect target, if redirected
    #[must_use]
    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Allow => None,
            Self::Redirect(redirect) => Some(redirect),
        }
    }
}

/// Finishes progress when the guard returns
struct ProgressScope<'a>(&'a dyn NavigationUi);

impl<'a> ProgressScope<'a> {
    fn begin(ui: &'a dyn NavigationUi) -> Self {
        ui.show_progress();
        Self(ui)
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.0.finish_progress();
    }
}

/// Per-navigation state machine
pub struct NavigationGuard {
    store: Arc<MenuStore>,
    table: Arc<RouteTable>,
    session: Arc<dyn SessionProvider>,
    ui: Arc<dyn NavigationUi>,
    config: RouterConfig,
    app_title: String,
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("store", &self.store)
            .field("table", &self.table)
            .field("app_title", &self.app_title)
            .finish_non_exhaustive()
    }
}

impl NavigationGuard {
    /// Create a guard over a store and route table
    pub fn new(
        store: Arc<MenuStore>,
        table: Arc<RouteTable>,
        session: Arc<dyn SessionProvider>,
        ui: Arc<dyn NavigationUi>,
        config: &ConsoleConfig,
    ) -> Self {
        Self {
            store,
            table,
            session,
            ui,
            config: config.router.clone(),
            app_title: config.app.title.clone(),
        }
    }

    /// Menu store consulted by the guard
    #[must_use]
    pub const fn store(&self) -> &Arc<MenuStore> {
        &self.store
    }

    /// Route table the guard installs into
    #[must_use]
    pub const fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Decide a navigation attempt
    #[instrument(skip(self), fields(path = %request.path))]
    pub async fn before_each(&self, request: &NavigationRequest) -> NavigationDecision {
        let _progress = ProgressScope::begin(self.ui.as_ref());

        if let Some(title) = self.table.title_for(&request.path) {
            self.ui
                .set_document_title(&format!("{title} - {}", self.app_title));
        }

        if self.config.is_public(&request.path) {
            debug!("public path");
            return NavigationDecision::Allow;
        }

        if !self.session.is_authenticated() {
            info!("not authenticated, redirecting to login");
            let mut redirect = Redirect::to(&self.config.login_path, RedirectReason::Unauthenticated);
            redirect
                .query
                .push(("redirect".to_string(), request.full_path.clone()));
            return NavigationDecision::Redirect(redirect);
        }

        if self.table.is_loaded() {
            self.ui.set_progress(HANDOFF_PROGRESS);
            return NavigationDecision::Allow;
        }

        let generation = self.store.generation();
        match self.store.load_menu_data(false).await {
            Ok(_) if self.store.generation() != generation => {
                warn!("session ended while loading menu data");
                self.load_failed(&RouterError::fetch_failure("session ended during load"))
            }
            Ok(routes) => {
                self.table.install(Arc::clone(&routes));
                self.after_load(request, routes.is_empty())
            }
            Err(err) => self.load_failed(&err),
        }
    }

    fn after_load(&self, request: &NavigationRequest, empty: bool) -> NavigationDecision {
        if empty {
            warn!("no accessible routes for this session");
            return NavigationDecision::Redirect(Redirect::to(
                &self.config.forbidden_path,
                RedirectReason::EmptyAccessSet,
            ));
        }

        let path = normalize_route_path(&request.path);
        if path == "/" {
            return NavigationDecision::Redirect(Redirect::to(
                &self.config.landing_path,
                RedirectReason::RootLanding,
            ));
        }

        if path != normalize_route_path(&self.config.landing_path)
            && self.store.find_by_path(&path).is_none()
        {
            warn!(path = %path, "path not among granted menus");
            return NavigationDecision::Redirect(Redirect::to(
                &self.config.forbidden_path,
                RedirectReason::NotAccessible,
            ));
        }

        self.ui.set_progress(HANDOFF_PROGRESS);
        let mut redirect = Redirect::to(&request.full_path, RedirectReason::Reload);
        redirect.replace = true;
        NavigationDecision::Redirect(redirect)
    }

    fn load_failed(&self, err: &RouterError) -> NavigationDecision {
        let target = self
            .store
            .get_first_visible_route()
            .unwrap_or_else(|| self.config.forbidden_path.clone());
        let target = normalize_route_path(&target);
        error!(error = %err, fallback = %target, "failed to load dynamic routes");
        NavigationDecision::Redirect(Redirect::to(target, RedirectReason::LoadFailed))
    }

    /// Completion hook run after every navigation
    pub fn after_each(&self) {
        self.ui.finish_progress();
    }

    /// Navigation error hook
    pub fn on_error(&self, err: &(dyn std::error::Error + 'static)) {
        self.ui.hide_progress();
        error!(error = %err, "navigation error");
    }

    /// End the session and drop everything loaded for it
    pub async fn logout(&self) {
        self.session.logout().await;
        self.store.clear();
        self.table.reset();
        info!("session ended, dynamic routes removed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockMenuService, RecordingUi, StaticSession, UiEvent};
    use crate::view::ViewRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Harness {
        guard: NavigationGuard,
        ui: Arc<RecordingUi>,
    }

    fn harness(service: MockMenuService, authenticated: bool) -> Harness {
        let config = ConsoleConfig::default();
        let store = Arc::new(MenuStore::new(
            Arc::new(service),
            ViewRegistry::new(),
            &config.router,
        ));
        let table = Arc::new(RouteTable::new(&config.router));
        let ui = Arc::new(RecordingUi::new());
        let guard = NavigationGuard::new(
            store,
            table,
            Arc::new(StaticSession::new(authenticated)),
            Arc::clone(&ui) as Arc<dyn NavigationUi>,
            &config,
        );
        Harness { guard, ui }
    }

    fn menus() -> serde_json::Value {
        json!([
            { "id": "1", "menuType": 1, "menuName": "System", "path": "/system" },
            { "id": "2", "parentId": "1", "menuType": 2, "menuName": "Users", "path": "/system/user" }
        ])
    }

    #[test]
    fn test_request_splits_query() {
        let request = NavigationRequest::new("/system/user?page=2#top");
        assert_eq!(request.path, "/system/user");
        assert_eq!(request.full_path, "/system/user?page=2#top");
    }

    #[test]
    fn test_redirect_location_encodes_query() {
        let mut redirect = Redirect::to("/login", RedirectReason::Unauthenticated);
        redirect
            .query
            .push(("redirect".to_string(), "/system/user?page=2".to_string()));
        assert_eq!(redirect.location(), "/login?redirect=%2Fsystem%2Fuser%3Fpage%3D2");
    }

    #[tokio::test]
    async fn test_public_path_allowed_with_title() {
        let h = harness(MockMenuService::new(menus()), false);

        let decision = h.guard.before_each(&NavigationRequest::new("/login")).await;
        assert_eq!(decision, NavigationDecision::Allow);
        assert_eq!(
            h.ui.events(),
            vec![
                UiEvent::Show,
                UiEvent::Title("Login - Chai Admin".to_string()),
                UiEvent::Finish
            ]
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_goes_to_login() {
        let h = harness(MockMenuService::new(menus()), false);

        let decision = h
            .guard
            .before_each(&NavigationRequest::new("/system/user?tab=2"))
            .await;
        let redirect = decision.redirect().unwrap();
        assert_eq!(redirect.reason, RedirectReason::Unauthenticated);
        assert_eq!(redirect.path, "/login");
        assert_eq!(
            redirect.query,
            vec![("redirect".to_string(), "/system/user?tab=2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_first_navigation_reloads_with_replace() {
        let h = harness(MockMenuService::new(menus()), true);

        let decision = h.guard.before_each(&NavigationRequest::new("/system/user")).await;
        let redirect = decision.redirect().unwrap();
        assert_eq!(redirect.reason, RedirectReason::Reload);
        assert_eq!(redirect.path, "/system/user");
        assert!(redirect.replace);
        assert!(h.ui.events().contains(&UiEvent::Progress(90.0)));
        assert_eq!(h.ui.events().last(), Some(&UiEvent::Finish));

        h.ui.clear();
        let decision = h.guard.before_each(&NavigationRequest::new("/system/user")).await;
        assert_eq!(decision, NavigationDecision::Allow);
        assert_eq!(
            h.ui.events(),
            vec![
                UiEvent::Show,
                UiEvent::Title("Users - Chai Admin".to_string()),
                UiEvent::Progress(90.0),
                UiEvent::Finish
            ]
        );
    }

    #[tokio::test]
    async fn test_error_hook_hides_progress() {
        let h = harness(MockMenuService::new(menus()), true);

        h.guard.on_error(&RouterError::view_load("system/user/index", "chunk failed"));
        h.guard.after_each();
        assert_eq!(h.ui.events(), vec![UiEvent::Hide, UiEvent::Finish]);
    }
}
