//! Common test utilities and fixtures for integration tests

#![allow(dead_code, unreachable_pub)]

pub mod fixtures;

pub use fixtures::*;

use chai_core::ConsoleConfig;
use chai_router::mock::{MockMenuService, RecordingUi, StaticSession};
use chai_router::{MenuStore, NavigationGuard, NavigationUi, RouteTable, SessionProvider, ViewRegistry};
use std::sync::Arc;

/// Marker value registered for each view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page(pub &'static str);

/// Views the fixtures reference, plus the not-found view
pub fn view_registry() -> ViewRegistry {
    ViewRegistry::new()
        .with_view("system/user/index", Page("users"))
        .with_view("system/role/index", Page("roles"))
        .with_view("monitor/cacheView", Page("cache"))
        .with_view("reports/index", Page("reports"))
        .with_view("error/404View", Page("not found"))
}

/// Fully wired guard with handles on its collaborators
pub struct TestApp {
    pub guard: NavigationGuard,
    pub store: Arc<MenuStore>,
    pub table: Arc<RouteTable>,
    pub session: Arc<StaticSession>,
    pub ui: Arc<RecordingUi>,
    pub service: MockMenuService,
}

impl TestApp {
    /// Build an app around a mock service
    pub fn new(service: MockMenuService, authenticated: bool) -> Self {
        let config = ConsoleConfig::default();
        let store = Arc::new(MenuStore::new(
            Arc::new(service.clone()),
            view_registry(),
            &config.router,
        ));
        let table = Arc::new(RouteTable::new(&config.router));
        let session = Arc::new(StaticSession::new(authenticated));
        let ui = Arc::new(RecordingUi::new());
        let guard = NavigationGuard::new(
            Arc::clone(&store),
            Arc::clone(&table),
            Arc::clone(&session) as Arc<dyn SessionProvider>,
            Arc::clone(&ui) as Arc<dyn NavigationUi>,
            &config,
        );

        Self {
            guard,
            store,
            table,
            session,
            ui,
            service,
        }
    }
}

/// Initialize test logging once
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("chai_router=debug")
        .with_test_writer()
        .try_init();
}
