//! Live route table
//!
//! Static base routes are always present. Dynamic routes are installed once
//! menu data has loaded and removed again on logout.

use crate::path::normalize_route_path;
use crate::route::{RouteDefinition, flatten_routes};
use chai_core::RouterConfig;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A route that exists independently of menu data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    /// Route path
    pub path: String,
    /// Route name
    pub name: String,
    /// Document title
    pub title: String,
    /// Redirect target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl StaticRoute {
    fn new(path: &str, name: &str, title: &str) -> Self {
        Self {
            path: normalize_route_path(path),
            name: name.to_string(),
            title: title.to_string(),
            redirect: None,
        }
    }
}

/// Where a resolved route came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOrigin {
    /// A static base route
    Static,
    /// A route materialized from menu data
    Dynamic,
    /// The catch-all rule for unknown paths
    CatchAll,
}

/// Result of resolving a path against the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// Matched route path
    pub path: String,
    /// Route title
    pub title: Option<String>,
    /// Redirect target
    pub redirect: Option<String>,
    /// Route origin
    pub origin: RouteOrigin,
}

/// Static base routes plus the installed dynamic routes
#[derive(Debug)]
pub struct RouteTable {
    static_routes: Vec<StaticRoute>,
    not_found_path: String,
    dynamic: RwLock<Arc<Vec<RouteDefinition>>>,
    loaded: AtomicBool,
}

impl RouteTable {
    /// Create a table holding only the static base routes
    pub fn new(config: &RouterConfig) -> Self {
        let landing = normalize_route_path(&config.landing_path);
        let static_routes = vec![
            StaticRoute::new(&config.login_path, "Login", "Login"),
            StaticRoute::new(&config.not_found_path, "NotFound", "Page Not Found"),
            StaticRoute::new(&config.forbidden_path, "Forbidden", "Access Denied"),
            StaticRoute::new(&config.server_error_path, "ServerError", "Server Error"),
            StaticRoute {
                redirect: Some(landing.clone()),
                ..StaticRoute::new("/", "Layout", &config.home_title)
            },
            StaticRoute::new(&landing, "Dashboard", &config.home_title),
        ];

        Self {
            static_routes,
            not_found_path: normalize_route_path(&config.not_found_path),
            dynamic: RwLock::new(Arc::new(Vec::new())),
            loaded: AtomicBool::new(false),
        }
    }

    /// Replace the dynamic routes and mark them loaded
    ///
    /// An empty list still counts as loaded so navigation does not keep
    /// reloading an empty access set.
    pub fn install(&self, routes: Arc<Vec<RouteDefinition>>) {
        let count = routes.len();
        *self.dynamic.write() = routes;
        self.loaded.store(true, Ordering::Release);
        tracing::info!(routes = count, "dynamic routes installed");
    }

    /// Drop every dynamic route, keeping only the static base
    pub fn reset(&self) {
        *self.dynamic.write() = Arc::new(Vec::new());
        self.loaded.store(false, Ordering::Release);
        tracing::info!("route table reset to static routes");
    }

    /// Whether dynamic routes have been installed this session
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Whether any dynamic route is installed
    pub fn has_dynamic_routes(&self) -> bool {
        !self.dynamic.read().is_empty()
    }

    /// Installed dynamic routes
    pub fn dynamic_routes(&self) -> Arc<Vec<RouteDefinition>> {
        Arc::clone(&self.dynamic.read())
    }

    /// Static base routes
    pub fn static_routes(&self) -> &[StaticRoute] {
        &self.static_routes
    }

    /// Resolve a path against static and dynamic routes
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let target = normalize_route_path(path);

        if let Some(route) = self.static_routes.iter().find(|r| r.path == target) {
            return Some(RouteMatch {
                path: route.path.clone(),
                title: Some(route.title.clone()),
                redirect: route.redirect.clone(),
                origin: RouteOrigin::Static,
            });
        }

        let dynamic = self.dynamic.read();
        flatten_routes(&dynamic)
            .find(|route| route.path == target)
            .map(|route| RouteMatch {
                path: route.path.clone(),
                title: Some(route.meta.title.clone()),
                redirect: route.redirect.clone(),
                origin: RouteOrigin::Dynamic,
            })
    }

    /// Resolve a path, sending unknown paths to the not-found page once
    /// dynamic routes are installed
    pub fn resolve_with_catch_all(&self, path: &str) -> Option<RouteMatch> {
        self.resolve(path).or_else(|| {
            self.has_dynamic_routes().then(|| RouteMatch {
                path: normalize_route_path(path),
                title: None,
                redirect: Some(self.not_found_path.clone()),
                origin: RouteOrigin::CatchAll,
            })
        })
    }

    /// Title of the route at `path`
    pub fn title_for(&self, path: &str) -> Option<String> {
        self.resolve(path).and_then(|matched| matched.title)
    }
}
