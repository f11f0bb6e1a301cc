//! Menu/route store
//!
//! Holds the single in-memory copy of the loaded permission nodes together
//! with the menu tree and route list derived from them. All mutation goes
//! through [`MenuStore::load_menu_data`] and [`MenuStore::clear`]; readers get
//! shared snapshots.

use crate::error::{RouterError, RouterResult};
use crate::path::normalize_route_path;
use crate::route::{RouteDefinition, RouteMaterializer};
use crate::service::MenuService;
use crate::tree::{BuildOptions, PermissionTreeNode, build_tree, home_node};
use crate::view::{ComponentResolver, ViewRegistry};
use chai_core::types::parse_permission_nodes;
use chai_core::{MenuType, NodeId, PermissionNode, RouterConfig};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Default)]
struct MenuState {
    nodes: Arc<Vec<PermissionNode>>,
    index: IndexMap<NodeId, usize>,
    tree: Arc<Vec<PermissionTreeNode>>,
    routes: Arc<Vec<RouteDefinition>>,
    loaded: bool,
    last_error: Option<String>,
}

/// Point-in-time view of the store state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSnapshot {
    /// Menu data has been loaded
    pub loaded: bool,
    /// A load is in flight
    pub loading: bool,
    /// Number of raw permission nodes
    pub node_count: usize,
    /// Number of top-level dynamic routes
    pub route_count: usize,
    /// Message of the last failed load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Clears the loading flag however the load exits
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of loaded menu data and everything derived from it
pub struct MenuStore {
    service: Arc<dyn MenuService>,
    materializer: RouteMaterializer,
    build_options: BuildOptions,
    home: PermissionTreeNode,
    state: RwLock<MenuState>,
    loading: AtomicBool,
    generation: AtomicU64,
    load_latch: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for MenuStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuStore")
            .field("service", &self.service.name())
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl MenuStore {
    /// Create an empty store
    pub fn new(service: Arc<dyn MenuService>, registry: ViewRegistry, config: &RouterConfig) -> Self {
        let resolver = Arc::new(ComponentResolver::new(registry, &config.not_found_view));
        Self {
            service,
            materializer: RouteMaterializer::new(resolver),
            build_options: BuildOptions::default().max_depth(config.max_depth),
            home: home_node(config),
            state: RwLock::new(MenuState::default()),
            loading: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            load_latch: tokio::sync::Mutex::new(()),
        }
    }

    /// Override the options used to build the menu tree
    #[must_use]
    pub const fn with_build_options(mut self, options: BuildOptions) -> Self {
        self.build_options = options;
        self
    }

    /// Load menu data once per session
    ///
    /// Without `force_refresh` this returns the stored routes when data is
    /// already loaded. Concurrent callers wait for the in-flight load instead
    /// of fetching again.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or `MalformedResponse` when the payload is not
    /// an array of permission nodes. A load overtaken by [`MenuStore::clear`]
    /// fails with a retryable `FetchFailure`. The error message is kept for
    /// [`MenuStore::last_error`].
    #[instrument(skip(self), fields(service = %self.service.name()))]
    pub async fn load_menu_data(&self, force_refresh: bool) -> RouterResult<Arc<Vec<RouteDefinition>>> {
        if !force_refresh && self.is_loaded() {
            debug!("menu data already loaded");
            return Ok(self.dynamic_routes());
        }

        let _latch = self.load_latch.lock().await;
        if !force_refresh && self.is_loaded() {
            debug!("menu data loaded by concurrent caller");
            return Ok(self.dynamic_routes());
        }

        let generation = self.generation.load(Ordering::Acquire);
        let _loading = LoadingFlag::raise(&self.loading);
        self.state.write().last_error = None;
        info!("loading menu data");

        match self.fetch_nodes().await {
            Ok(nodes) => {
                let tree = build_tree(&nodes, &self.build_options);
                let routes = Arc::new(self.materializer.transform(&nodes));

                let mut state = self.state.write();
                if self.generation.load(Ordering::Acquire) != generation {
                    warn!("menu store cleared during load, discarding result");
                    return Err(RouterError::fetch_failure("menu store cleared during load"));
                }

                let mut index = IndexMap::with_capacity(nodes.len());
                for (position, node) in nodes.iter().enumerate() {
                    index.entry(node.id.clone()).or_insert(position);
                }
                info!(nodes = nodes.len(), routes = routes.len(), "menu data loaded");

                state.nodes = Arc::new(nodes);
                state.index = index;
                state.tree = Arc::new(tree);
                state.routes = Arc::clone(&routes);
                state.loaded = true;
                Ok(routes)
            }
            Err(err) => {
                error!(error = %err, retryable = err.is_retryable(), "failed to load menu data");
                if self.generation.load(Ordering::Acquire) == generation {
                    self.state.write().last_error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    async fn fetch_nodes(&self) -> RouterResult<Vec<PermissionNode>> {
        let payload = self.service.fetch_menu().await?;
        Ok(parse_permission_nodes(payload)?)
    }

    /// Reset to the initial empty state and drop cached view resolutions
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        *self.state.write() = MenuState::default();
        self.materializer.reset_caches();
        info!("menu store cleared");
    }

    /// Counter bumped by every [`MenuStore::clear`]
    ///
    /// Callers holding results across an await compare it to detect a logout
    /// in between.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Materialized routes, empty before the first load
    pub fn dynamic_routes(&self) -> Arc<Vec<RouteDefinition>> {
        Arc::clone(&self.state.read().routes)
    }

    /// Navigation tree with the home entry first
    pub fn menu_tree(&self) -> Vec<PermissionTreeNode> {
        let state = self.state.read();
        std::iter::once(self.home.clone())
            .chain(state.tree.iter().cloned())
            .collect()
    }

    /// Loaded permission nodes in backend order
    pub fn raw_nodes(&self) -> Arc<Vec<PermissionNode>> {
        Arc::clone(&self.state.read().nodes)
    }

    /// Whether menu data has been loaded
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Message of the last failed load
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Current state summary
    pub fn snapshot(&self) -> MenuSnapshot {
        let state = self.state.read();
        MenuSnapshot {
            loaded: state.loaded,
            loading: self.is_loading(),
            node_count: state.nodes.len(),
            route_count: state.routes.len(),
            last_error: state.last_error.clone(),
        }
    }

    /// Find a node by route path
    pub fn find_by_path(&self, path: &str) -> Option<PermissionNode> {
        let target = normalize_route_path(path);
        self.state
            .read()
            .nodes
            .iter()
            .find(|node| normalize_route_path(&node.path) == target)
            .cloned()
    }

    /// Find a node by identifier
    pub fn find_by_id(&self, id: &NodeId) -> Option<PermissionNode> {
        let state = self.state.read();
        state
            .index
            .get(id)
            .and_then(|&position| state.nodes.get(position))
            .cloned()
    }

    /// Ancestry of the node at `path`, root first
    ///
    /// Empty when no node matches. The walk stops at a missing parent or a
    /// parent cycle.
    pub fn get_breadcrumb(&self, path: &str) -> Vec<PermissionNode> {
        let Some(mut current) = self.find_by_path(path) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut trail = Vec::new();
        loop {
            if !seen.insert(current.id.clone()) {
                break;
            }
            let parent = current
                .parent_id
                .as_ref()
                .and_then(|parent| self.find_by_id(parent));
            trail.push(current);
            match parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        trail.reverse();
        trail
    }

    /// Path of the first menu node in backend order
    pub fn get_first_visible_route(&self) -> Option<String> {
        self.state
            .read()
            .nodes
            .iter()
            .find(|node| node.menu_type == MenuType::Menu)
            .map(|node| normalize_route_path(&node.path))
    }
}
