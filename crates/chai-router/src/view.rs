//! View registry and component resolution
//!
//! Views are registered up front under a canonical key (see
//! [`canonical_view_key`]). A route's declared component reference is matched
//! against the registry by trying the exact key, then `{key}/index`, then
//! `{key}View`. Matches and fallbacks are cached per resolver instance, so a
//! broken reference only goes through fallback resolution once until the
//! caches are cleared.

use crate::error::{RouterError, RouterResult};
use crate::path::canonical_view_key;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cache key used for the shared not-found view
const NOT_FOUND_CACHE_KEY: &str = "__not_found__";

/// Type-erased loaded view
pub type ViewHandle = Arc<dyn Any + Send + Sync>;

/// Factory producing a view when a route is first activated
pub type ViewFactory = Arc<dyn Fn() -> BoxFuture<'static, RouterResult<ViewHandle>> + Send + Sync>;

/// A loaded view module
#[derive(Clone)]
pub struct ViewModule {
    key: String,
    handle: ViewHandle,
}

impl ViewModule {
    /// Registry key the module was loaded from
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the loaded view as a concrete type
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl fmt::Debug for ViewModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModule").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Minimal error view built when neither the requested nor the not-found view is available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderView {
    /// Declared component reference that failed
    pub component: String,
    /// Failure description
    pub error: String,
}

/// What gets mounted when a route activates
#[derive(Debug, Clone)]
pub enum MountedView {
    /// A registered view module
    Module(ViewModule),
    /// Inline error placeholder
    Placeholder(PlaceholderView),
}

impl MountedView {
    /// Registry key of the mounted module, if any
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Module(module) => Some(module.key()),
            Self::Placeholder(_) => None,
        }
    }

    /// Whether this is the inline placeholder
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }
}

/// Static mapping from canonical view key to view factory
#[derive(Clone, Default)]
pub struct ViewRegistry {
    factories: HashMap<String, ViewFactory>,
}

impl ViewRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async view factory under a reference
    ///
    /// The reference is canonicalised, so `system/user/index.vue` and
    /// `/system/user/index` register the same key.
    pub fn register<F, Fut>(&mut self, reference: &str, factory: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouterResult<ViewHandle>> + Send + 'static,
    {
        let factory: ViewFactory = Arc::new(move || Box::pin(factory()));
        self.factories.insert(canonical_view_key(reference), factory);
    }

    /// Register an already-built view value
    pub fn register_static<T>(&mut self, reference: &str, view: T)
    where
        T: Any + Send + Sync,
    {
        let handle: ViewHandle = Arc::new(view);
        self.register(reference, move || {
            let handle = Arc::clone(&handle);
            async move { Ok(handle) }
        });
    }

    /// Builder form of [`ViewRegistry::register_static`]
    #[must_use]
    pub fn with_view<T>(mut self, reference: &str, view: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.register_static(reference, view);
        self
    }

    /// Whether a canonical key is registered
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Number of registered views
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no views are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factory(&self, key: &str) -> Option<ViewFactory> {
        self.factories.get(key).cloned()
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("ViewRegistry").field("keys", &keys).finish()
    }
}

/// Resolution counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Registry lookups performed for uncached references
    pub path_lookups: u64,
    /// References answered from the path cache
    pub path_cache_hits: u64,
    /// View factories invoked successfully
    pub modules_loaded: u64,
    /// Fallback views constructed for unresolvable references
    pub fallbacks: u64,
}

#[derive(Debug, Default)]
struct ResolverCaches {
    paths: HashMap<String, Option<String>>,
    mounted: HashMap<String, MountedView>,
    cells: HashMap<String, Arc<OnceCell<ViewModule>>>,
    stats: ResolverStats,
}

/// Maps declared component references to loaded views
#[derive(Debug)]
pub struct ComponentResolver {
    registry: ViewRegistry,
    not_found_view: String,
    caches: Mutex<ResolverCaches>,
}

impl ComponentResolver {
    /// Create a resolver over a registry
    ///
    /// `not_found_view` names the registered view mounted for unresolvable
    /// references.
    pub fn new(registry: ViewRegistry, not_found_view: &str) -> Self {
        Self {
            registry,
            not_found_view: canonical_view_key(not_found_view),
            caches: Mutex::new(ResolverCaches::default()),
        }
    }

    /// Find the registry key for a declared component reference
    ///
    /// Candidates are tried in order: exact key, `{key}/index`, `{key}View`.
    /// The answer, including a miss, is cached by the declared reference.
    pub fn resolve_path(&self, reference: &str) -> Option<String> {
        let mut caches = self.caches.lock();
        if let Some(cached) = caches.paths.get(reference) {
            let cached = cached.clone();
            caches.stats.path_cache_hits += 1;
            tracing::debug!(reference, resolved = ?cached, "component path cache hit");
            return cached;
        }

        caches.stats.path_lookups += 1;
        let key = canonical_view_key(reference);
        let resolved = [key.clone(), format!("{key}/index"), format!("{key}View")]
            .into_iter()
            .find(|candidate| !key.is_empty() && self.registry.contains(candidate));
        caches.paths.insert(reference.to_string(), resolved.clone());
        resolved
    }

    /// Load the view for a declared component reference
    ///
    /// Never fails: an unresolvable reference or a failing factory mounts the
    /// not-found view, or an inline placeholder when that is unavailable too.
    pub async fn load(&self, reference: &str) -> MountedView {
        if let Some(mounted) = self.caches.lock().mounted.get(reference) {
            tracing::debug!(reference, "mounted view cache hit");
            return mounted.clone();
        }

        let error = match self.resolve_path(reference) {
            Some(key) => match self.load_module(&key, &key).await {
                Ok(module) => {
                    let mounted = MountedView::Module(module);
                    self.remember(reference, &mounted);
                    return mounted;
                }
                Err(err) => err,
            },
            None => RouterError::component_resolution(reference),
        };

        tracing::warn!(reference, error = %error, "component unavailable, mounting fallback");
        let mounted = self.fallback(reference, &error).await;
        self.remember(reference, &mounted);
        mounted
    }

    /// Snapshot of resolution counters
    pub fn stats(&self) -> ResolverStats {
        self.caches.lock().stats
    }

    /// Drop every cached path, module and fallback
    pub fn clear_caches(&self) {
        let mut caches = self.caches.lock();
        caches.paths.clear();
        caches.mounted.clear();
        caches.cells.clear();
        tracing::debug!("component resolver caches cleared");
    }

    async fn fallback(&self, reference: &str, error: &RouterError) -> MountedView {
        self.caches.lock().stats.fallbacks += 1;

        if self.registry.contains(&self.not_found_view) {
            match self
                .load_module(NOT_FOUND_CACHE_KEY, &self.not_found_view)
                .await
            {
                Ok(module) => return MountedView::Module(module),
                Err(err) => {
                    tracing::error!(view = %self.not_found_view, error = %err, "not-found view failed to load");
                }
            }
        }

        MountedView::Placeholder(PlaceholderView {
            component: reference.to_string(),
            error: error.to_string(),
        })
    }

    async fn load_module(&self, cache_key: &str, key: &str) -> RouterResult<ViewModule> {
        let factory = self
            .registry
            .factory(key)
            .ok_or_else(|| RouterError::component_resolution(key))?;
        let cell = Arc::clone(
            self.caches
                .lock()
                .cells
                .entry(cache_key.to_string())
                .or_default(),
        );

        let module = cell
            .get_or_try_init(|| async {
                let handle = factory().await?;
                self.caches.lock().stats.modules_loaded += 1;
                tracing::debug!(key, "view module loaded");
                Ok::<_, RouterError>(ViewModule {
                    key: key.to_string(),
                    handle,
                })
            })
            .await
            .map_err(|err| match err {
                RouterError::ViewLoad { .. } => err,
                other => RouterError::view_load(key, other.to_string()),
            })?;
        Ok(module.clone())
    }

    fn remember(&self, reference: &str, mounted: &MountedView) {
        self.caches
            .lock()
            .mounted
            .insert(reference.to_string(), mounted.clone());
    }
}

/// A route's mount target, loaded on first activation and memoized
#[derive(Clone)]
pub struct LazyView {
    component: String,
    resolver: Arc<ComponentResolver>,
    cell: Arc<OnceCell<MountedView>>,
}

impl LazyView {
    /// Create an unloaded view for a declared component reference
    pub fn new(component: impl Into<String>, resolver: Arc<ComponentResolver>) -> Self {
        Self {
            component: component.into(),
            resolver,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Declared component reference
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Whether the view has been loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Load the view, resolving it on the first call only
    pub async fn load(&self) -> MountedView {
        self.cell
            .get_or_init(|| self.resolver.load(&self.component))
            .await
            .clone()
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyView")
            .field("component", &self.component)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl PartialEq for LazyView {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
    }
}

impl Serialize for LazyView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.component)
    }
}
