//! Route materialization
//!
//! Turns permission nodes into nested route definitions. Only enabled,
//! visible directory and menu nodes become routes; the mount target of each
//! route is a [`LazyView`] that resolves its component on first activation.

use crate::path::normalize_route_path;
use crate::view::{ComponentResolver, LazyView};
use chai_core::{MenuType, NodeId, PermissionNode};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Metadata attached to every materialized route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    /// Document and breadcrumb title
    pub title: String,
    /// Menu icon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Hidden from navigation UI
    pub hidden: bool,
    /// Keep the mounted view warm
    pub keep_alive: bool,
    /// Permission tag of the source node
    pub permissions: String,
    /// Shown in the breadcrumb trail
    pub breadcrumb: bool,
    /// Pinned in the tab bar
    pub affix: bool,
    /// Sort order of the source node
    pub sort: i64,
    /// Source node identifier
    pub menu_id: NodeId,
    /// Parent node identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// External link target, set instead of a mount target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl RouteMeta {
    fn from_node(node: &PermissionNode) -> Self {
        Self {
            title: node.menu_name.clone(),
            icon: node.icon.clone(),
            hidden: !node.is_visible,
            keep_alive: node.is_keepalive,
            permissions: node.permissions.clone(),
            breadcrumb: true,
            affix: false,
            sort: node.sort_order,
            menu_id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            link: if node.is_external {
                node.component.clone()
            } else {
                None
            },
        }
    }
}

/// A client-side route built from a permission node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDefinition {
    /// Normalised route path
    pub path: String,
    /// Route name, the node's menu name
    pub name: String,
    /// Route metadata
    pub meta: RouteMeta,
    /// Lazily loaded mount target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<LazyView>,
    /// Implicit redirect for directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Nested child routes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    /// Iterate this route and all nested routes depth-first
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Whether this route points outside the application
    #[must_use]
    pub const fn is_external(&self) -> bool {
        self.meta.link.is_some()
    }
}

/// Flatten a route forest depth-first
pub fn flatten_routes(routes: &[RouteDefinition]) -> impl Iterator<Item = &RouteDefinition> {
    routes.iter().flat_map(RouteDefinition::iter)
}

/// Find a route anywhere in a forest by path, comparing normalised forms
#[must_use]
pub fn find_route<'a>(routes: &'a [RouteDefinition], path: &str) -> Option<&'a RouteDefinition> {
    let target = normalize_route_path(path);
    flatten_routes(routes).find(|route| route.path == target)
}

/// Builds route definitions from permission nodes
#[derive(Debug, Clone)]
pub struct RouteMaterializer {
    resolver: Arc<ComponentResolver>,
}

impl RouteMaterializer {
    /// Create a materializer resolving views through `resolver`
    pub const fn new(resolver: Arc<ComponentResolver>) -> Self {
        Self { resolver }
    }

    /// The resolver backing mount targets
    #[must_use]
    pub const fn resolver(&self) -> &Arc<ComponentResolver> {
        &self.resolver
    }

    /// Build the route forest for a node list
    ///
    /// Nodes whose parent did not itself become a route are excluded.
    /// Directory routes redirect to their first menu child in input order.
    #[must_use]
    pub fn transform(&self, nodes: &[PermissionNode]) -> Vec<RouteDefinition> {
        let routable: Vec<&PermissionNode> = nodes.iter().filter(|n| n.is_routable()).collect();
        let present: HashSet<&NodeId> = routable.iter().map(|n| &n.id).collect();

        let mut roots = Vec::new();
        let mut children_of: HashMap<&NodeId, Vec<&PermissionNode>> = HashMap::new();
        for node in routable {
            match &node.parent_id {
                None => roots.push(node),
                Some(parent) if present.contains(parent) => {
                    children_of.entry(parent).or_default().push(node);
                }
                Some(parent) => {
                    tracing::debug!(node = %node.id, parent = %parent, "skipping route with unroutable parent");
                }
            }
        }

        let mut placed = HashSet::new();
        let routes: Vec<RouteDefinition> = roots
            .into_iter()
            .filter_map(|node| self.assemble(node, &children_of, &mut placed))
            .collect();
        tracing::debug!(
            nodes = nodes.len(),
            routes = placed.len(),
            "materialized routes"
        );
        routes
    }

    /// Discard all cached component resolutions
    pub fn reset_caches(&self) {
        self.resolver.clear_caches();
    }

    fn assemble<'a>(
        &self,
        node: &'a PermissionNode,
        children_of: &HashMap<&'a NodeId, Vec<&'a PermissionNode>>,
        placed: &mut HashSet<&'a NodeId>,
    ) -> Option<RouteDefinition> {
        if !placed.insert(&node.id) {
            return None;
        }
        let child_nodes = children_of.get(&node.id).map_or(&[][..], Vec::as_slice);

        let redirect = if node.menu_type == MenuType::Directory {
            child_nodes
                .iter()
                .find(|child| child.menu_type == MenuType::Menu)
                .map(|child| normalize_route_path(&child.path))
        } else {
            None
        };

        let component = match &node.component {
            Some(component) if !node.is_external => {
                Some(LazyView::new(component.clone(), Arc::clone(&self.resolver)))
            }
            _ => None,
        };

        let children = child_nodes
            .iter()
            .filter_map(|child| self.assemble(child, children_of, placed))
            .collect();

        Some(RouteDefinition {
            path: normalize_route_path(&node.path),
            name: node.menu_name.clone(),
            meta: RouteMeta::from_node(node),
            component,
            redirect,
            children,
        })
    }
}
