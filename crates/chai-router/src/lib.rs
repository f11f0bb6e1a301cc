//! Permission-driven menu and route resolution for the Chai admin console
//!
//! The backend delivers a flat list of permission nodes. This crate turns it
//! into a navigation tree ([`build_tree`]) and lazily mounted routes
//! ([`RouteMaterializer`]), keeps both in a load-once [`MenuStore`], and gates
//! every navigation through a [`NavigationGuard`].

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod error;
pub mod guard;
pub mod mock;
pub mod path;
pub mod permission;
pub mod route;
pub mod service;
pub mod store;
pub mod table;
pub mod tree;
pub mod view;

// Re-export commonly used types
pub use error::{ErrorSeverity, RouterError, RouterResult};
pub use guard::{
    NavigationDecision, NavigationGuard, NavigationRequest, NavigationUi, Redirect,
    RedirectReason, SessionProvider,
};
pub use path::{canonical_view_key, normalize_route_path};
pub use permission::{PermissionRequirement, PermissionSet, Visibility};
pub use route::{RouteDefinition, RouteMaterializer, RouteMeta};
pub use service::MenuService;
pub use store::{MenuSnapshot, MenuStore};
pub use table::{RouteMatch, RouteOrigin, RouteTable};
pub use tree::{BuildOptions, PermissionTreeNode, SortDirection, SortField, build_tree};
pub use view::{ComponentResolver, LazyView, MountedView, ViewRegistry};
