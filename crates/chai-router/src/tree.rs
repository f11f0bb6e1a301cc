//! Menu tree builder
//!
//! Rebuilds the sidebar hierarchy from the flat permission node list. Nodes
//! whose parent is missing from the filtered set are dropped rather than
//! promoted to the root, and nodes deeper than the configured maximum are
//! dropped together with their descendants.

use chai_core::{MenuType, NodeId, PermissionNode, RouterConfig};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Stable identifier of the synthetic home entry
pub const HOME_NODE_ID: &str = "dashboard";

/// Field used to order siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Backend `sortOrder`
    #[default]
    SortOrder,
    /// Display name
    MenuName,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

/// Options for [`build_tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Drop nodes that are not visible
    pub filter_hidden: bool,
    /// Drop disabled nodes
    pub filter_disabled: bool,
    /// Deepest level kept, roots are level 0
    pub max_depth: usize,
    /// Sibling ordering field
    pub sort_field: SortField,
    /// Sibling ordering direction
    pub sort_direction: SortDirection,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            filter_hidden: false,
            filter_disabled: false,
            max_depth: 10,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl BuildOptions {
    /// Drop hidden nodes
    #[must_use]
    pub const fn filter_hidden(mut self, filter: bool) -> Self {
        self.filter_hidden = filter;
        self
    }

    /// Drop disabled nodes
    #[must_use]
    pub const fn filter_disabled(mut self, filter: bool) -> Self {
        self.filter_disabled = filter;
        self
    }

    /// Set the deepest level kept
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the sibling ordering
    #[must_use]
    pub const fn sort_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort_field = field;
        self.sort_direction = direction;
        self
    }

    fn keeps(&self, node: &PermissionNode) -> bool {
        !(self.filter_hidden && !node.is_visible || self.filter_disabled && !node.is_enabled())
    }

    fn compare(&self, a: &PermissionNode, b: &PermissionNode) -> Ordering {
        let ordering = match self.sort_field {
            SortField::SortOrder => a.sort_order.cmp(&b.sort_order),
            SortField::MenuName => a.menu_name.cmp(&b.menu_name),
        };
        match self.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// A permission node placed in the menu hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTreeNode {
    /// The underlying node
    #[serde(flatten)]
    pub node: PermissionNode,
    /// Child entries, always present
    pub children: Vec<PermissionTreeNode>,
    /// Depth, roots are 0
    pub level: usize,
}

impl PermissionTreeNode {
    /// Iterate this entry and all descendants depth-first
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// Build the menu hierarchy from a flat node list
#[must_use]
pub fn build_tree(nodes: &[PermissionNode], options: &BuildOptions) -> Vec<PermissionTreeNode> {
    let mut filtered: Vec<&PermissionNode> = nodes.iter().filter(|n| options.keeps(n)).collect();
    // `sort_by` is stable, equal keys keep their input order
    filtered.sort_by(|a, b| options.compare(a, b));

    let present: HashSet<&NodeId> = filtered.iter().map(|n| &n.id).collect();
    let mut children_of: HashMap<&NodeId, Vec<&PermissionNode>> = HashMap::new();
    let mut roots = Vec::new();
    for node in &filtered {
        match &node.parent_id {
            None => roots.push(*node),
            Some(parent) if present.contains(parent) => {
                children_of.entry(parent).or_default().push(node);
            }
            Some(parent) => {
                tracing::trace!(node = %node.id, parent = %parent, "dropping orphaned menu node");
            }
        }
    }

    let mut placed = HashSet::new();
    roots
        .into_iter()
        .filter_map(|root| assemble(root, 0, options.max_depth, &children_of, &mut placed))
        .collect()
}

fn assemble<'a>(
    node: &'a PermissionNode,
    level: usize,
    max_depth: usize,
    children_of: &HashMap<&'a NodeId, Vec<&'a PermissionNode>>,
    placed: &mut HashSet<&'a NodeId>,
) -> Option<PermissionTreeNode> {
    if level > max_depth || !placed.insert(&node.id) {
        return None;
    }
    let children = children_of
        .get(&node.id)
        .map(|children| {
            children
                .iter()
                .filter_map(|child| assemble(child, level + 1, max_depth, children_of, placed))
                .collect()
        })
        .unwrap_or_default();

    Some(PermissionTreeNode {
        node: node.clone(),
        children,
        level,
    })
}

/// The fixed home entry prepended to every navigation tree
#[must_use]
pub fn home_node(config: &RouterConfig) -> PermissionTreeNode {
    let node = PermissionNode::new(
        HOME_NODE_ID,
        MenuType::Menu,
        config.home_title.clone(),
        config.landing_path.clone(),
    )
    .with_icon(config.home_icon.clone());

    PermissionTreeNode {
        node,
        children: Vec::new(),
        level: 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chai_core::MenuStatus;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn dir(id: &str, parent: Option<&str>) -> PermissionNode {
        let node = PermissionNode::new(id, MenuType::Directory, id, format!("/{id}"));
        match parent {
            Some(parent) => node.with_parent(parent),
            None => node,
        }
    }

    fn ids(nodes: &[PermissionTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.node.id.as_str()).collect()
    }

    #[test]
    fn test_builds_nested_hierarchy() {
        let nodes = vec![
            dir("system", None),
            dir("user", Some("system")),
            dir("role", Some("system")),
            dir("monitor", None),
            dir("cache", Some("monitor")),
        ];

        let tree = build_tree(&nodes, &BuildOptions::default());
        assert_eq!(ids(&tree), vec!["system", "monitor"]);
        assert_eq!(ids(&tree[0].children), vec!["user", "role"]);
        assert_eq!(tree[0].children[0].level, 1);
        assert_eq!(ids(&tree[1].children), vec!["cache"]);
    }

    #[test]
    fn test_child_listed_before_parent_gets_correct_level() {
        let nodes = vec![
            dir("leaf", Some("mid")),
            dir("mid", Some("root")),
            dir("root", None),
        ];

        let tree = build_tree(&nodes, &BuildOptions::default());
        let levels: Vec<(String, usize)> = tree[0]
            .iter()
            .map(|n| (n.node.id.to_string(), n.level))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("root".to_string(), 0),
                ("mid".to_string(), 1),
                ("leaf".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_orphans_are_dropped_not_promoted() {
        let nodes = vec![dir("root", None), dir("orphan", Some("missing"))];

        let tree = build_tree(&nodes, &BuildOptions::default());
        assert_eq!(ids(&tree), vec!["root"]);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_children_of_filtered_parent_are_dropped() {
        let nodes = vec![
            dir("root", None).with_visible(false),
            dir("child", Some("root")),
            dir("other", None),
        ];

        let tree = build_tree(&nodes, &BuildOptions::default().filter_hidden(true));
        assert_eq!(ids(&tree), vec!["other"]);
    }

    #[test]
    fn test_filter_disabled() {
        let nodes = vec![
            dir("a", None).with_status(MenuStatus::Disabled),
            dir("b", None),
        ];

        assert_eq!(build_tree(&nodes, &BuildOptions::default()).len(), 2);
        let tree = build_tree(&nodes, &BuildOptions::default().filter_disabled(true));
        assert_eq!(ids(&tree), vec!["b"]);
    }

    #[test]
    fn test_depth_cap_drops_deeper_descendants() {
        let mut nodes = vec![dir("n0", None)];
        for i in 1..6 {
            nodes.push(dir(&format!("n{i}"), Some(&format!("n{}", i - 1))));
        }

        let tree = build_tree(&nodes, &BuildOptions::default().max_depth(2));
        let reached: Vec<&str> = tree[0].iter().map(|n| n.node.id.as_str()).collect();
        assert_eq!(reached, vec!["n0", "n1", "n2"]);
        assert!(tree[0].iter().all(|n| n.level <= 2));
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let nodes = vec![
            dir("a", None).with_sort_order(2),
            dir("b", None).with_sort_order(1),
            dir("c", None).with_sort_order(2),
            dir("d", None).with_sort_order(1),
        ];

        let asc = build_tree(&nodes, &BuildOptions::default());
        assert_eq!(ids(&asc), vec!["b", "d", "a", "c"]);

        let desc = build_tree(
            &nodes,
            &BuildOptions::default().sort_by(SortField::SortOrder, SortDirection::Descending),
        );
        assert_eq!(ids(&desc), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_by_menu_name() {
        let nodes = vec![dir("zeta", None), dir("alpha", None), dir("mu", None)];
        let tree = build_tree(
            &nodes,
            &BuildOptions::default().sort_by(SortField::MenuName, SortDirection::Ascending),
        );
        assert_eq!(ids(&tree), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_parent_cycle_does_not_recurse() {
        let nodes = vec![dir("a", Some("b")), dir("b", Some("a")), dir("root", None)];

        let tree = build_tree(&nodes, &BuildOptions::default());
        assert_eq!(ids(&tree), vec!["root"]);
    }

    #[test]
    fn test_duplicate_identifier_placed_once() {
        let nodes = vec![dir("a", None), dir("a", Some("a"))];

        let tree = build_tree(&nodes, &BuildOptions::default());
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_home_node_uses_config() {
        let config = RouterConfig::default();
        let home = home_node(&config);

        assert_eq!(home.node.id.as_str(), HOME_NODE_ID);
        assert_eq!(home.node.path, "/dashboard");
        assert_eq!(home.node.menu_type, MenuType::Menu);
        assert_eq!(home.node.icon.as_deref(), Some("Odometer"));
        assert_eq!(home.level, 0);
    }

    proptest! {
        #[test]
        fn prop_levels_never_exceed_max_depth(
            parents in prop::collection::vec(prop::option::of(0usize..40), 1..40),
            max_depth in 0usize..6,
        ) {
            let nodes: Vec<PermissionNode> = parents
                .iter()
                .enumerate()
                .map(|(i, parent)| match parent {
                    Some(p) => dir(&format!("n{i}"), None).with_parent(format!("n{p}")),
                    None => dir(&format!("n{i}"), None),
                })
                .collect();

            let tree = build_tree(&nodes, &BuildOptions::default().max_depth(max_depth));
            let mut seen = HashSet::new();
            for root in &tree {
                prop_assert_eq!(root.level, 0);
                for entry in root.iter() {
                    prop_assert!(entry.level <= max_depth);
                    prop_assert!(seen.insert(entry.node.id.clone()));
                    for child in &entry.children {
                        prop_assert_eq!(child.level, entry.level + 1);
                        prop_assert_eq!(child.node.parent_id.as_ref(), Some(&entry.node.id));
                    }
                }
            }
        }

        #[test]
        fn prop_equal_sort_keys_keep_input_order(keys in prop::collection::vec(0i64..3, 0..30)) {
            let nodes: Vec<PermissionNode> = keys
                .iter()
                .enumerate()
                .map(|(i, key)| dir(&format!("n{i}"), None).with_sort_order(*key))
                .collect();

            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let tree = build_tree(
                    &nodes,
                    &BuildOptions::default().sort_by(SortField::SortOrder, direction),
                );
                for pair in tree.windows(2) {
                    let (a, b) = (&pair[0].node, &pair[1].node);
                    if a.sort_order == b.sort_order {
                        let index = |n: &PermissionNode| n.id.as_str()[1..].parse::<usize>().unwrap();
                        prop_assert!(index(a) < index(b));
                    }
                }
            }
        }
    }
}
