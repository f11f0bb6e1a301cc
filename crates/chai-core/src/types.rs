//! Permission node data model
//!
//! The backend delivers menu/permission records with loosely typed fields:
//! identifiers arrive as text or numbers, flags as `0/1` or booleans, and the
//! root parent as `null`, `"0"` or an absent field. Everything is normalised
//! here, at the ingestion boundary, into [`PermissionNode`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a permission node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of a permission node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MenuType {
    /// Directory grouping other nodes
    Directory,
    /// Navigable page
    Menu,
    /// Button-level permission, never routable
    Button,
}

impl MenuType {
    /// Backend code of this menu type
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Directory => 1,
            Self::Menu => 2,
            Self::Button => 3,
        }
    }

    /// Whether nodes of this type take part in routing
    #[must_use]
    pub const fn is_navigable(self) -> bool {
        matches!(self, Self::Directory | Self::Menu)
    }
}

impl TryFrom<i64> for MenuType {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Directory),
            2 => Ok(Self::Menu),
            3 => Ok(Self::Button),
            other => Err(Error::validation(
                "menuType",
                format!("unknown menu type code {other}"),
            )),
        }
    }
}

impl From<MenuType> for i64 {
    fn from(menu_type: MenuType) -> Self {
        menu_type.code()
    }
}

/// Enabled/disabled status of a permission node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MenuStatus {
    /// Excluded from menus and routes
    Disabled,
    /// Active
    Enabled,
}

impl MenuStatus {
    /// Backend code of this status
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Disabled => 0,
            Self::Enabled => 1,
        }
    }

    /// Whether the status is enabled
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl TryFrom<i64> for MenuStatus {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Disabled),
            1 => Ok(Self::Enabled),
            other => Err(Error::validation(
                "status",
                format!("unknown status code {other}"),
            )),
        }
    }
}

impl From<MenuStatus> for i64 {
    fn from(status: MenuStatus) -> Self {
        status.code()
    }
}

/// One backend-delivered menu/permission record after normalisation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    /// Unique identifier within a load
    pub id: NodeId,

    /// Parent identifier, `None` for root nodes
    pub parent_id: Option<NodeId>,

    /// Display name, also used as route name and title
    pub menu_name: String,

    /// Directory, menu or button
    pub menu_type: MenuType,

    /// Route path fragment
    pub path: String,

    /// View reference, or a URL when `is_external` is set
    pub component: Option<String>,

    /// Permission identifier tagged onto the route
    pub permissions: String,

    /// Menu icon name
    pub icon: Option<String>,

    /// Ordering among siblings
    pub sort_order: i64,

    /// Enabled/disabled status
    pub status: MenuStatus,

    /// `component` is an external link
    pub is_external: bool,

    /// Mounted view should be kept warm across navigations
    pub is_keepalive: bool,

    /// Rendered in navigation UI
    pub is_visible: bool,

    /// Free-form remark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl PermissionNode {
    /// Create an enabled, visible node with the given identity and defaults elsewhere
    pub fn new(
        id: impl Into<NodeId>,
        menu_type: MenuType,
        menu_name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            menu_name: menu_name.into(),
            menu_type,
            path: path.into(),
            component: None,
            permissions: String::new(),
            icon: None,
            sort_order: 0,
            status: MenuStatus::Enabled,
            is_external: false,
            is_keepalive: false,
            is_visible: true,
            remark: None,
        }
    }

    /// Set the parent identifier
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the view reference
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the sort order
    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Set the permission tag
    #[must_use]
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: MenuStatus) -> Self {
        self.status = status;
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Mark as an external link
    #[must_use]
    pub fn with_external_link(mut self, url: impl Into<String>) -> Self {
        self.is_external = true;
        self.component = Some(url.into());
        self
    }

    /// Set keep-alive
    #[must_use]
    pub const fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.is_keepalive = keepalive;
        self
    }

    /// Set the icon
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Whether this node sits at the root
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the node is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }

    /// Whether the node becomes a route: directory or menu, enabled and visible
    #[must_use]
    pub const fn is_routable(&self) -> bool {
        self.menu_type.is_navigable() && self.is_enabled() && self.is_visible
    }
}

/// JSON scalar emitted either as text or as a number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    /// Text form, used for identifiers beyond the safe integer range
    Text(String),
    /// Signed integer form
    Integer(i64),
    /// Unsigned integer form above `i64::MAX`
    Unsigned(u64),
}

impl WireScalar {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
            Self::Unsigned(value) => value.to_string(),
        }
    }

    fn to_integer(&self, field: &str) -> Result<i64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::Text(text) => text.trim().parse().map_err(|_| {
                Error::validation(field, format!("expected an integer, got {text:?}"))
            }),
            Self::Unsigned(value) => i64::try_from(*value)
                .map_err(|_| Error::validation(field, format!("{value} is out of range"))),
        }
    }

    fn is_root_sentinel(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty() || text == "0",
            Self::Integer(value) => *value == 0,
            Self::Unsigned(value) => *value == 0,
        }
    }
}

/// Flag emitted either as `0/1` or as a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireFlag {
    /// Boolean form
    Bool(bool),
    /// Integer form, non-zero is set
    Integer(i64),
}

impl WireFlag {
    /// Whether the flag is set
    #[must_use]
    pub const fn is_set(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Integer(value) => value != 0,
        }
    }
}

/// Permission node exactly as the backend sends it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPermissionNode {
    /// Identifier
    pub id: WireScalar,
    /// Parent identifier or root sentinel
    #[serde(default)]
    pub parent_id: Option<WireScalar>,
    /// Display name
    #[serde(default)]
    pub menu_name: Option<String>,
    /// Menu type code
    #[serde(default)]
    pub menu_type: Option<WireScalar>,
    /// Route path
    #[serde(default)]
    pub path: Option<String>,
    /// View reference or URL
    #[serde(default)]
    pub component: Option<String>,
    /// Permission tag
    #[serde(default)]
    pub permissions: Option<String>,
    /// Icon name
    #[serde(default)]
    pub icon: Option<String>,
    /// Sort order
    #[serde(default)]
    pub sort_order: Option<WireScalar>,
    /// Status code
    #[serde(default)]
    pub status: Option<WireScalar>,
    /// External link flag
    #[serde(default)]
    pub is_external: Option<WireFlag>,
    /// Keep-alive flag
    #[serde(default)]
    pub is_keepalive: Option<WireFlag>,
    /// Visibility flag
    #[serde(default)]
    pub is_visible: Option<WireFlag>,
    /// Remark
    #[serde(default)]
    pub remark: Option<String>,
    /// Pre-nested children, present in some API shapes
    #[serde(default)]
    pub children: Option<Vec<RawPermissionNode>>,
}

impl RawPermissionNode {
    fn into_node(self, enclosing: Option<&NodeId>) -> Result<PermissionNode> {
        let id = self.id.into_text();
        if id.trim().is_empty() {
            return Err(Error::validation("id", "identifier must not be empty"));
        }

        let parent_id = self
            .parent_id
            .filter(|parent| !parent.is_root_sentinel())
            .map(|parent| NodeId::from(parent.into_text()))
            .or_else(|| enclosing.cloned());

        let menu_type = match self.menu_type {
            Some(code) => MenuType::try_from(code.to_integer("menuType")?)?,
            None => MenuType::Directory,
        };
        let status = match self.status {
            Some(code) => MenuStatus::try_from(code.to_integer("status")?)?,
            None => MenuStatus::Enabled,
        };
        let sort_order = match self.sort_order {
            Some(value) => value.to_integer("sortOrder")?,
            None => 0,
        };

        Ok(PermissionNode {
            id: NodeId::from(id),
            parent_id,
            menu_name: self.menu_name.unwrap_or_default(),
            menu_type,
            path: self.path.unwrap_or_default(),
            component: self.component.filter(|c| !c.trim().is_empty()),
            permissions: self.permissions.unwrap_or_default(),
            icon: self.icon.filter(|i| !i.trim().is_empty()),
            sort_order,
            status,
            is_external: self.is_external.is_some_and(WireFlag::is_set),
            is_keepalive: self.is_keepalive.is_some_and(WireFlag::is_set),
            is_visible: self.is_visible.is_none_or(WireFlag::is_set),
            remark: self.remark,
        })
    }
}

/// Flatten and normalise raw nodes, parents before their pre-nested children
///
/// # Errors
///
/// Returns a validation error when a node carries an empty identifier or an
/// unknown type/status code.
pub fn normalize_nodes(raw: Vec<RawPermissionNode>) -> Result<Vec<PermissionNode>> {
    let mut nodes = Vec::with_capacity(raw.len());
    for node in raw {
        flatten_into(node, None, &mut nodes)?;
    }
    Ok(nodes)
}

fn flatten_into(
    mut raw: RawPermissionNode,
    enclosing: Option<&NodeId>,
    out: &mut Vec<PermissionNode>,
) -> Result<()> {
    let children = raw.children.take().unwrap_or_default();
    let node = raw.into_node(enclosing)?;
    let id = node.id.clone();
    out.push(node);
    for child in children {
        flatten_into(child, Some(&id), out)?;
    }
    Ok(())
}

/// Parse a menu payload into normalised permission nodes
///
/// # Errors
///
/// Returns a validation error when the payload is not a JSON array, and a
/// serialization error when an element does not have the node shape.
pub fn parse_permission_nodes(payload: serde_json::Value) -> Result<Vec<PermissionNode>> {
    if !payload.is_array() {
        return Err(Error::validation(
            "response",
            format!("expected an array of permission nodes, got {}", json_kind(&payload)),
        ));
    }
    let raw: Vec<RawPermissionNode> = serde_json::from_value(payload)?;
    normalize_nodes(raw)
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_root_sentinels_normalise_to_none() {
        let payload = json!([
            { "id": "1", "parentId": null, "menuType": 1 },
            { "id": "2", "parentId": "0", "menuType": 1 },
            { "id": "3", "parentId": 0, "menuType": 1 },
            { "id": "4", "menuType": 1 },
            { "id": "5", "parentId": "", "menuType": 1 },
        ]);

        let nodes = parse_permission_nodes(payload).unwrap();
        assert_eq!(nodes.len(), 5);
        assert!(nodes.iter().all(PermissionNode::is_root));
    }

    #[test]
    fn test_numeric_and_text_identifiers() {
        let payload = json!([
            { "id": 1_874_512_312_345_678_901_u64, "parentId": "0", "menuType": 2 },
            { "id": "42", "parentId": 1_874_512_312_345_678_901_u64, "menuType": 2 },
        ]);

        let nodes = parse_permission_nodes(payload).unwrap();
        assert_eq!(nodes[0].id.as_str(), "1874512312345678901");
        assert_eq!(
            nodes[1].parent_id.as_ref().map(NodeId::as_str),
            Some("1874512312345678901")
        );
    }

    #[test]
    fn test_flags_accept_integers_and_booleans() {
        let payload = json!([
            { "id": "1", "menuType": 2, "isVisible": 0, "isKeepalive": 1, "isExternal": false },
            { "id": "2", "menuType": 2, "isVisible": true, "isKeepalive": false, "isExternal": 1 },
        ]);

        let nodes = parse_permission_nodes(payload).unwrap();
        assert!(!nodes[0].is_visible);
        assert!(nodes[0].is_keepalive);
        assert!(!nodes[0].is_external);
        assert!(nodes[1].is_visible);
        assert!(!nodes[1].is_keepalive);
        assert!(nodes[1].is_external);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let nodes = parse_permission_nodes(json!([{ "id": "7" }])).unwrap();
        let node = &nodes[0];

        assert_eq!(node.menu_type, MenuType::Directory);
        assert_eq!(node.status, MenuStatus::Enabled);
        assert_eq!(node.sort_order, 0);
        assert_eq!(node.menu_name, "");
        assert_eq!(node.path, "");
        assert!(node.is_visible);
        assert!(!node.is_keepalive);
        assert!(node.component.is_none());
    }

    #[test]
    fn test_empty_component_and_icon_become_none() {
        let payload = json!([{ "id": "1", "menuType": 2, "component": "", "icon": " " }]);
        let nodes = parse_permission_nodes(payload).unwrap();

        assert!(nodes[0].component.is_none());
        assert!(nodes[0].icon.is_none());
    }

    #[test]
    fn test_pre_nested_children_are_flattened() {
        let payload = json!([
            {
                "id": "sys", "menuType": 1, "path": "/system",
                "children": [
                    { "id": "user", "menuType": 2, "path": "/system/user",
                      "children": [ { "id": "user-add", "menuType": 3 } ] },
                    { "id": "role", "parentId": "sys", "menuType": 2, "path": "/system/role" }
                ]
            }
        ]);

        let nodes = parse_permission_nodes(payload).unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["sys", "user", "user-add", "role"]);
        assert_eq!(nodes[1].parent_id, Some(NodeId::from("sys")));
        assert_eq!(nodes[2].parent_id, Some(NodeId::from("user")));
        assert_eq!(nodes[3].parent_id, Some(NodeId::from("sys")));
    }

    #[test]
    fn test_non_array_payload_is_rejected() {
        for payload in [json!(null), json!({"data": []}), json!("menus"), json!(3)] {
            let err = parse_permission_nodes(payload).unwrap_err();
            assert!(matches!(err, Error::Validation { ref field, .. } if field == "response"));
        }
    }

    #[test]
    fn test_unknown_menu_type_is_rejected() {
        let err = parse_permission_nodes(json!([{ "id": "1", "menuType": 9 }])).unwrap_err();
        assert!(err.to_string().contains("unknown menu type code 9"));
    }

    #[test]
    fn test_menu_type_text_codes() {
        let nodes = parse_permission_nodes(json!([{ "id": "1", "menuType": "3" }])).unwrap();
        assert_eq!(nodes[0].menu_type, MenuType::Button);
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        let err = parse_permission_nodes(json!([{ "id": "" }])).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_routable_requires_type_status_and_visibility() {
        let menu = PermissionNode::new("1", MenuType::Menu, "Users", "/users");
        assert!(menu.is_routable());
        assert!(!menu.clone().with_visible(false).is_routable());
        assert!(!menu.clone().with_status(MenuStatus::Disabled).is_routable());
        assert!(!PermissionNode::new("2", MenuType::Button, "Add", "").is_routable());
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let node = PermissionNode::new("1", MenuType::Menu, "Users", "/users").with_parent("0a");
        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(value["parentId"], json!("0a"));
        assert_eq!(value["menuType"], json!(2));
        assert_eq!(value["status"], json!(1));
        assert_eq!(value["isVisible"], json!(true));
    }
}
