//! Menu payload fixtures

use serde_json::{Value, json};

/// A typical admin menu: two directories, pages, buttons, an external link
/// and a hidden page
pub fn admin_menu() -> Value {
    json!([
        { "id": "100", "parentId": "0", "menuName": "System", "menuType": 1, "path": "/system",
          "icon": "Setting", "sortOrder": 1, "status": 1, "isVisible": 1 },
        { "id": "101", "parentId": "100", "menuName": "Users", "menuType": 2, "path": "/system/user",
          "component": "system/user/index", "permissions": "system:user:list", "sortOrder": 2, "isKeepalive": 1 },
        { "id": "102", "parentId": "100", "menuName": "Roles", "menuType": 2, "path": "/system/role",
          "component": "system/role", "permissions": "system:role:list", "sortOrder": 1 },
        { "id": "103", "parentId": "101", "menuName": "Add user", "menuType": 3, "path": "",
          "permissions": "system:user:add" },
        { "id": "104", "parentId": "100", "menuName": "Menus", "menuType": 2, "path": "/system/menu",
          "component": "system/menu/MenuList", "status": 0 },
        { "id": 200, "parentId": null, "menuName": "Monitor", "menuType": 1, "path": "monitor/", "sortOrder": 2 },
        { "id": 201, "parentId": 200, "menuName": "Cache", "menuType": 2, "path": "/monitor/cache",
          "component": "monitor/cache" },
        { "id": 202, "parentId": 200, "menuName": "Hidden", "menuType": 2, "path": "/monitor/hidden",
          "component": "monitor/hidden", "isVisible": 0 },
        { "id": "300", "menuName": "Docs", "menuType": 2, "path": "/docs",
          "component": "https://docs.example.com", "isExternal": true, "sortOrder": 3 }
    ])
}

/// Same menu delivered as pre-nested children
pub fn nested_menu() -> Value {
    json!([
        { "id": "1", "menuName": "System", "menuType": 1, "path": "/system", "children": [
            { "id": "2", "menuName": "Users", "menuType": 2, "path": "/system/user",
              "component": "system/user/index", "children": [
                { "id": "3", "menuName": "Add user", "menuType": 3, "path": "" }
            ] }
        ] }
    ])
}

/// A menu replacing [`admin_menu`] wholesale
pub fn reduced_menu() -> Value {
    json!([
        { "id": "900", "menuName": "Reports", "menuType": 2, "path": "/reports", "component": "reports/index" }
    ])
}

/// Only buttons, so no navigable routes
pub fn buttons_only() -> Value {
    json!([
        { "id": "1", "menuName": "Export", "menuType": 3, "path": "", "permissions": "data:export" }
    ])
}
