use crate::error::{OrganizerError, Result};
use crate::events::WindowInfo;
use serde_json::Value;

use super::probe::run_command;

pub async fn active_window() -> Result<WindowInfo> {
    let tree = run_command("swaymsg", &["-t", "get_tree"]).await?;
    let tree: Value = serde_json::from_str(&tree)?;

    find_focused(&tree)
        .ok_or_else(|| OrganizerError::ServiceUnavailable("Активное окно в Sway не найдено".to_string()))
}

/// Обход дерева `get_tree` в поисках узла с `"focused": true`
fn find_focused(node: &Value) -> Option<WindowInfo> {
    if node.get("focused").and_then(Value::as_bool) == Some(true) {
        let title = node.get("name").and_then(Value::as_str).unwrap_or_default();
        // Wayland-клиенты дают app_id, XWayland-клиенты только window_properties.class
        let class = node
            .get("app_id")
            .and_then(Value::as_str)
            .or_else(|| node.pointer("/window_properties/class").and_then(Value::as_str))
            .unwrap_or_default();
        return Some(WindowInfo::new(title).with_class(class));
    }

    ["nodes", "floating_nodes"]
        .iter()
        .filter_map(|key| node.get(*key).and_then(Value::as_array))
        .flatten()
        .find_map(find_focused)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_focused_in_nested_tree() {
        let tree = json!({
            "name": "root",
            "focused": false,
            "nodes": [{
                "name": "workspace",
                "nodes": [
                    {"name": "Browser", "focused": false, "app_id": "firefox"},
                ],
                "floating_nodes": [
                    {"name": "Hero - Beta", "focused": true, "app_id": null,
                     "window_properties": {"class": "Client"}},
                ],
            }],
        });

        let window = find_focused(&tree).unwrap();
        assert_eq!(window.title, "Hero - Beta");
        assert_eq!(window.class, "Client");
    }

    #[test]
    fn test_no_focused_node() {
        assert!(find_focused(&json!({"name": "root", "nodes": []})).is_none());
    }
}
