use super::*;

#[test]
fn parent_of_nested_path() {
    assert_eq!(parent_path("/config/service/db"), Some("/config/service"));
}

#[test]
fn parent_of_top_level_node_is_root() {
    assert_eq!(parent_path("/config"), Some("/"));
}

#[test]
fn root_has_no_parent() {
    assert_eq!(parent_path("/"), None);
    assert_eq!(parent_path(""), None);
}

#[test]
fn node_name_strips_parent() {
    assert_eq!(node_name("/config/service/db"), "db");
    assert_eq!(node_name("/config"), "config");
    assert_eq!(node_name("/config/"), "config");
}

#[test]
fn join_handles_trailing_separator() {
    assert_eq!(join_path("/users", "u1"), "/users/u1");
    assert_eq!(join_path("/users/", "u1"), "/users/u1");
    assert_eq!(join_path("/", "top"), "/top");
}
