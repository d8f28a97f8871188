use jacques_core::*;
use std::env;
use std::path::PathBuf;

#[test]
fn test_encode_project_id_deterministic() {
    let root = "/home/user/project";
    assert_eq!(encode_project_id(root), "-home-user-project");
    assert_eq!(encode_project_id(root), encode_project_id(root));
    assert_ne!(encode_project_id(root), encode_project_id("/different/path"));
}

#[test]
fn test_discover_project_root_with_explicit() {
    let explicit_root = "/explicit/project/root";
    let result = discover_project_root(Some(explicit_root)).unwrap();
    assert_eq!(result, PathBuf::from(explicit_root));
}

#[test]
fn test_discover_project_root_priority() {
    unsafe {
        env::set_var("JACQUES_PROJECT_ROOT", "/env/project/root");
    }

    // Explicit should override env var
    let result = discover_project_root(Some("/explicit/root")).unwrap();
    assert_eq!(result, PathBuf::from("/explicit/root"));

    unsafe {
        env::remove_var("JACQUES_PROJECT_ROOT");
    }
}

#[test]
fn test_discover_project_root_falls_back_to_cwd() {
    unsafe {
        env::remove_var("JACQUES_PROJECT_ROOT");
    }

    let result = discover_project_root(None).unwrap();
    assert!(result.is_absolute() || result == PathBuf::from("."));
}

#[test]
fn test_decode_prefers_sidecar_over_naive_rule() {
    let encoded = encode_project_id("/Users/jane/my-project");
    // Naive decode is wrong here because "my-project" contains a dash.
    assert_ne!(naive_decode_project_id(&encoded), "/Users/jane/my-project");
    assert_eq!(
        decode_project_id(&encoded, Some("/Users/jane/my-project")),
        "/Users/jane/my-project"
    );
}

#[test]
fn test_expand_tilde_without_home_prefix() {
    assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
}
