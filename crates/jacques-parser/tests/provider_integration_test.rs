use jacques_parser::registry::{create_adapter, create_all_adapters, detect_adapter_from_path};
use std::io::Write;

fn write_tmp(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn registry_lists_claude_and_cursor() {
    let adapters = create_all_adapters();
    let ids: Vec<_> = adapters.iter().map(|a| a.id()).collect();
    assert!(ids.contains(&"claude_code"));
    assert!(ids.contains(&"cursor"));
}

#[test]
fn detects_adapter_from_path() {
    assert_eq!(
        detect_adapter_from_path("/home/u/.claude/projects/x/session.jsonl")
            .unwrap()
            .id(),
        "claude_code"
    );
    assert_eq!(
        detect_adapter_from_path("/home/u/.cursor/chats/x/session.jsonl")
            .unwrap()
            .id(),
        "cursor"
    );
    assert!(detect_adapter_from_path("/home/u/unknown/session.jsonl").is_err());
}

#[test]
fn claude_adapter_parses_a_session_file() {
    let line = serde_json::json!({
        "type": "user",
        "uuid": "7c1f7f0e-2c1a-4b1a-9b1a-000000000001",
        "sessionId": "sess-1",
        "timestamp": "2024-01-01T00:00:00Z",
        "cwd": "/tmp/project",
        "isSidechain": false,
        "isMeta": false,
        "message": {"role": "user", "content": "hello there"}
    });
    let path = write_tmp("jacques_claude_test_session.jsonl", &(line.to_string() + "\n"));

    let adapter = create_adapter("claude_code").unwrap();
    let entries = adapter.process_file(&path).unwrap();
    assert_eq!(entries.len(), 1);

    std::fs::remove_file(&path).ok();
}
