use jacques_testing::fixtures::ClaudeTranscriptBuilder;
use jacques_testing::TestWorld;

#[test]
fn doctor_reports_a_free_workspace() {
    let world = TestWorld::new();
    let result = world.run(&["doctor"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("workspace directory"));
}

#[test]
fn archive_then_search_finds_the_session() {
    let world = TestWorld::new();
    let project_dir = world.project_dir().to_string_lossy().into_owned();

    let transcript = ClaudeTranscriptBuilder::new("sess-cli-1", &project_dir)
        .user_message("please add a retry loop to the fetcher")
        .assistant_text("adding a retry loop now")
        .tool_call("call-1", "Edit", serde_json::json!({"file_path": format!("{project_dir}/src/fetch.rs")}))
        .tool_result("call-1", serde_json::json!("ok"), false);

    let transcript_path = world.write_transcript("sess-cli-1.jsonl", transcript).unwrap();

    let archive = world
        .run(&[
            "archive",
            "sess-cli-1",
            "--transcript",
            transcript_path.to_str().unwrap(),
            "--project-root",
            &project_dir,
        ])
        .unwrap();
    assert!(archive.success(), "stderr: {}", archive.stderr());

    let search = world.run(&["search", "retry"]).unwrap();
    assert!(search.success(), "stderr: {}", search.stderr());
    assert!(search.stdout().contains("sess-cli-1"), "stdout: {}", search.stdout());
}

#[test]
fn scan_prints_a_json_array() {
    let world = TestWorld::new();
    let result = world.run(&["scan"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());
    let json = result.json().unwrap();
    assert!(json.is_array());
}
