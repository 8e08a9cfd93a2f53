use pretty_assertions::assert_eq;
use serde_json::json;
use tape_stream::{ContentBlock, ToolInput, ToolInvocation, ToolUseTracker};

fn invocation(id: &str, name: &str) -> ToolInvocation {
    ToolInvocation::new(id, name, ToolInput::default())
}

#[test]
fn single_match_empties_tracker() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("t1", "Bash"), None);

    let matches = tracker.match_from_user_message(&[ContentBlock::tool_result("t1")]);
    assert_eq!(matches.len(), 1);
    assert!(!matches[0].is_nested);
    assert!(!matches[0].header_already_shown);
    assert_eq!(matches[0].invocation.name, "Bash");
    assert_eq!(tracker.len(), 0);
}

#[test]
fn child_matched_alone_is_nested_until_parent_leaves() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("parent", "Task"), None);
    tracker.add(invocation("child", "Read"), Some("parent".to_string()));

    let matches = tracker.match_from_user_message(&[ContentBlock::tool_result("child")]);
    assert_eq!(matches.len(), 1);
    assert!(matches[0].is_nested);
    assert_eq!(tracker.len(), 1);

    let flushed = tracker.flush_all();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].id, "parent");
    assert!(!flushed[0].is_nested);
}

#[test]
fn flush_reports_orphans_and_clears() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("orphan-tool", "Read"), None);

    let flushed = tracker.flush_all();
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].invocation.name, "Read");
    assert!(!flushed[0].header_already_shown);
    assert_eq!(tracker.len(), 0);
    assert!(tracker.flush_all().is_empty());
}

#[test]
fn flush_remembers_headers_shown_early() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("task", "Task"), None);
    tracker.add(invocation("other", "Bash"), None);
    assert!(tracker.resolve_parent_early("task").is_some());

    let flushed: Vec<(String, bool)> = tracker
        .flush_all()
        .into_iter()
        .map(|entry| (entry.id, entry.header_already_shown))
        .collect();
    assert_eq!(
        flushed,
        vec![("task".to_string(), true), ("other".to_string(), false)]
    );
}

#[test]
fn flush_classifies_against_pre_flush_state() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("parent", "Task"), None);
    tracker.add(invocation("child", "Grep"), Some("parent".to_string()));
    tracker.add(invocation("grandchild", "Read"), Some("child".to_string()));

    let mut flushed: Vec<(String, bool)> = tracker
        .flush_all()
        .into_iter()
        .map(|entry| (entry.id, entry.is_nested))
        .collect();
    flushed.sort();
    assert_eq!(
        flushed,
        vec![
            ("child".to_string(), true),
            ("grandchild".to_string(), true),
            ("parent".to_string(), false),
        ]
    );
}

#[test]
fn matching_is_independent_of_invocation_order() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("a", "Bash"), None);
    tracker.add(invocation("b", "Read"), None);
    tracker.add(invocation("c", "Grep"), None);

    let matches = tracker.match_from_user_message(&[
        ContentBlock::tool_result("c"),
        ContentBlock::text("interleaved"),
        ContentBlock::tool_result("missing"),
        ContentBlock::tool_result(""),
        ContentBlock::tool_result("a"),
    ]);
    let names: Vec<&str> = matches
        .iter()
        .map(|matched| matched.invocation.name.as_str())
        .collect();
    assert_eq!(names, vec!["Grep", "Bash"]);
    assert_eq!(tracker.len(), 1);
    assert!(tracker.get("b").is_some());
}

#[test]
fn match_carries_result_payload() {
    let mut tracker = ToolUseTracker::new();
    tracker.add(invocation("t1", "Bash"), None);

    let matches = tracker.match_from_user_message(&[ContentBlock::ToolResult {
        tool_use_id: "t1".to_string(),
        content: Some(json!("exit 1")),
        is_error: true,
    }]);
    assert_eq!(matches[0].content, Some(json!("exit 1")));
    assert!(matches[0].is_error);
}

#[test]
fn buffering_reports_new_tracking() {
    let mut tracker = ToolUseTracker::new();
    let blocks = vec![
        ContentBlock::text("Let me check."),
        ContentBlock::tool_use("t1", "Bash", json!({"command": "ls"})),
        ContentBlock::tool_use("t2", "Read", json!({"file_path": "a.rs"})),
    ];

    assert!(tracker.buffer_from_assistant_message(&blocks, Some("task"), false));
    assert_eq!(tracker.len(), 2);
    assert_eq!(
        tracker.get("t2").and_then(|entry| entry.parent_id.as_deref()),
        Some("task")
    );
    // Parent "task" is not pending, so nothing is nested.
    assert!(tracker.snapshot().iter().all(|entry| !entry.nested));

    assert!(!tracker.buffer_from_assistant_message(&[ContentBlock::text("no tools")], None, false));
}

#[test]
fn remove_and_clear_tolerate_absence() {
    let mut tracker = ToolUseTracker::new();
    assert!(tracker.remove("nothing").is_none());
    tracker.add(invocation("t1", "Bash"), None);
    tracker.add(invocation("t2", "Bash"), None);

    let mut seen = Vec::new();
    tracker.for_each(|entry| seen.push(entry.id().to_string()));
    seen.sort();
    assert_eq!(seen, vec!["t1".to_string(), "t2".to_string()]);

    tracker.clear();
    assert!(tracker.is_empty());
    assert!(tracker.get("t1").is_none());
}
