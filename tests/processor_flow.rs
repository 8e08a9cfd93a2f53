
use assert_matches::assert_matches;
use fixture::{event, joined, plain_processor, read_events, run_all};
use pretty_assertions::assert_eq;
use serde_json::json;
use stream_events::{ResultEvent, SystemEvent};
use tape_stream::{
    EventProcessor, Processed, ProcessorConfig, Renderer, SessionState, TodoStatus,
    ToolInvocation, ToolResultContext, NO_RESULT_MARKER,
};

/// Renders terse markers with no trailing newlines.
struct BareRenderer;

impl Renderer for BareRenderer {
    fn system(&self, event: &SystemEvent) -> String {
        format!("[system {}]", event.subtype)
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn assistant_error(&self, error: &str) -> String {
        format!("[error {error}]")
    }

    fn tool_header(&self, invocation: &ToolInvocation) -> String {
        format!("[{}]", invocation.name)
    }

    fn tool_result(&self, context: &ToolResultContext<'_>) -> String {
        format!("<{}>", context.content_text())
    }

    fn no_result(&self, _invocation: &ToolInvocation, marker: &str) -> String {
        marker.to_string()
    }

    fn subagent_prompt(&self, preview: &str) -> String {
        format!("> {preview}")
    }

    fn result_summary(&self, event: &ResultEvent, session: &SessionState) -> String {
        format!("[done {} turns={}]", event.subtype, session.turns)
    }
}

fn bare_processor() -> EventProcessor {
    EventProcessor::new(Box::new(BareRenderer), ProcessorConfig::default())
}

fn assistant_tool_use(id: &str, name: &str, input: serde_json::Value) -> serde_json::Value {
    json!({
        "type": "assistant",
        "message": {"content": [{"type": "tool_use", "id": id, "name": name, "input": input}]}
    })
}

fn user_tool_result(id: &str, content: &str) -> serde_json::Value {
    json!({
        "type": "user",
        "message": {"role": "user", "content": [{"type": "tool_result", "tool_use_id": id, "content": content}]}
    })
}

#[test]
fn bash_session_end_to_end() {
    let events = read_events("bash_session.jsonl");
    assert_eq!(events.len(), 4);

    let mut processor = plain_processor();
    let outputs = run_all(&mut processor, &events[..2]);
    assert_eq!(processor.tracker().len(), 1);
    assert!(outputs[1].has_pending_tools);
    assert_eq!(
        processor.progress_label().as_deref(),
        Some("Bash: ls")
    );

    let user = processor.process(Some(&events[2]));
    assert_eq!(processor.tracker().len(), 0);
    assert!(!user.has_pending_tools);
    assert_eq!(processor.session().current_tool, None);

    let result = processor.process(Some(&events[3]));
    assert!(!result.fragment.contains(NO_RESULT_MARKER));

    let transcript = joined(&[outputs[0].clone(), outputs[1].clone(), user, result]);
    assert_eq!(
        transcript,
        concat!(
            "● Session started · claude-sonnet · /work · default\n",
            "  2 tools · v2.0.1\n",
            "I'll list the files.\n",
            "⏺ Bash(ls)\n",
            "  ⎿ Cargo.toml\n",
            "    src\n",
            "✓ Done · 1 turn · $0.0123 · 2.5s · 120 tokens\n",
        )
    );

    let session = processor.session();
    assert_eq!(session.session_id, "sess-1");
    assert_eq!(session.model, "claude-sonnet");
    assert_eq!(session.turns, 1);
    assert_eq!(session.duration_api_ms, 2100);
    assert_eq!(session.usage.output_tokens, 20);
    assert_eq!(session.result_subtype, "success");
}

#[test]
fn nested_task_renders_prefixed_children() {
    let events = read_events("nested_task.jsonl");
    let mut processor = plain_processor();
    let outputs = run_all(&mut processor, &events);

    assert_eq!(outputs[0].fragment, "");
    assert!(outputs[0].has_pending_tools);
    assert_eq!(
        outputs[1].fragment,
        "⏺ Task(Find TODOs)\n  │   ↳ Search the repo for TODO comments\n"
    );
    assert_eq!(outputs[2].fragment, "");
    assert_eq!(
        outputs[3].fragment,
        "  │ ⏺ Grep(TODO)\n  │   ⎿ src/lib.rs:3: TODO\n"
    );
    assert!(outputs[3].has_pending_tools);
    assert_eq!(outputs[4].fragment, "  ⎿ Found one TODO.\n");
    assert!(!outputs[4].has_pending_tools);
    assert_eq!(outputs[5].fragment, "✓ Done · 2 turns · $0.0000 · 0.0s\n");
}

#[test]
fn streamed_text_is_not_repeated_by_the_full_event() {
    let events = read_events("streamed_turn.jsonl");
    let mut processor = plain_processor();
    let outputs = run_all(&mut processor, &events);

    assert_eq!(joined(&outputs), "Hello\n  ⎿ /work\n");
    assert_eq!(outputs[2].fragment, "Hel");
    assert_eq!(outputs[4].fragment, "\n");
    assert_eq!(processor.session().turns, 1);
    assert!(processor.stream_state().is_idle());
}

#[test]
fn streamed_tool_result_renders_without_header() {
    let events = read_events("streamed_turn.jsonl");
    let mut processor = plain_processor();
    let outputs = run_all(&mut processor, &events[..9]);
    assert!(processor.stream_state().in_tool_use_block());
    assert_eq!(processor.progress_label().as_deref(), Some("Bash"));
    assert!(!outputs[8].has_pending_tools);

    let assistant = processor.process(Some(&events[9]));
    assert!(!assistant.has_pending_tools);
    assert!(processor.tracker().is_empty());

    let unmatched = processor.process(Some(&events[10]));
    assert_eq!(unmatched.fragment, "  ⎿ /work\n");
    assert!(!unmatched.has_pending_tools);
    assert_eq!(processor.session().current_tool, None);
}

#[test]
fn unmatched_results_keep_their_output() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("t1", "Bash", json!({})))));
    let user = processor.process(Some(&event(json!({
        "type": "user",
        "message": {"role": "user", "content": [
            {"type": "tool_result", "tool_use_id": "t1", "content": "known"},
            {"type": "tool_result", "tool_use_id": "ghost", "content": "stray"}
        ]}
    }))));
    assert_eq!(user.fragment, "[Bash]\n<known>\n<stray>\n");
    assert!(processor.tracker().is_empty());
}

#[test]
fn orphaned_tools_flush_with_marker() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use(
        "orphan-tool",
        "Read",
        json!({"file_path": "/tmp/x"}),
    ))));
    assert_eq!(processor.tracker().len(), 1);

    let result = processor.process(Some(&event(json!({
        "type": "result",
        "subtype": "error_max_turns",
        "is_error": true,
        "num_turns": 1
    }))));

    assert_eq!(
        result.fragment,
        "[Read]\n(no result)\n[done error_max_turns turns=1]\n"
    );
    assert!(!result.has_pending_tools);
    assert!(processor.tracker().is_empty());
    assert!(processor.session().is_error);
    assert_eq!(processor.session().current_tool, None);
}

#[test]
fn co_flushed_child_keeps_nested_prefix() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("task", "Task", json!({})))));
    processor.process(Some(&event(json!({
        "type": "assistant",
        "parent_tool_use_id": "task",
        "message": {"content": [{"type": "tool_use", "id": "child", "name": "Read", "input": {}}]}
    }))));

    let result = processor.process(Some(&event(json!({"type": "result", "subtype": "success"}))));
    assert_eq!(
        result.fragment,
        "[Task]\n(no result)\n  │ [Read]\n  │ (no result)\n[done success turns=2]\n"
    );
}

#[test]
fn renderer_output_gets_trailing_newlines() {
    let mut processor = bare_processor();
    let assistant = processor.process(Some(&event(json!({
        "type": "assistant",
        "message": {"content": [{"type": "text", "text": "Hi"}]}
    }))));
    assert_eq!(assistant.fragment, "Hi\n");
    assert_eq!(assistant.fragment.matches("Hi").count(), 1);

    processor.process(Some(&event(assistant_tool_use("t1", "Bash", json!({})))));
    let user = processor.process(Some(&event(user_tool_result("t1", "ok"))));
    assert_eq!(user.fragment, "[Bash]\n<ok>\n");
}

#[test]
fn text_started_by_stream_is_skipped() {
    let mut processor = bare_processor();
    processor.process(Some(&event(json!({
        "type": "stream_event",
        "event": {"type": "content_block_start", "index": 0, "content_block": {"type": "text"}}
    }))));
    assert!(processor.stream_state().in_text_block());

    let assistant = processor.process(Some(&event(json!({
        "type": "assistant",
        "message": {"content": [{"type": "text", "text": "Hi"}]}
    }))));
    assert_eq!(assistant.fragment, "");
    assert!(processor.stream_state().is_idle());
}

#[test]
fn missing_and_bad_events_change_nothing() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("t1", "Bash", json!({"command": "ls"})))));
    let session_before = processor.session().clone();
    let stream_before = processor.stream_state().clone();

    assert_eq!(processor.process(None), Processed::default());
    let garbage = tape_stream::parse_line("not valid json");
    assert_eq!(processor.process(garbage.as_ref()), Processed::default());
    let unknown = tape_stream::parse_line(r#"{"type":"unknown"}"#);
    assert_eq!(processor.process(unknown.as_ref()), Processed::default());

    assert_eq!(processor.tracker().len(), 1);
    assert_eq!(processor.session(), &session_before);
    assert_eq!(processor.stream_state(), &stream_before);
}

#[test]
fn early_parent_header_is_not_repeated() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("task", "Task", json!({})))));

    let prompt = processor.process(Some(&event(json!({
        "type": "user",
        "parent_tool_use_id": "task",
        "message": {"role": "user", "content": [{"type": "text", "text": "Do the thing"}]}
    }))));
    assert_eq!(prompt.fragment, "[Task]\n  │ > Do the thing\n");

    let again = processor.process(Some(&event(json!({
        "type": "user",
        "parent_tool_use_id": "task",
        "message": {"role": "user", "content": "Second prompt"}
    }))));
    assert_eq!(again.fragment, "  │ > Second prompt\n");

    let done = processor.process(Some(&event(user_tool_result("task", "finished"))));
    assert_eq!(done.fragment, "<finished>\n");
}

#[test]
fn orphan_with_early_header_is_not_repeated() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("task", "Task", json!({})))));
    let prompt = processor.process(Some(&event(json!({
        "type": "user",
        "parent_tool_use_id": "task",
        "message": {"role": "user", "content": "Do the thing"}
    }))));
    assert_eq!(prompt.fragment, "[Task]\n  │ > Do the thing\n");

    let result = processor.process(Some(&event(json!({"type": "result", "subtype": "success"}))));
    assert_eq!(result.fragment, "(no result)\n[done success turns=1]\n");
    assert_eq!(result.fragment.matches("[Task]").count(), 0);
}

#[test]
fn nested_streamed_text_gets_prefix() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use("task", "Task", json!({})))));

    let delta = |text: &str| {
        event(json!({
            "type": "stream_event",
            "parent_tool_use_id": "task",
            "event": {"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}}
        }))
    };
    let first = processor.process(Some(&delta("Look")));
    let second = processor.process(Some(&delta("ing\nDone")));
    let stop = processor.process(Some(&event(json!({
        "type": "stream_event",
        "parent_tool_use_id": "task",
        "event": {"type": "content_block_stop", "index": 0}
    }))));

    assert_eq!(first.fragment, "  │ Look");
    assert_eq!(second.fragment, "ing\n  │ Done");
    assert_eq!(stop.fragment, "\n");

    let streamed = format!("{}{}{}", first.fragment, second.fragment, stop.fragment);
    let mut full = bare_processor();
    full.process(Some(&event(assistant_tool_use("task", "Task", json!({})))));
    let assistant = full.process(Some(&event(json!({
        "type": "assistant",
        "parent_tool_use_id": "task",
        "message": {"content": [{"type": "text", "text": "Looking\nDone"}]}
    }))));
    assert_eq!(streamed, assistant.fragment);
}

#[test]
fn color_off_header_has_no_escapes() {
    let mut processor = plain_processor();
    let command = "x".repeat(200);
    processor.process(Some(&event(assistant_tool_use(
        "t1",
        "Bash",
        json!({"command": command}),
    ))));
    let user = processor.process(Some(&event(user_tool_result("t1", "ok"))));

    assert!(user.fragment.starts_with("⏺ Bash(xxx"));
    assert!(user.fragment.contains("…)\n  ⎿ ok\n"));
    assert!(!user.fragment.contains('\x1b'));
}

#[test]
fn long_prompts_are_truncated_to_preview_width() {
    let config = ProcessorConfig {
        prompt_preview_width: 10,
        nested_prefix: String::new(),
        ..ProcessorConfig::default()
    };
    let mut processor = EventProcessor::new(Box::new(BareRenderer), config);
    let prompt = processor.process(Some(&event(json!({
        "type": "user",
        "parent_tool_use_id": "unknown-parent",
        "message": {"role": "user", "content": "Investigate the flaky integration test"}
    }))));
    assert_eq!(prompt.fragment, "> Investiga…\n");
}

#[test]
fn todo_write_replaces_session_todos() {
    let mut processor = bare_processor();
    processor.process(Some(&event(assistant_tool_use(
        "todo-1",
        "TodoWrite",
        json!({"todos": [
            {"content": "Parse", "status": "completed", "activeForm": "Parsing"},
            {"content": "Render", "status": "in_progress", "activeForm": "Rendering"}
        ]}),
    ))));

    let todos = &processor.session().todos;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].status, TodoStatus::Completed);
    assert_eq!(todos[1].active_form, "Rendering");
}

#[test]
fn assistant_error_is_rendered() {
    let mut processor = bare_processor();
    let processed = processor.process(Some(&event(json!({
        "type": "assistant",
        "error": "rate_limit",
        "message": {"content": [{"type": "text", "text": "Partial"}]}
    }))));
    assert_eq!(processed.fragment, "[error rate_limit]\nPartial\n");
}

#[test]
fn stream_tool_block_sets_current_tool() {
    let mut processor = bare_processor();
    processor.process(Some(&event(json!({
        "type": "stream_event",
        "event": {"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": "t1"}}
    }))));
    assert_matches!(
        processor.session().current_tool.as_ref(),
        Some(tool) if tool.name == "tool_use" && tool.arg.is_none()
    );
}

#[test]
fn system_event_updates_metadata() {
    let mut processor = bare_processor();
    let processed = processor.process(Some(&event(json!({
        "type": "system",
        "subtype": "init",
        "session_id": "sess-7",
        "model": "claude-opus",
        "agents": ["reviewer"]
    }))));
    assert_eq!(processed.fragment, "[system init]\n");
    assert_eq!(processor.session().session_id, "sess-7");
    assert_eq!(processor.session().agents, vec!["reviewer".to_string()]);
}
