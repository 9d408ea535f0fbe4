
use fixtures::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tfjb::api::RunsApi;
use tfjb::api::{loader, parser};
use tfjb::app::{AppState, Effect, ListStatus, RunDetail};
use tfjb::events::AppEvent;
use tfjb::input::Capture;
use tfjb::view::{self, ContentView, OutputSlot, View};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use pretty_assertions::assert_eq;

fn press(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    })
}

// ========== Data flow tests ==========

#[test]
fn full_flow_json_to_state_to_view() {
    let json = r#"[
        {"id": "run_1", "workspace": "prod-east", "timestamp": "2025-03-01T12:00:00Z",
         "status": "failed", "duration_ms": 125000, "user": "alice",
         "changes": {"add": 1, "change": 0, "destroy": 2}, "sync_status": "local"},
        {"id": "run_2", "workspace": "staging", "timestamp": "2025-03-01T11:00:00Z",
         "status": "success", "resources": null}
    ]"#;
    let runs = parser::parse_runs(json).expect("parse should succeed");
    assert_eq!(runs.len(), 2);

    let mut state = make_state();
    let Effect::LoadRuns { token, .. } = state.reload(Instant::now()) else {
        panic!("expected LoadRuns");
    };
    let effects = state.apply_runs(token, Ok(runs));
    assert_eq!(state.selected_id(), Some("run_1"));

    // Hydrate with the detail response
    let Some(Effect::LoadRun { token, id }) = effects.into_iter().next() else {
        panic!("expected LoadRun");
    };
    let full = parser::parse_run(
        r#"{"id": "run_1", "workspace": "prod-east", "timestamp": "2025-03-01T12:00:00Z",
            "status": "failed", "duration_ms": 125000,
            "git": {"commit": "abc1234", "branch": "main"}}"#,
    )
    .unwrap();
    state.apply_run(token, &id, Ok(Box::new(full)));

    match view::describe(&state) {
        ContentView::Details(sections) => {
            let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
            assert_eq!(titles, vec!["Run Info", "Git"]);
            assert!(sections[0]
                .fields
                .contains(&("Duration".to_string(), "2m 5s".to_string())));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn start_loads_list_detail_and_version() {
    let mut api = FakeApi::with_runs(vec![
        make_run("r1", "prod-east"),
        make_run("r2", "prod-west"),
    ]);
    api.version = Some("1.4.0".to_string());
    let state = loaded_state(&api).await;

    assert_eq!(state.list_status, ListStatus::Ready);
    assert_eq!(state.runs.len(), 2);
    assert_eq!(state.selected_id(), Some("r1"));
    assert!(matches!(&state.detail, RunDetail::Ready(run) if run.id == "r1"));
    assert_eq!(state.version.as_deref(), Some("1.4.0"));
    assert!(state.selection_is_consistent());
}

#[tokio::test]
async fn status_filter_reloads_and_reconciles() {
    let api = FakeApi::with_runs(vec![
        make_run("ok-1", "prod"),
        run_failed("bad-1", "prod"),
        run_failed("bad-2", "dev"),
    ]);
    let mut state = loaded_state(&api).await;
    assert_eq!(state.selected_id(), Some("ok-1"));

    // Open the popover and step status: any -> success -> failed
    let now = Instant::now();
    let mut effects = state.handle_event(press(KeyCode::Char('f')), now);
    effects.extend(state.handle_event(press(KeyCode::Right), now));
    effects.extend(state.handle_event(press(KeyCode::Right), now));
    drive(&mut state, &api, effects).await;

    let labels: Vec<_> = state.filters.active_filters().into_iter().map(|c| c.label).collect();
    assert_eq!(labels, vec!["status:failed"]);
    assert_eq!(state.runs.len(), 2);
    assert_eq!(state.selected_id(), Some("bad-1"));
    assert_eq!(state.selected_index(), Some(0));
    assert!(state.selection_is_consistent());
}

#[tokio::test]
async fn list_failure_shows_failed_placeholder() {
    let api = FakeApi {
        fail_list: true,
        ..FakeApi::default()
    };
    let state = loaded_state(&api).await;
    assert_eq!(
        state.list_status,
        ListStatus::Failed("connection refused".to_string())
    );
    assert_eq!(state.selected_id(), None);
    assert_eq!(view::describe(&state), ContentView::Placeholder(view::SELECT_A_RUN));
}

/// Dispatches `effects` on real tasks and applies the next `count` events.
async fn dispatch_and_apply(
    state: &mut AppState,
    api: Arc<dyn RunsApi>,
    effects: Vec<Effect>,
    count: usize,
) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    loader::dispatch(&api, &tx, effects);
    for _ in 0..count {
        let event = rx.recv().await.expect("channel closed");
        let more = state.handle_event(event, Instant::now());
        assert!(more.is_empty(), "unexpected follow-up fetches: {more:?}");
    }
}

#[tokio::test]
async fn crashed_list_fetch_fails_the_list_and_keeps_refreshing() {
    let api = FakeApi {
        panic_list: true,
        ..FakeApi::default()
    };
    let mut state = make_state();
    state.config.refresh_interval = Some(Duration::from_secs(30));
    let now = Instant::now();
    let effects = vec![state.reload(now)];
    // the failed list payload, then the crash report
    dispatch_and_apply(&mut state, Arc::new(api), effects, 2).await;

    assert_eq!(
        state.list_status,
        ListStatus::Failed("list handler exploded".to_string())
    );
    assert!(!state.is_loading());
    assert_eq!(state.error_message(), Some("load_runs crashed: list handler exploded"));
    let refresh = state.tick(now + Duration::from_secs(3600));
    assert!(matches!(refresh.as_slice(), [Effect::LoadRuns { .. }]));
}

#[tokio::test]
async fn crashed_output_fetch_shows_no_output() {
    let mut api = FakeApi::with_runs(vec![make_run("r1", "prod")]);
    let mut state = loaded_state(&api).await;
    api.panic_output = true;

    let effects = state.set_view(View::Output);
    assert_eq!(state.output, OutputSlot::Loading);
    dispatch_and_apply(&mut state, Arc::new(api), effects, 2).await;

    assert_eq!(state.output, OutputSlot::Missing);
    assert_eq!(view::describe(&state), ContentView::Placeholder(view::NO_OUTPUT));
}

#[tokio::test]
async fn out_of_order_list_responses() {
    let api_old = FakeApi::with_runs(vec![make_run("old", "prod")]);
    let api_new = FakeApi::with_runs(vec![make_run("new", "prod")]);
    let mut state = make_state();
    let now = Instant::now();

    let first = state.reload(now);
    let second = state.reload(now);
    let fresh = loader::execute(&api_new, second).await;
    let stale = loader::execute(&api_old, first).await;

    let effects = state.handle_event(fresh, now);
    drive(&mut state, &api_new, effects).await;
    assert!(state.handle_event(stale, now).is_empty());
    assert_eq!(state.selected_id(), Some("new"));
    assert_eq!(state.runs.len(), 1);
}

#[tokio::test]
async fn output_view_round_trip() {
    let mut api = FakeApi::with_runs(vec![make_run("r1", "prod"), make_run("r2", "dev")]);
    api.outputs.insert("r1".to_string(), "Apply complete!".to_string());
    let mut state = loaded_state(&api).await;

    let effects = state.handle_event(press(KeyCode::Char('o')), Instant::now());
    drive(&mut state, &api, effects).await;
    assert_eq!(state.output, OutputSlot::Ready("Apply complete!".to_string()));
    assert_eq!(view::describe(&state), ContentView::Output("Apply complete!"));

    // r2 has no output
    let effects = state.handle_event(press(KeyCode::Char('j')), Instant::now());
    drive(&mut state, &api, effects).await;
    assert_eq!(state.output, OutputSlot::Missing);
    assert_eq!(view::describe(&state), ContentView::Placeholder(view::NO_OUTPUT));
}

#[tokio::test]
async fn timeline_view_from_hydrated_run() {
    let api = FakeApi::with_runs(vec![run_with_resources("r1", "prod")]);
    let mut state = loaded_state(&api).await;
    state.handle_event(press(KeyCode::Char('t')), Instant::now());

    match view::describe(&state) {
        ContentView::Timeline { span_ms, bars } => {
            assert_eq!(span_ms, 10_000);
            assert_eq!(bars[0].address, "aws_vpc.main");
            assert!((bars[1].left_pct - 50.0).abs() < 1e-9);
            assert!((bars[1].width_pct - 50.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn keyboard_session() {
    let api = FakeApi::with_runs(
        ["prod-east", "prod-west", "staging", "dev", "sandbox"]
            .iter()
            .enumerate()
            .map(|(i, ws)| make_run(&format!("r{i}"), ws))
            .collect(),
    );
    let mut state = loaded_state(&api).await;
    let now = Instant::now();

    let effects = state.handle_event(press(KeyCode::Char('G')), now);
    drive(&mut state, &api, effects).await;
    assert_eq!(state.selected_index(), Some(4));
    assert!(state.handle_event(press(KeyCode::Down), now).is_empty());
    assert_eq!(state.selected_index(), Some(4));

    // Search narrows to the two prod workspaces; selection falls back to the first
    state.handle_event(press(KeyCode::Char('/')), now);
    assert_eq!(state.capture, Capture::Search);
    let mut effects = Vec::new();
    for c in "prod".chars() {
        effects.extend(state.handle_event(press(KeyCode::Char(c)), now));
    }
    drive(&mut state, &api, effects).await;
    let visible: Vec<_> = state.runs.iter().map(|r| r.workspace.as_str()).collect();
    assert_eq!(visible, vec!["prod-east", "prod-west"]);
    assert_eq!(state.selected_id(), Some("r0"));
    assert!(matches!(&state.detail, RunDetail::Ready(run) if run.id == "r0"));

    state.handle_event(press(KeyCode::Enter), now);
    assert_eq!(state.capture, Capture::None);
    state.handle_event(press(KeyCode::Char('j')), now);
    assert_eq!(state.selected_index(), Some(1));

    state.handle_event(press(KeyCode::Char('q')), now);
    assert!(state.should_quit);
}

// ========== TUI snapshot tests ==========

#[tokio::test]
async fn tui_header_shows_version_and_url() {
    let state = loaded_state(&FakeApi::with_runs(vec![make_run("r1", "prod")])).await;
    let rows = render_to_text(&state, 100, 30);
    assert!(rows[0].contains("tfjb v0.0.0+0"), "got: {}", rows[0]);
    assert!(rows[0].contains("http://journal.test:8080"), "got: {}", rows[0]);
}

#[tokio::test]
async fn tui_footer_shows_hints_and_server_version() {
    let mut api = FakeApi::with_runs(vec![make_run("r1", "prod")]);
    api.version = Some("1.4.0".to_string());
    let state = loaded_state(&api).await;
    let rows = render_to_text(&state, 100, 30);
    let footer = &rows[29];
    assert!(footer.contains("navigate"), "got: {footer}");
    assert!(footer.contains("server 1.4.0"), "got: {footer}");
}

#[tokio::test]
async fn tui_lists_workspaces_and_details() {
    let api = FakeApi::with_runs(vec![make_run("r1", "prod-east"), make_run("r2", "staging")]);
    let state = loaded_state(&api).await;
    let screen = render_to_text(&state, 100, 30).join("\n");
    assert!(screen.contains("prod-east"), "got:\n{screen}");
    assert!(screen.contains("staging"), "got:\n{screen}");
    assert!(screen.contains("Run Info"), "got:\n{screen}");
    assert!(screen.contains("Runs (2)"), "got:\n{screen}");
}

#[tokio::test]
async fn tui_empty_and_failed_lists() {
    let state = loaded_state(&FakeApi::default()).await;
    let screen = render_to_text(&state, 100, 30).join("\n");
    assert!(screen.contains("No runs found"), "got:\n{screen}");
    assert!(screen.contains("Select a run to view details"), "got:\n{screen}");

    let failing = FakeApi {
        fail_list: true,
        ..FakeApi::default()
    };
    let state = loaded_state(&failing).await;
    let screen = render_to_text(&state, 100, 30).join("\n");
    assert!(screen.contains("Failed to load runs"), "got:\n{screen}");
}

#[tokio::test]
async fn tui_chips_and_overlays() {
    let api = FakeApi::with_runs(vec![run_failed("r1", "prod")]);
    let mut state = loaded_state(&api).await;
    let now = Instant::now();
    let effects = state.set_filter(
        tfjb::filter::FilterField::Status,
        tfjb::filter::FilterValue::Text("failed".to_string()),
        now,
    );
    drive(&mut state, &api, effects).await;
    let rows = render_to_text(&state, 100, 30);
    assert!(rows[1].contains("[status:failed]"), "got: {}", rows[1]);
    assert!(rows[1].contains("(1 filter)"), "got: {}", rows[1]);

    state.handle_event(press(KeyCode::Char('f')), now);
    let screen = render_to_text(&state, 100, 30).join("\n");
    assert!(screen.contains("Filters"), "got:\n{screen}");
    assert!(screen.contains("Has changes"), "got:\n{screen}");

    state.handle_event(press(KeyCode::Esc), now);
    state.handle_event(press(KeyCode::Char('?')), now);
    let screen = render_to_text(&state, 100, 30).join("\n");
    assert!(screen.contains("Keyboard shortcuts"), "got:\n{screen}");
}

#[tokio::test]
async fn tui_timeline_draws_bars() {
    let api = FakeApi::with_runs(vec![run_with_resources("r1", "prod")]);
    let mut state = loaded_state(&api).await;
    state.set_view(View::Timeline);
    let screen = render_to_text(&state, 120, 30).join("\n");
    assert!(screen.contains("aws_vpc.main"), "got:\n{screen}");
    assert!(screen.contains('█'), "got:\n{screen}");
    assert!(screen.contains("0s"), "got:\n{screen}");
}

// ========== Live server tests (ignored by default) ==========

fn live_url() -> String {
    std::env::var("TFJOURNAL_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[tokio::test]
#[ignore]
async fn live_version() {
    use tfjb::api::{HttpRunsApi, RunsApi};
    let api = HttpRunsApi::new(&live_url(), std::time::Duration::from_secs(5)).unwrap();
    assert!(api.get_version().await.is_some(), "server should report a version");
}

#[tokio::test]
#[ignore]
async fn live_list_and_hydrate() {
    use tfjb::api::{HttpRunsApi, RunsApi};
    let api = HttpRunsApi::new(&live_url(), std::time::Duration::from_secs(5)).unwrap();
    let runs = api
        .list_runs(&[("limit", "5".to_string())])
        .await
        .expect("list runs");
    assert!(runs.len() <= 5);
    if let Some(first) = runs.first() {
        let full = api.get_run(&first.id).await.expect("get run");
        assert_eq!(full.id, first.id);
    }
}
