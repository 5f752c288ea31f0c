use super::*;
use std::path::PathBuf;

fn ok(output: &str) -> Result<CommandOutput, HostError> {
    Ok(CommandOutput {
        is_error: false,
        output: output.to_string(),
        working_directory: None,
    })
}

fn mux_with_session(id: u64, cwd: &str) -> SessionMultiplexer {
    let mut mux = SessionMultiplexer::new();
    mux.add_session(SessionId(id), ShellKind::Sh, PathBuf::from(cwd));
    mux
}

fn texts(session: &CommandSession) -> Vec<(OutputKind, &str)> {
    session
        .output()
        .iter()
        .map(|e| (e.kind, e.text.as_str()))
        .collect()
}

#[test]
fn add_and_remove_toggle_visibility() {
    let mut mux = SessionMultiplexer::new();
    assert!(!mux.visible());

    mux.add_session(SessionId(1), ShellKind::Sh, PathBuf::from("/w"));
    mux.add_session(SessionId(2), ShellKind::Bash, PathBuf::from("/w"));
    assert!(mux.visible());
    assert_eq!(mux.active_id(), Some(SessionId(2)));

    assert!(mux.remove_session(SessionId(2)));
    assert!(mux.visible());
    assert_eq!(mux.active_id(), Some(SessionId(1)));

    assert!(mux.remove_session(SessionId(1)));
    assert!(!mux.visible());
    assert_eq!(mux.active_id(), None);
    assert!(!mux.remove_session(SessionId(1)));
}

#[test]
fn submit_records_command_and_returns_request() {
    let mut mux = mux_with_session(1, "/w");
    let (changed, request) = mux.submit_command(SessionId(1), "  ls -la  ");

    assert!(changed);
    let request = request.unwrap();
    assert_eq!(request.command, "ls -la");
    assert_eq!(request.working_directory, PathBuf::from("/w"));

    let session = mux.get(SessionId(1)).unwrap();
    assert_eq!(texts(session), vec![(OutputKind::Command, "/w> ls -la")]);
    assert!(session.is_busy());
}

#[test]
fn blank_or_unknown_submissions_are_noops() {
    let mut mux = mux_with_session(1, "/w");
    assert_eq!(mux.submit_command(SessionId(1), "   "), (false, None));
    assert_eq!(mux.submit_command(SessionId(9), "ls"), (false, None));
    assert!(mux.get(SessionId(1)).unwrap().output().is_empty());
}

#[test]
fn result_appends_one_trimmed_entry() {
    let mut mux = mux_with_session(1, "/w");
    mux.submit_command(SessionId(1), "echo hi");

    let completion = mux.apply_result(SessionId(1), ok("hi\n\n")).unwrap();
    assert_eq!(completion, Completion::default());

    let session = mux.get(SessionId(1)).unwrap();
    assert_eq!(
        texts(session),
        vec![(OutputKind::Command, "/w> echo hi"), (OutputKind::Output, "hi")]
    );
    assert_eq!(session.phase(), &SessionPhase::Idle);
}

#[test]
fn host_error_flag_and_failures_become_error_entries() {
    let mut mux = mux_with_session(1, "/w");
    mux.submit_command(SessionId(1), "false");
    mux.apply_result(
        SessionId(1),
        Ok(CommandOutput {
            is_error: true,
            output: "boom".to_string(),
            working_directory: None,
        }),
    );
    mux.submit_command(SessionId(1), "ls");
    mux.apply_result(SessionId(1), Err(HostError::Spawn("no shell".to_string())));

    let session = mux.get(SessionId(1)).unwrap();
    let kinds: Vec<_> = session.output().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutputKind::Command,
            OutputKind::Error,
            OutputKind::Command,
            OutputKind::Error
        ]
    );
    assert_eq!(
        session.output()[3].text,
        "Error: failed to start command: no shell"
    );
}

#[test]
fn busy_session_queues_and_keeps_pairs_adjacent() {
    let mut mux = mux_with_session(1, "/w");
    let (_, first) = mux.submit_command(SessionId(1), "one");
    let (changed, second) = mux.submit_command(SessionId(1), "two");

    assert!(first.is_some());
    assert!(changed);
    assert!(second.is_none());
    assert_eq!(mux.get(SessionId(1)).unwrap().queued(), 1);

    let completion = mux.apply_result(SessionId(1), ok("1")).unwrap();
    let next = completion.next.unwrap();
    assert_eq!(next.command, "two");

    mux.apply_result(SessionId(1), ok("2"));
    let session = mux.get(SessionId(1)).unwrap();
    assert_eq!(
        texts(session),
        vec![
            (OutputKind::Command, "/w> one"),
            (OutputKind::Output, "1"),
            (OutputKind::Command, "/w> two"),
            (OutputKind::Output, "2"),
        ]
    );
    assert!(!session.is_busy());
}

#[test]
fn reported_working_directory_is_applied() {
    let mut mux = mux_with_session(1, "/w");
    mux.submit_command(SessionId(1), "cd sub");
    let completion = mux
        .apply_result(
            SessionId(1),
            Ok(CommandOutput {
                is_error: false,
                output: String::new(),
                working_directory: Some(PathBuf::from("/w/sub")),
            }),
        )
        .unwrap();

    assert!(!completion.refresh_working_directory);
    assert_eq!(
        mux.get(SessionId(1)).unwrap().working_directory,
        PathBuf::from("/w/sub")
    );
}

#[test]
fn cd_without_reported_cwd_asks_for_refresh() {
    let mut mux = mux_with_session(1, "/w");
    mux.submit_command(SessionId(1), "cd ..");
    let completion = mux.apply_result(SessionId(1), ok("")).unwrap();
    assert!(completion.refresh_working_directory);

    mux.submit_command(SessionId(1), "echo cd");
    let completion = mux.apply_result(SessionId(1), ok("cd")).unwrap();
    assert!(!completion.refresh_working_directory);
}

#[test]
fn late_results_are_ignored() {
    let mut mux = mux_with_session(1, "/w");
    assert!(mux.apply_result(SessionId(1), ok("stray")).is_none());

    mux.submit_command(SessionId(1), "sleep 1");
    mux.remove_session(SessionId(1));
    assert!(mux.apply_result(SessionId(1), ok("done")).is_none());
    assert!(!mux.apply_working_directory(SessionId(1), PathBuf::from("/x")));
}

#[test]
fn directory_change_detection() {
    assert!(is_directory_change("cd"));
    assert!(is_directory_change("cd /tmp"));
    assert!(is_directory_change("CD .."));
    assert!(is_directory_change("Set-Location C:\\"));
    assert!(is_directory_change("pushd x"));
    assert!(!is_directory_change("cdk deploy"));
    assert!(!is_directory_change("echo cd"));
    assert!(!is_directory_change(""));
}

#[test]
fn prompt_and_title() {
    let mut mux = SessionMultiplexer::new();
    mux.add_session(SessionId(3), ShellKind::PowerShell, PathBuf::from("/home/me"));
    let session = mux.active_session().unwrap();
    assert_eq!(session.prompt(), "PS me>");
    assert_eq!(session.title(), "PowerShell (3)");
}

#[test]
fn visibility_can_be_toggled_explicitly() {
    let mut mux = mux_with_session(1, "/w");
    assert!(mux.set_visible(false));
    assert!(!mux.set_visible(false));
    assert!(mux.set_visible(true));
}
