use super::*;
use tempfile::tempdir;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sub").join("note.txt");
    let host = LocalHost::new();

    block_on(async {
        host.write_file(&path, "hello\nworld").await.unwrap();
        let text = host.read_file(&path).await.unwrap();
        assert_eq!(text, "hello\nworld");
    });
}

#[test]
fn read_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.txt");
    let err = block_on(LocalHost::new().read_file(&path)).unwrap_err();
    assert_eq!(err, HostError::NotFound(path));
}

#[test]
fn list_directory_sorts_and_hides_dotfiles() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("zeta")).unwrap();
    std::fs::create_dir(dir.path().join("Alpha")).unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    std::fs::write(dir.path().join("A.md"), "").unwrap();
    std::fs::write(dir.path().join(".env"), "").unwrap();

    let entries = block_on(LocalHost::new().list_directory(dir.path())).unwrap();
    let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
    assert_eq!(
        names,
        vec![
            ("Alpha", true),
            ("zeta", true),
            ("A.md", false),
            ("b.txt", false)
        ]
    );
    assert_eq!(entries[0].path, dir.path().join("Alpha"));

    let entries =
        block_on(LocalHost::new().with_show_hidden(true).list_directory(dir.path())).unwrap();
    assert_eq!(entries.len(), 6);
}

#[test]
fn list_directory_on_file_is_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("f.txt");
    std::fs::write(&file, "").unwrap();

    let err = block_on(LocalHost::new().list_directory(&file)).unwrap_err();
    assert_eq!(err, HostError::NotADirectory(file));
}

#[test]
fn pickers_cancel_unless_answer_queued() {
    let host = LocalHost::new();
    assert_eq!(block_on(host.open_file_picker()).unwrap(), None);

    host.queue_dialog_answer(PathBuf::from("/tmp/x.rs"));
    assert_eq!(
        block_on(host.open_save_dialog("x.rs", &[FileFilter::all_files()])).unwrap(),
        Some(PathBuf::from("/tmp/x.rs"))
    );
    assert_eq!(block_on(host.open_folder_picker()).unwrap(), None);
}

#[test]
fn sessions_are_tracked_until_terminated() {
    let dir = tempdir().unwrap();
    let host = LocalHost::new();

    let id = block_on(host.create_session(ShellKind::Sh, dir.path())).unwrap();
    assert_eq!(host.session_count(), 1);
    assert_eq!(
        block_on(host.query_working_directory(id)).unwrap(),
        dir.path()
    );

    block_on(host.terminate_session(id)).unwrap();
    assert_eq!(host.session_count(), 0);
    assert_eq!(
        block_on(host.terminate_session(id)).unwrap_err(),
        HostError::SessionNotFound(id)
    );
    assert!(block_on(host.run_command(id, "echo hi", dir.path())).is_err());
}

#[test]
fn create_session_requires_a_directory() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");
    let err = block_on(LocalHost::new().create_session(ShellKind::Sh, &missing)).unwrap_err();
    assert_eq!(err, HostError::NotFound(missing));
}

#[test]
fn cwd_marker_is_split_off() {
    let (text, cwd) = split_cwd_marker("hello\n\n__DESKCORE_CWD__:/tmp/x\n");
    assert_eq!(text, "hello\n\n");
    assert_eq!(cwd, Some(PathBuf::from("/tmp/x")));

    let (text, cwd) = split_cwd_marker("no marker");
    assert_eq!(text, "no marker");
    assert_eq!(cwd, None);
}

#[cfg(unix)]
#[test]
fn run_command_reports_output_and_cwd() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let host = LocalHost::new();
    let id = block_on(host.create_session(ShellKind::Sh, dir.path())).unwrap();

    let out = block_on(host.run_command(id, "echo hi", dir.path())).unwrap();
    assert!(!out.is_error);
    assert_eq!(out.output, "hi");

    let out = block_on(host.run_command(id, "cd sub", dir.path())).unwrap();
    let reported = out.working_directory.unwrap();
    assert_eq!(
        reported.canonicalize().unwrap(),
        dir.path().join("sub").canonicalize().unwrap()
    );
    assert_eq!(block_on(host.query_working_directory(id)).unwrap(), reported);
}

#[cfg(unix)]
#[test]
fn run_command_failure_sets_error_flag() {
    let dir = tempdir().unwrap();
    let host = LocalHost::new();
    let id = block_on(host.create_session(ShellKind::Sh, dir.path())).unwrap();

    let out = block_on(host.run_command(id, "echo oops >&2; exit 3", dir.path())).unwrap();
    assert!(out.is_error);
    assert_eq!(out.output, "oops");
}

#[cfg(unix)]
#[test]
fn run_command_times_out() {
    let dir = tempdir().unwrap();
    let host = LocalHost::new().with_command_timeout(Some(Duration::from_millis(100)));
    let id = block_on(host.create_session(ShellKind::Sh, dir.path())).unwrap();

    let err = block_on(host.run_command(id, "sleep 5", dir.path())).unwrap_err();
    assert_eq!(err, HostError::Timeout { millis: 100 });
}

#[cfg(unix)]
#[test]
fn terminate_kills_a_running_command() {
    let dir = tempdir().unwrap();
    let host = LocalHost::new();
    let id = block_on(host.create_session(ShellKind::Sh, dir.path())).unwrap();
    let marker = dir.path().join("still_running");

    let result = block_on(async {
        let run = host.run_command(id, "sleep 1; touch still_running", dir.path());
        let stop = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            host.terminate_session(id).await
        };
        let (result, stopped) = tokio::join!(run, stop);
        stopped.unwrap();
        result
    });

    assert_eq!(result.unwrap_err(), HostError::Terminated(id));
    std::thread::sleep(Duration::from_millis(1200));
    assert!(!marker.exists());
}

#[test]
fn cmd_script_exits_with_the_command_status() {
    let (program, args) = shell_invocation(ShellKind::Cmd, "dir nope");
    assert_eq!(program, "cmd");
    assert_eq!(args[0], "/V:ON");
    assert_eq!(args[1], "/C");
    let script = &args[2];
    assert!(script.starts_with("dir nope & (set __deskcore_rc=!ERRORLEVEL!)"));
    assert!(script.contains(CWD_MARKER));
    assert!(script.ends_with("& cd & exit /b !__deskcore_rc!"));
}

#[test]
fn powershell_script_falls_back_to_last_status() {
    let (_, args) = shell_invocation(ShellKind::PowerShell, "Get-Item nope");
    let script = args.last().unwrap();
    assert!(script.starts_with("Get-Item nope; $__deskcoreOk = $?;"));
    assert!(script.contains("elseif ($LASTEXITCODE) { $LASTEXITCODE } else { 1 }"));
    assert!(script.ends_with("exit $__deskcoreRc"));
}

#[cfg(windows)]
#[test]
fn cmd_failure_sets_error_flag() {
    let dir = tempdir().unwrap();
    let host = LocalHost::new();
    let id = block_on(host.create_session(ShellKind::Cmd, dir.path())).unwrap();

    let out = block_on(host.run_command(id, "dir does_not_exist", dir.path())).unwrap();
    assert!(out.is_error);
    assert!(out.working_directory.is_some());

    let out = block_on(host.run_command(id, "echo hi", dir.path())).unwrap();
    assert!(!out.is_error);
}
