use super::*;

#[test]
fn shell_kind_parses_common_names() {
    assert_eq!("bash".parse::<ShellKind>(), Ok(ShellKind::Bash));
    assert_eq!("PWSH".parse::<ShellKind>(), Ok(ShellKind::PowerShell));
    assert_eq!("cmd.exe".parse::<ShellKind>(), Ok(ShellKind::Cmd));
    assert_eq!(" sh ".parse::<ShellKind>(), Ok(ShellKind::Sh));
    assert!("fish".parse::<ShellKind>().is_err());
}

#[test]
fn shell_kind_serializes_lowercase() {
    let json = serde_json::to_string(&ShellKind::PowerShell).unwrap();
    assert_eq!(json, "\"powershell\"");
    let parsed: ShellKind = serde_json::from_str("\"bash\"").unwrap();
    assert_eq!(parsed, ShellKind::Bash);
}

#[test]
fn io_error_not_found_maps_to_not_found() {
    let path = Path::new("/nope");
    let err = HostError::io(path, std::io::Error::from(std::io::ErrorKind::NotFound));
    assert_eq!(err, HostError::NotFound(PathBuf::from("/nope")));

    let err = HostError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert!(matches!(err, HostError::Io { ref message, .. } if message.contains("denied")));
}

#[test]
fn dir_entry_name_comes_from_path() {
    let entry = DirEntryInfo::new(PathBuf::from("/a/b/c.txt"), false);
    assert_eq!(entry.name, "c.txt");
    assert!(!entry.is_dir);
}

#[test]
fn error_messages_are_readable() {
    assert_eq!(
        HostError::Timeout { millis: 250 }.to_string(),
        "command timed out after 250ms"
    );
    assert_eq!(
        HostError::SessionNotFound(SessionId(4)).to_string(),
        "session not found: 4"
    );
}
