use super::*;
use tempfile::tempdir;

fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    ensure_settings_file_at(&path).unwrap();
    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.shell.cwd_refresh_delay_ms, 100);
    assert!(!settings.explorer.show_hidden);
}

#[test]
fn existing_file_is_left_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"explorer":{"show_hidden":true}}"#).unwrap();

    ensure_settings_file_at(&path).unwrap();
    let settings = load_settings_from(&path).unwrap();
    assert!(settings.explorer.show_hidden);
    assert_eq!(settings.shell.cwd_refresh_delay_ms, 100);
}

#[test]
fn partial_json_overrides_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"shell":{"default_shell":"bash","command_timeout_ms":1500}}"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.shell.shell(), ShellKind::Bash);
    assert_eq!(
        settings.shell.command_timeout(),
        Some(std::time::Duration::from_millis(1500))
    );
    assert_eq!(settings.shell.cwd_refresh_delay_ms, 100);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load_settings_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn env_overrides_apply() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env(&[(ENV_SHELL, "pwsh"), (ENV_SHOW_HIDDEN, "yes")]),
    )
    .unwrap();
    assert_eq!(settings.shell.default_shell, Some(ShellKind::PowerShell));
    assert!(settings.explorer.show_hidden);
}

#[test]
fn invalid_env_values_are_rejected() {
    let mut settings = Settings::default();
    let err = apply_env_overrides(&mut settings, env(&[(ENV_SHELL, "fish")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { var, .. } if var == ENV_SHELL));

    let err =
        apply_env_overrides(&mut settings, env(&[(ENV_SHOW_HIDDEN, "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { var, .. } if var == ENV_SHOW_HIDDEN));
}

#[test]
fn blank_shell_override_is_ignored() {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, env(&[(ENV_SHELL, "  ")])).unwrap();
    assert_eq!(settings.shell.default_shell, None);
}
