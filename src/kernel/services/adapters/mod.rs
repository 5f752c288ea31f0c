//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod local_host;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use local_host::LocalHost;
pub use paths::{ensure_log_dir, get_config_dir, get_log_dir};
pub use runtime::TokioExecutor;
pub use settings::{
    apply_env_overrides, ensure_settings_file, get_settings_path, load_settings,
    load_settings_from, ConfigError,
};
