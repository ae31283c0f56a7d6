//! Logger and configuration setup performed by `void_bridge_initialize`

use std::path::Path;
use void_physics::{PhysicsConfig, PhysicsError, Result};

/// Environment variable naming a JSON file with the base physics config
pub const CONFIG_ENV: &str = "VOID_BRIDGE_CONFIG";

/// Install the process logger unless the host already installed one.
///
/// Defaults to `info`; `RUST_LOG` overrides.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Load the base config from `path`
pub fn load_config_file(path: &Path) -> Result<PhysicsConfig> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        PhysicsError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
    })?;
    PhysicsConfig::from_json(&json)
}

/// Base config: the file named by [`CONFIG_ENV`] if set and readable,
/// defaults otherwise
pub fn base_config() -> PhysicsConfig {
    let Some(path) = std::env::var_os(CONFIG_ENV) else {
        return PhysicsConfig::default();
    };

    match load_config_file(Path::new(&path)) {
        Ok(config) => {
            log::info!("Loaded physics config from {}", Path::new(&path).display());
            config
        }
        Err(e) => {
            log::warn!("Ignoring {CONFIG_ENV}: {e}");
            PhysicsConfig::default()
        }
    }
}

/// Overlay the two caller-supplied values on `base`.
///
/// Negative values are rejected; a zero thread count selects the engine
/// default.
pub fn overlay(base: PhysicsConfig, max_bodies: i32, thread_count: i32) -> Result<PhysicsConfig> {
    let max_bodies = usize::try_from(max_bodies)
        .map_err(|_| PhysicsError::InvalidConfig(format!("max_bodies {max_bodies} is negative")))?;
    let thread_count = usize::try_from(thread_count).map_err(|_| {
        PhysicsError::InvalidConfig(format!("thread_count {thread_count} is negative"))
    })?;

    let config = base
        .with_max_bodies(max_bodies)
        .with_thread_count(thread_count);
    config.validate()?;
    Ok(config)
}
