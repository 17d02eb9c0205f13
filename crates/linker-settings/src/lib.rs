//! # linker-settings
//!
//! Layered configuration for the linker.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`LinkerSettings::default()`]
//! 2. **User file**: `~/.linker/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LINKER_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binary.

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, linker_dir, load_settings,
    load_settings_from_path, settings_path, LoadedSettings, RejectedOverride,
};
pub use types::{DatabaseSettings, LinkerSection, LinkerSettings, LoggingSettings};
