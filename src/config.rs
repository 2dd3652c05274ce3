//! Ambient resolver configuration.
//!
//! Mirrors this codebase's existing per-subsystem config structs: a small,
//! `serde`-friendly struct with sane defaults, loaded from and saved to a
//! TOML file under the user's config directory. None of this is read by the
//! core resolver itself — [`Resolver::resolve`](crate::resolver::Resolver::resolve)
//! only ever sees the [`ResolveOptions`](crate::resolver::ResolveOptions) a
//! caller builds; `ResolverConfig` is the demonstration CLI's way of turning
//! a handful of user-facing knobs into those options.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolver::CancellationToken;

/// User-facing resolver settings (`~/.depresolve/config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Resolution timeout in seconds (0 = no timeout). Translated into a
    /// [`Deadline`] cancellation token before the core ever sees it.
    #[serde(default = "default_timeout")]
    pub resolution_timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    0
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolution_timeout_seconds: default_timeout(),
        }
    }
}

impl ResolverConfig {
    /// `~/.depresolve/config.toml`, or `$DEPRESOLVE_CONFIG_DIR/config.toml`
    /// when that environment variable is set (useful for tests).
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("DEPRESOLVE_CONFIG_DIR") {
            return Ok(PathBuf::from(dir).join("config.toml"));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("could not find home directory".to_string()))?;
        Ok(home.join(".depresolve").join("config.toml"))
    }

    /// Loads config from file, or returns the default if it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Builds a cancellation token for this config's timeout, or `None` when
    /// `resolution_timeout_seconds` is `0`.
    pub fn cancellation_token(&self) -> Option<Deadline> {
        if self.resolution_timeout_seconds == 0 {
            None
        } else {
            Some(Deadline::in_seconds(self.resolution_timeout_seconds))
        }
    }
}

/// A [`CancellationToken`] that fires once a fixed deadline has passed.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn in_seconds(seconds: u64) -> Self {
        Deadline {
            expires_at: Instant::now() + Duration::from_secs(seconds),
        }
    }
}

impl CancellationToken for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
