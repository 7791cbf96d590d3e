use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Engine-wide dimensions, loaded from the CLI's toml config or built in
/// code. All three values must be nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Side length of the square spatial grid; valid coordinates are
    /// `[0, grid_size)` on both axes.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,

    /// Days in the (cyclic) calendar year; valid days are `[0, num_days)`.
    #[serde(default = "default_num_days")]
    pub num_days: u32,

    /// Default width of the birthday proximity window, in days.
    #[serde(default = "default_birthday_window")]
    pub birthday_window: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            num_days: default_num_days(),
            birthday_window: default_birthday_window(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot operate under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any dimension is zero.
    pub const fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be > 0"));
        }
        if self.num_days == 0 {
            return Err(Error::InvalidConfig("num_days must be > 0"));
        }
        if self.birthday_window == 0 {
            return Err(Error::InvalidConfig("birthday_window must be > 0"));
        }
        Ok(())
    }
}

const fn default_grid_size() -> u32 {
    10
}

const fn default_num_days() -> u32 {
    365
}

const fn default_birthday_window() -> u32 {
    7
}
