use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Day-grid window and vertical scale used to place appointment blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// First hour shown on the grid (inclusive)
    pub work_day_start_hour: u32,

    /// Last hour shown on the grid (exclusive)
    pub work_day_end_hour: u32,

    /// Vertical pixels per hour of wall-clock time
    pub pixels_per_hour: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            work_day_start_hour: 8,
            work_day_end_hour: 20,
            pixels_per_hour: 80.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.work_day_start_hour >= self.work_day_end_hour {
            bail!(
                "work day start hour {} must be before end hour {}",
                self.work_day_start_hour,
                self.work_day_end_hour
            );
        }
        if self.work_day_end_hour > 24 {
            bail!("work day end hour {} exceeds 24", self.work_day_end_hour);
        }
        if !(self.pixels_per_hour.is_finite() && self.pixels_per_hour > 0.0) {
            bail!("pixels per hour must be positive, got {}", self.pixels_per_hour);
        }
        Ok(())
    }

    pub fn window_hours(&self) -> u32 {
        self.work_day_end_hour.saturating_sub(self.work_day_start_hour)
    }

    pub fn window_minutes(&self) -> i64 {
        i64::from(self.window_hours()) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_eight_to_twenty() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_hours(), 12);
        assert_eq!(config.window_minutes(), 720);
    }

    #[test]
    fn rejects_inverted_window() {
        let config = LayoutConfig {
            work_day_start_hour: 18,
            work_day_end_hour: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let config = LayoutConfig {
            pixels_per_hour: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
