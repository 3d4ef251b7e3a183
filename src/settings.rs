use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;
use crate::reminders::ReminderConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgendaSettings {
    pub layout: LayoutConfig,
    pub reminders: ReminderConfig,
}

impl AgendaSettings {
    /// Replaces any section that fails validation with its defaults.
    fn sanitized(mut self, path: &Path) -> Self {
        if let Err(err) = self.layout.validate() {
            warn!("Invalid layout settings in {}: {err}; using defaults", path.display());
            self.layout = LayoutConfig::default();
        }
        if let Err(err) = self.reminders.validate() {
            warn!("Invalid reminder settings in {}: {err}; using defaults", path.display());
            self.reminders = ReminderConfig::default();
        }
        self
    }
}

/// JSON-file backed settings. A missing or unreadable file yields defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AgendaSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<AgendaSettings>(&contents) {
                Ok(parsed) => parsed.sanitized(&path),
                Err(err) => {
                    warn!(
                        "Ignoring malformed settings in {}: {err}; using defaults",
                        path.display()
                    );
                    AgendaSettings::default()
                }
            }
        } else {
            AgendaSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, AgendaSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AgendaSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn layout(&self) -> LayoutConfig {
        self.read().layout
    }

    pub fn reminders(&self) -> ReminderConfig {
        self.read().reminders.clone()
    }

    /// Validates, stores and persists a new layout window.
    pub fn update_layout(&self, layout: LayoutConfig) -> Result<()> {
        layout.validate()?;
        let mut guard = self.write();
        guard.layout = layout;
        self.persist(&guard)
    }

    pub fn update_reminders(&self, reminders: ReminderConfig) -> Result<()> {
        reminders.validate()?;
        let mut guard = self.write();
        guard.reminders = reminders;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: AgendaSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        *self.write() = data.sanitized(&self.path);
        Ok(())
    }

    fn persist(&self, data: &AgendaSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
