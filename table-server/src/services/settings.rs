//! Settings service - runtime-mutable ordering configuration
//!
//! One instance shared by every rule check. The admin surface updates it by
//! key; rule checks read a snapshot at call time, so a changed cooldown is
//! effective on the next operation without a restart.

use std::sync::Arc;

use parking_lot::RwLock;
use shared::models::{OrderingSettings, SettingValue, SettingsPatchError};

/// Shared, mutable ordering settings
#[derive(Clone)]
pub struct SettingsService {
    inner: Arc<RwLock<OrderingSettings>>,
}

impl SettingsService {
    pub fn new(settings: OrderingSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Snapshot of the current settings
    pub fn current(&self) -> OrderingSettings {
        self.inner.read().clone()
    }

    /// Apply one keyed update; returns the settings after the change
    pub fn update(&self, key: &str, value: &str) -> Result<OrderingSettings, SettingsPatchError> {
        let mut guard = self.inner.write();
        guard.apply(key, value)?;
        tracing::info!(key, value, "Setting updated");
        Ok(guard.clone())
    }

    /// Typed key/value listing for the settings surface
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        self.inner.read().entries()
    }
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new(OrderingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_are_visible_to_later_snapshots() {
        let service = SettingsService::default();
        assert_eq!(service.current().cooldown_minutes, 15);
        service.update("cooldown_minutes", "5").unwrap();
        assert_eq!(service.current().cooldown_minutes, 5);
    }

    #[test]
    fn invalid_updates_leave_settings_unchanged() {
        let service = SettingsService::default();
        assert!(service.update("cooldown_minutes", "banana").is_err());
        assert_eq!(service.current(), OrderingSettings::default());
    }
}
