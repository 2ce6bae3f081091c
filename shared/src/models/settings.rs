//! Runtime-mutable ordering settings
//!
//! These are the values the admin settings surface can change while the
//! service is running; nothing here is a compile-time constant. The server
//! keeps one instance behind a lock and reads it on every rule check.

use serde::{Deserialize, Serialize};

/// A daily opening window, hours in 0..=24 local time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoursWindow {
    pub opens_at: u8,
    pub closes_at: u8,
}

impl HoursWindow {
    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.opens_at && hour < self.closes_at
    }
}

/// Ordering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderingSettings {
    /// Cooldown between submissions on an AYCE session, minutes
    pub cooldown_minutes: u32,
    /// Course-limit multiplier: limit = participants * this
    pub courses_per_participant: u32,
    /// Master switch: kitchen accepts submissions at all
    pub kitchen_enabled: bool,
    pub lunch_hours: HoursWindow,
    pub dinner_hours: HoursWindow,
}

impl Default for OrderingSettings {
    fn default() -> Self {
        Self {
            cooldown_minutes: 15,
            courses_per_participant: 5,
            kitchen_enabled: true,
            lunch_hours: HoursWindow { opens_at: 12, closes_at: 15 },
            dinner_hours: HoursWindow { opens_at: 19, closes_at: 23 },
        }
    }
}

impl OrderingSettings {
    pub fn cooldown_millis(&self) -> i64 {
        i64::from(self.cooldown_minutes) * 60_000
    }

    pub fn course_limit(&self, participant_count: u32) -> u32 {
        participant_count * self.courses_per_participant
    }

    /// Whether the kitchen accepts submissions at the given local hour
    pub fn kitchen_open(&self, hour: u8) -> bool {
        self.kitchen_enabled && (self.lunch_hours.contains(hour) || self.dinner_hours.contains(hour))
    }

    /// Apply one keyed update from the settings surface. Keys mirror the
    /// admin UI; values arrive as raw strings.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), SettingsPatchError> {
        fn int(value: &str, min: u32, max: u32) -> Result<u32, SettingsPatchError> {
            let v: u32 = value
                .parse()
                .map_err(|_| SettingsPatchError::InvalidValue(value.to_string()))?;
            if v < min || v > max {
                return Err(SettingsPatchError::OutOfRange { value: v, min, max });
            }
            Ok(v)
        }
        fn flag(value: &str) -> Result<bool, SettingsPatchError> {
            value
                .parse()
                .map_err(|_| SettingsPatchError::InvalidValue(value.to_string()))
        }

        match key {
            "cooldown_minutes" => self.cooldown_minutes = int(value, 0, 120)?,
            "courses_per_participant" => self.courses_per_participant = int(value, 1, 20)?,
            "kitchen_enabled" => self.kitchen_enabled = flag(value)?,
            "lunch_opens_at" => self.lunch_hours.opens_at = int(value, 0, 24)? as u8,
            "lunch_closes_at" => self.lunch_hours.closes_at = int(value, 0, 24)? as u8,
            "dinner_opens_at" => self.dinner_hours.opens_at = int(value, 0, 24)? as u8,
            "dinner_closes_at" => self.dinner_hours.closes_at = int(value, 0, 24)? as u8,
            other => return Err(SettingsPatchError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Typed key/value view for the settings surface
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        vec![
            ("cooldown_minutes", SettingValue::Int(self.cooldown_minutes)),
            (
                "courses_per_participant",
                SettingValue::Int(self.courses_per_participant),
            ),
            ("kitchen_enabled", SettingValue::Bool(self.kitchen_enabled)),
            ("lunch_opens_at", SettingValue::Int(self.lunch_hours.opens_at.into())),
            ("lunch_closes_at", SettingValue::Int(self.lunch_hours.closes_at.into())),
            ("dinner_opens_at", SettingValue::Int(self.dinner_hours.opens_at.into())),
            ("dinner_closes_at", SettingValue::Int(self.dinner_hours.closes_at.into())),
        ]
    }
}

/// Value of a single setting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Int(u32),
    Bool(bool),
}

/// Rejected settings update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsPatchError {
    UnknownKey(String),
    InvalidValue(String),
    OutOfRange { value: u32, min: u32, max: u32 },
}

impl std::fmt::Display for SettingsPatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsPatchError::UnknownKey(k) => write!(f, "unknown setting: {}", k),
            SettingsPatchError::InvalidValue(v) => write!(f, "invalid value: {}", v),
            SettingsPatchError::OutOfRange { value, min, max } => {
                write!(f, "value {} outside {}..={}", value, min, max)
            }
        }
    }
}

impl std::error::Error for SettingsPatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_updates_and_validates() {
        let mut s = OrderingSettings::default();
        s.apply("cooldown_minutes", "20").unwrap();
        assert_eq!(s.cooldown_minutes, 20);
        s.apply("kitchen_enabled", "false").unwrap();
        assert!(!s.kitchen_enabled);

        assert!(matches!(
            s.apply("cooldown_minutes", "500"),
            Err(SettingsPatchError::OutOfRange { .. })
        ));
        assert!(matches!(
            s.apply("nope", "1"),
            Err(SettingsPatchError::UnknownKey(_))
        ));
    }

    #[test]
    fn kitchen_open_respects_windows_and_master_switch() {
        let mut s = OrderingSettings::default();
        assert!(s.kitchen_open(12));
        assert!(s.kitchen_open(20));
        assert!(!s.kitchen_open(17));
        s.kitchen_enabled = false;
        assert!(!s.kitchen_open(12));
    }
}
