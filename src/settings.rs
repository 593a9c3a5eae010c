//! Engine settings loaded from an optional JSON file.
//!
//! Every field has a default, so a settings file only needs the keys it
//! changes:
//!
//! ```json
//! { "navigation": "unbounded", "counter_warning_threshold": 25 }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::counter::{CharCounter, DEFAULT_WARNING_THRESHOLD};
use crate::form::DEFAULT_MAX_LENGTH;
use crate::types::{NavigationBounds, PhonePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether previous/next may leave the section list
    pub navigation: NavigationBounds,
    /// Phone rule strictness for navigation and final submission
    pub phone_policy: PhonePolicy,
    /// Counters switch to the warning state below this many remaining characters
    pub counter_warning_threshold: usize,
    /// Limit used by multiline fields declaring `max_length: 0`
    pub default_max_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            navigation: NavigationBounds::Clamped,
            phone_policy: PhonePolicy::default(),
            counter_warning_threshold: DEFAULT_WARNING_THRESHOLD,
            default_max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;
        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_max_length == 0 {
            anyhow::bail!("default_max_length must be greater than zero");
        }
        Ok(())
    }

    /// Counter for a field with the given limit
    pub fn counter(&self, max_length: usize) -> CharCounter {
        CharCounter::new(max_length).with_warning_threshold(self.counter_warning_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhoneRequirement;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.navigation, NavigationBounds::Clamped);
        assert_eq!(settings.counter_warning_threshold, 50);
        assert_eq!(settings.default_max_length, 500);
        assert_eq!(settings.phone_policy.submission, PhoneRequirement::Always);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "navigation": "unbounded" }}"#).unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.navigation, NavigationBounds::Unbounded);
        assert_eq!(settings.counter_warning_threshold, 50);
    }

    #[test]
    fn test_phone_policy_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "phone_policy": {{ "navigation": "always", "submission": "always" }} }}"#
        )
        .unwrap();

        let settings = Settings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.phone_policy.navigation, PhoneRequirement::Always);
    }

    #[test]
    fn test_zero_default_max_length_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "default_max_length": 0 }}"#).unwrap();
        assert!(Settings::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let file = NamedTempFile::new().unwrap();
        let settings = Settings {
            counter_warning_threshold: 10,
            ..Settings::default()
        };
        settings.save_to_file(file.path()).unwrap();
        assert_eq!(Settings::load_from_file(file.path()).unwrap(), settings);
    }

    #[test]
    fn test_unknown_navigation_value_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "navigation": "wrap" }}"#).unwrap();
        assert!(Settings::load_from_file(file.path()).is_err());
    }
}
