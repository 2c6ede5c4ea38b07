//! System settings, persisted as a JSON file beside the database.
//! Missing or unreadable files fall back to defaults rather than
//! failing the request.

use std::fs;

use tracing::warn;

use crate::model::AppSettings;
use crate::service::{OfficeError, OfficeService};
use realdesk_core::merge_patch;

impl OfficeService {
    /// Current settings, defaulted when the file is absent or corrupt.
    pub fn settings(&self) -> AppSettings {
        match fs::read_to_string(&self.settings_path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %self.settings_path.display(), error = %e, "settings file unreadable, using defaults");
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        }
    }

    /// Merge-patch the settings and persist the result.
    pub fn update_settings(&self, patch: &serde_json::Value) -> Result<AppSettings, OfficeError> {
        let mut current = serde_json::to_value(self.settings())
            .map_err(|e| OfficeError::Internal(e.to_string()))?;
        merge_patch(&mut current, patch);

        let updated: AppSettings = serde_json::from_value(current)
            .map_err(|e| OfficeError::Validation(format!("invalid settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).map_err(|e| OfficeError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&updated)
            .map_err(|e| OfficeError::Internal(e.to_string()))?;
        fs::write(&self.settings_path, json).map_err(|e| OfficeError::Storage(e.to_string()))?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use crate::service::OfficeError;
    use crate::service::test_support::test_env;

    #[test]
    fn defaults_when_file_absent() {
        let env = test_env();
        let settings = env.office.settings();
        assert_eq!(settings.announcement.level, "info");
        assert!(!settings.announcement.active);
        assert!(settings.features.electronic_contracts);
        assert!(settings.features.map_service);
    }

    #[test]
    fn patch_persists_across_reads() {
        let env = test_env();
        let updated = env
            .office
            .update_settings(&serde_json::json!({
                "announcement": {"message": "maintenance tonight", "active": true}
            }))
            .unwrap();
        assert!(updated.announcement.active);
        assert_eq!(updated.announcement.level, "info");

        let reread = env.office.settings();
        assert_eq!(reread.announcement.message, "maintenance tonight");
        assert!(reread.features.map_service);
    }

    #[test]
    fn invalid_patch_is_rejected() {
        let env = test_env();
        let err = env
            .office
            .update_settings(&serde_json::json!({"announcement": {"active": "yes"}}))
            .unwrap_err();
        assert!(matches!(err, OfficeError::Validation(_)));
    }
}
