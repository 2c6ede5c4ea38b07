use serde::{Deserialize, Serialize};

/// System-wide settings persisted as a JSON file next to the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub announcement: Announcement,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub message: String,
    /// `info` | `warning` | `error`.
    pub level: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub electronic_contracts: bool,
    pub map_service: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            announcement: Announcement {
                message: String::new(),
                level: "info".to_string(),
                active: false,
            },
            features: FeatureFlags {
                electronic_contracts: true,
                map_service: true,
            },
        }
    }
}
