//! Presentation settings carried inside backup documents.
//!
//! The core never persists settings; it only merges the partial settings
//! embedded in a backup over the caller's current settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_URL: &str =
    "https://www.google.com/search?q={query}&udm=14&as_qdr=all&as_occt=any";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    #[default]
    Blue,
    Green,
    Purple,
    Pink,
    Orange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundName {
    #[default]
    Gray,
    Slate,
    Onyx,
}

/// Full dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub show_search: bool,
    pub accent_color: AccentColor,
    /// Search template; `{query}` is replaced by the encoded query.
    pub search_url: String,
    pub background_name: BackgroundName,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_search: true,
            accent_color: AccentColor::default(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            background_name: BackgroundName::default(),
        }
    }
}

impl Settings {
    /// Returns these settings with every present patch field applied.
    pub fn merged(&self, patch: &SettingsPatch) -> Settings {
        Settings {
            show_search: patch.show_search.unwrap_or(self.show_search),
            accent_color: patch.accent_color.unwrap_or(self.accent_color),
            search_url: patch
                .search_url
                .clone()
                .unwrap_or_else(|| self.search_url.clone()),
            background_name: patch.background_name.unwrap_or(self.background_name),
        }
    }
}

/// Partial settings; absent fields keep their current value on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<AccentColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_name: Option<BackgroundName>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }
}

impl From<&Settings> for SettingsPatch {
    fn from(value: &Settings) -> Self {
        Self {
            show_search: Some(value.show_search),
            accent_color: Some(value.accent_color),
            search_url: Some(value.search_url.clone()),
            background_name: Some(value.background_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccentColor, BackgroundName, Settings, SettingsPatch};

    #[test]
    fn merge_only_overrides_present_fields() {
        let current = Settings::default();
        let patch: SettingsPatch = serde_json::from_str(r#"{"accentColor":"pink"}"#).unwrap();

        let merged = current.merged(&patch);
        assert_eq!(merged.accent_color, AccentColor::Pink);
        assert!(merged.show_search);
        assert_eq!(merged.background_name, BackgroundName::Gray);
        assert_eq!(merged.search_url, current.search_url);
    }

    #[test]
    fn full_patch_reproduces_settings() {
        let settings = Settings {
            show_search: false,
            accent_color: AccentColor::Orange,
            search_url: "https://search.test/?q={query}".to_string(),
            background_name: BackgroundName::Onyx,
        };
        let patch = SettingsPatch::from(&settings);
        assert_eq!(Settings::default().merged(&patch), settings);
        assert!(SettingsPatch::default().is_empty());
    }
}
