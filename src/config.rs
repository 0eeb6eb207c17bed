use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

const SETTINGS_FILE: &str = "childcare";
const ENV_PREFIX: &str = "CHILDCARE";

/// Markup markers and limits. Defaults match the childcare portal layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub section_heading_tag: String,
    pub section_heading_class: String,
    pub title_tag: String,
    pub title_class: String,
    pub tab_list_tag: String,
    pub tab_list_class: String,
    pub tab_selected_class: String,
    pub highlight_class: String,
    pub emphasis_tag: String,
    pub max_depth: usize,
    pub min_paragraph_chars: usize,
    pub promote_header_row: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            section_heading_tag: "h4".into(),
            section_heading_class: "title_line".into(),
            title_tag: "h3".into(),
            title_class: "title".into(),
            tab_list_tag: "ul".into(),
            tab_list_class: "tab".into(),
            tab_selected_class: "on".into(),
            highlight_class: "color_box_blue_square".into(),
            emphasis_tag: "strong".into(),
            max_depth: 128,
            min_paragraph_chars: 2,
            promote_header_row: false,
        }
    }
}

impl Settings {
    /// Defaults, then `childcare.toml` if present, then `CHILDCARE_*` env vars.
    pub fn load() -> Result<Self> {
        Self::from_sources(SETTINGS_FILE, ENV_PREFIX)
    }

    /// `file` is a path without extension; a missing file is not an error.
    fn from_sources(file: &str, env_prefix: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_source_keeps_defaults() {
        let settings: Settings = Config::builder()
            .set_override("max_depth", 8)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.section_heading_tag, "h4");
        assert_eq!(settings.highlight_class, "color_box_blue_square");
        assert!(!settings.promote_header_row);
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("childcare.toml"),
            "max_depth = 16\nhighlight_class = \"notice\"\n",
        )
        .unwrap();
        let base = dir.path().join("childcare");

        let settings =
            Settings::from_sources(base.to_str().unwrap(), "CHILDCARE_FILE_ONLY").unwrap();
        assert_eq!(settings.max_depth, 16);
        assert_eq!(settings.highlight_class, "notice");
        assert_eq!(settings.title_class, "title");
    }

    #[test]
    fn env_overrides_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("childcare.toml"), "max_depth = 16\n").unwrap();
        let base = dir.path().join("childcare");
        std::env::set_var("CHILDCARE_ENV_LAYER_MAX_DEPTH", "32");
        std::env::set_var("CHILDCARE_ENV_LAYER_PROMOTE_HEADER_ROW", "true");

        let settings =
            Settings::from_sources(base.to_str().unwrap(), "CHILDCARE_ENV_LAYER").unwrap();
        assert_eq!(settings.max_depth, 32);
        assert!(settings.promote_header_row);
        assert_eq!(settings.section_heading_class, "title_line");
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("absent");
        let settings =
            Settings::from_sources(base.to_str().unwrap(), "CHILDCARE_NO_SOURCES").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
