use std::{collections::HashMap, fs, io::ErrorKind, path::PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_CONFIG_FILE: &str = "share-file.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub site_root: PathBuf,
    pub base_url: Option<String>,
    pub site_origin: String,
    pub shell_path: String,
    pub templates_prefix: String,
    pub page_data_file: String,
    pub page_title_suffix: String,
    pub header_title: String,
    pub file_empty_content: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            base_url: None,
            site_origin: "http://localhost".into(),
            shell_path: "/index.html".into(),
            templates_prefix: "/assets/templates".into(),
            page_data_file: "file-info.toml".into(),
            page_title_suffix: "一起分享吧！文件！".into(),
            header_title: r#"<a href="https://github.com/LetsShareAll/Share_File" title="前往 Github 查看源码">一起分享吧！文件！</a>"#.into(),
            file_empty_content: render_core::DEFAULT_EMPTY_CONTENT.into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "site_root" => self.site_root = PathBuf::from(value),
            "base_url" => self.base_url = Some(value).filter(|v| !v.is_empty()),
            "site_origin" => self.site_origin = value,
            "shell_path" => self.shell_path = value,
            "templates_prefix" => self.templates_prefix = value.trim_end_matches('/').to_string(),
            "page_data_file" => self.page_data_file = value,
            "page_title_suffix" => self.page_title_suffix = value,
            "header_title" => self.header_title = value,
            "file_empty_content" => self.file_empty_content = value,
            "log_filter" => self.log_filter = value,
            _ => return false,
        }
        true
    }
}

const KEYS: &[&str] = &[
    "site_root",
    "base_url",
    "site_origin",
    "shell_path",
    "templates_prefix",
    "page_data_file",
    "page_title_suffix",
    "header_title",
    "file_empty_content",
    "log_filter",
];

/// Settings plus the problems found while loading them. The warnings are
/// returned rather than logged so they can be reported once logging is up.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub warnings: Vec<String>,
}

/// Defaults, then the flat key/value config file, then `SHARE_FILE_<KEY>`
/// and `APP__<KEY>` environment variables.
///
/// An explicitly named file must exist and parse. The default
/// `share-file.toml` is optional and a broken one only produces a warning.
pub fn load_settings(config_file: Option<PathBuf>) -> Result<LoadedSettings> {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    match config_file {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let unknown = apply_file_overrides(&mut settings, &raw)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            warnings.extend(unknown_key_warnings(&path, unknown));
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(raw) => match apply_file_overrides(&mut settings, &raw) {
                    Ok(unknown) => warnings.extend(unknown_key_warnings(&path, unknown)),
                    Err(error) => warnings.push(format!(
                        "ignoring unreadable config file {}: {error}",
                        path.display()
                    )),
                },
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => warnings.push(format!(
                    "ignoring unreadable config file {}: {error}",
                    path.display()
                )),
            }
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(LoadedSettings { settings, warnings })
}

fn unknown_key_warnings(path: &std::path::Path, keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .map(|key| format!("ignoring unknown config key '{key}' in {}", path.display()))
        .collect()
}

/// Applies the known keys of a flat TOML table and returns the unknown ones.
pub(crate) fn apply_file_overrides(
    settings: &mut Settings,
    raw: &str,
) -> Result<Vec<String>, toml::de::Error> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    let mut unknown: Vec<String> = file_cfg
        .into_iter()
        .filter_map(|(key, value)| (!settings.set(&key, value)).then_some(key))
        .collect();
    unknown.sort();
    Ok(unknown)
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in KEYS {
        let upper = key.to_ascii_uppercase();
        for name in [format!("SHARE_FILE_{upper}"), format!("APP__{upper}")] {
            if let Some(value) = lookup(&name) {
                settings.set(key, value);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
