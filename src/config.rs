//! Layered configuration: built-in defaults, TOML files, then command-line
//! flags.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matcher::Comparator;
use crate::pager::Layout;
use crate::session::SessionConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub case_insensitive: bool,
    /// Rows in the vertical list; 0 lays items out on the input line.
    pub lines: usize,
    pub prompt: String,
    /// Draw the menu on the last terminal rows instead of the first.
    pub bottom: bool,
    pub initial_query: String,
    pub word_delimiters: String,
    pub colors: Colors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            lines: 0,
            prompt: String::new(),
            bottom: false,
            initial_query: String::new(),
            word_delimiters: " ".to_string(),
            colors: Colors::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub normal_fg: String,
    pub normal_bg: String,
    pub selected_fg: String,
    pub selected_bg: String,
    pub out_fg: String,
    pub out_bg: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            normal_fg: "#bbbbbb".to_string(),
            normal_bg: "#222222".to_string(),
            selected_fg: "#eeeeee".to_string(),
            selected_bg: "#005577".to_string(),
            out_fg: "#000000".to_string(),
            out_bg: "#00ffff".to_string(),
        }
    }
}

/// Values given on the command line. Unset fields leave the file and default
/// values alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_delimiters: Option<String>,
    pub colors: ColorOverrides,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ColorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_bg: Option<String>,
}

impl Config {
    /// Load defaults, every config file found on the search path, the
    /// explicit `--config` file and finally `overrides`.
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut files = Vec::new();
        if let Ok(home) = env::var("HOME") {
            files.extend(config_paths(Path::new(&home)));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(Error::ConfigNotFound(path.to_path_buf()));
            }
            files.push(path.to_path_buf());
        }
        Self::from_files(&files, overrides)
    }

    pub fn from_files(files: &[PathBuf], overrides: &Overrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for path in files.iter().filter(|path| path.is_file()) {
            log::debug!("reading config {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        let config = figment.merge(Serialized::defaults(overrides)).extract()?;
        Ok(config)
    }

    pub fn comparator(&self) -> Comparator {
        Comparator::from_ignore_case(self.case_insensitive)
    }

    pub fn session_config(&self, layout: Layout) -> SessionConfig {
        SessionConfig {
            comparator: self.comparator(),
            layout,
            prompt: self.prompt.clone(),
            initial_query: self.initial_query.clone().into_bytes(),
            word_delimiters: self.word_delimiters.clone().into_bytes(),
        }
    }
}

fn config_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/dynmenu/config.toml")];
    let xdg = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home.join(".config"));
    paths.push(xdg.join("dynmenu/config.toml"));
    paths.push(home.join(".config/dynmenu/config.toml"));
    paths.push(home.join(".dynmenu.toml"));
    if let Ok(path) = env::var("DYNMENU_CONFIG") {
        if !path.trim().is_empty() {
            paths.push(PathBuf::from(path));
        }
    }

    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.clone()));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("dynmenu-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_files() {
        let config = Config::from_files(&[], &Overrides::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.comparator(), Comparator::CaseSensitive);
    }

    #[test]
    fn later_files_and_flags_win() {
        let base = temp_file(
            "base.toml",
            "lines = 5\nprompt = \"run:\"\n[colors]\nselected_bg = \"red\"\n",
        );
        let local = temp_file("local.toml", "lines = 8\ncase_insensitive = true\n");
        let overrides = Overrides {
            prompt: Some("go:".to_string()),
            colors: ColorOverrides {
                out_fg: Some("white".to_string()),
                ..ColorOverrides::default()
            },
            ..Overrides::default()
        };

        let config = Config::from_files(&[base, local], &overrides).unwrap();
        assert_eq!(config.lines, 8);
        assert!(config.case_insensitive);
        assert_eq!(config.prompt, "go:");
        assert_eq!(config.colors.selected_bg, "red");
        assert_eq!(config.colors.out_fg, "white");
        assert_eq!(config.colors.normal_bg, "#222222");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = env::temp_dir().join("dynmenu-definitely-missing.toml");
        let err = Config::load(Some(&missing), &Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(path) if path == missing));
    }

    #[test]
    fn malformed_file_is_reported() {
        let bad = temp_file("bad.toml", "lines = \"many\"\n");
        let err = Config::from_files(&[bad], &Overrides::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn session_config_carries_matching_options() {
        let config = Config {
            case_insensitive: true,
            initial_query: "ab".to_string(),
            word_delimiters: " /".to_string(),
            ..Config::default()
        };
        let session = config.session_config(Layout::Vertical { rows: 3 });
        assert_eq!(session.comparator, Comparator::CaseInsensitive);
        assert_eq!(session.initial_query, b"ab".to_vec());
        assert_eq!(session.word_delimiters, b" /".to_vec());
    }
}
