use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub create: CreateConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    pub integration: IntegrationConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub start_dir: String,
    pub show_hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateConfig {
    pub collision: CollisionPolicy,
}

/// What a new file does to an existing file of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Atomically replace the existing file.
    #[default]
    Overwrite,
    /// Leave the existing file alone and report it.
    Fail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminalConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                program: "open".to_string(),
                args: vec!["-a".to_string(), "Terminal".to_string(), "{dir}".to_string()],
            }
        } else {
            Self {
                program: "x-terminal-emulator".to_string(),
                args: Vec::new(),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IntegrationConfig {
    pub flag_file: String,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user = match project_dirs() {
            Some(dirs) => {
                let config_path = dirs.config_dir().join("config.toml");
                if config_path.exists() {
                    let raw = fs::read_to_string(&config_path)
                        .with_context(|| format!("reading {}", config_path.display()))?;
                    Some(raw)
                } else {
                    None
                }
            }
            None => None,
        };

        Self::from_layers(DEFAULTS, user.as_deref())
    }

    /// Merge `user` over `defaults` table by table, then expand `~`.
    pub fn from_layers(defaults: &str, user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(defaults)?;
        if let Some(user) = user {
            let overrides: toml::Table = toml::from_str(user)?;
            merge_tables(&mut merged, overrides);
        }

        let mut config: AppConfig = toml::Value::Table(merged).try_into()?;

        if config.general.start_dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.general.start_dir =
                config
                    .general
                    .start_dir
                    .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn start_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.start_dir)
    }

    pub fn flag_file(&self) -> PathBuf {
        if !self.integration.flag_file.is_empty() {
            return PathBuf::from(&self.integration.flag_file);
        }

        data_dir().join("enabled")
    }
}

/// Where logs and the integration flag live.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("newfile"))
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "newfile")
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(over_table)) => {
                merge_tables(base_table, over_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = AppConfig::from_layers(DEFAULTS, None).unwrap();
        assert_eq!(config.general.start_dir, ".");
        assert!(!config.general.show_hidden);
        assert_eq!(config.create.collision, CollisionPolicy::Overwrite);
        assert!(!config.terminal.program.is_empty());
        assert!(config.integration.flag_file.is_empty());
    }

    #[test]
    fn user_layer_overrides_single_keys() {
        let user = r#"
            [create]
            collision = "fail"

            [terminal]
            program = "alacritty"
            args = ["--working-directory", "{dir}"]
        "#;

        let config = AppConfig::from_layers(DEFAULTS, Some(user)).unwrap();
        assert_eq!(config.create.collision, CollisionPolicy::Fail);
        assert_eq!(config.terminal.program, "alacritty");
        assert_eq!(config.terminal.args, ["--working-directory", "{dir}"]);
        // untouched tables keep their defaults
        assert_eq!(config.general.start_dir, ".");
    }

    #[test]
    fn unknown_collision_policy_is_rejected() {
        let user = "[create]\ncollision = \"rename\"\n";
        assert!(AppConfig::from_layers(DEFAULTS, Some(user)).is_err());
    }

    #[test]
    fn explicit_flag_file_wins() {
        let user = "[integration]\nflag_file = \"/tmp/newfile-flag\"\n";
        let config = AppConfig::from_layers(DEFAULTS, Some(user)).unwrap();
        assert_eq!(config.flag_file(), PathBuf::from("/tmp/newfile-flag"));
    }

    #[test]
    fn tilde_start_dir_is_expanded() {
        let user = "[general]\nstart_dir = \"~/projects\"\n";
        let config = AppConfig::from_layers(DEFAULTS, Some(user)).unwrap();
        assert!(!config.general.start_dir.starts_with('~'));
        assert!(config.general.start_dir.ends_with("projects"));
    }
}
