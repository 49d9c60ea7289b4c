use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Persist the snapshot automatically after each achievement toggle.
    #[serde(default = "default_true")]
    pub auto_save: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            auto_save: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Warn when starting a trip with unconfirmed required rules.
    #[serde(default = "default_true")]
    pub warn_unconfirmed: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            warn_unconfirmed: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Directory under the journal root holding the database, config, and cache.
pub const VANLOG_DIR: &str = ".vanlog";

/// Path of the project config file under a journal root.
#[must_use]
pub fn project_config_path(journal_root: &Path) -> PathBuf {
    journal_root.join(VANLOG_DIR).join("config.toml")
}

/// Path of the journal database under a journal root.
#[must_use]
pub fn journal_db_path(journal_root: &Path) -> PathBuf {
    journal_root.join(VANLOG_DIR).join("journal.db")
}

pub fn load_project_config(journal_root: &Path) -> Result<ProjectConfig> {
    let path = project_config_path(journal_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("vanlog/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(journal_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(journal_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some("pretty"),
            "text" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert!(cfg.review.auto_save);
        assert!(cfg.rules.warn_unconfirmed);
    }

    #[test]
    fn project_config_parses_overrides() {
        let dir = tempfile::tempdir().expect("temp dir");
        let vanlog = dir.path().join(VANLOG_DIR);
        std::fs::create_dir_all(&vanlog).expect("create .vanlog");
        std::fs::write(
            vanlog.join("config.toml"),
            "[review]\nauto_save = false\n\n[rules]\nwarn_unconfirmed = false\n",
        )
        .expect("write config");

        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert!(!cfg.review.auto_save);
        assert!(!cfg.rules.warn_unconfirmed);
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "json");
    }

    #[test]
    fn env_format_overrides_user_config() {
        let output = resolve_output(false, Some("pretty".to_string()), Some("text".to_string()));
        assert_eq!(output, "text");
    }

    #[test]
    fn unknown_values_fall_through() {
        let output = resolve_output(false, Some("fancy".to_string()), Some("wide".to_string()));
        assert!(output == "pretty" || output == "text");
    }
}
