use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/mdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdlConfig {
    /// Base directory downloads are written under (joined per file with the
    /// resolved relative path). Relative values resolve against the cwd.
    pub download_root: PathBuf,
    /// Number of per-task rows in the live progress view.
    pub display_slots: usize,
    /// Hugging Face token for gated repos. The `HF_TOKEN` environment
    /// variable takes precedence when set.
    pub hf_token: Option<String>,
}

impl Default for MdlConfig {
    fn default() -> Self {
        Self {
            download_root: PathBuf::from("models"),
            display_slots: 20,
            hf_token: None,
        }
    }
}

impl MdlConfig {
    /// Token to use for gated-host requests: environment first, then config.
    pub fn resolve_token(&self) -> Option<String> {
        env::var("HF_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.hf_token.clone().filter(|t| !t.is_empty()))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MdlConfig::default();
        assert_eq!(cfg.download_root, PathBuf::from("models"));
        assert_eq!(cfg.display_slots, 20);
        assert!(cfg.hf_token.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.download_root, cfg.download_root);
        assert_eq!(parsed.display_slots, cfg.display_slots);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            download_root = "/data/models"
            display_slots = 8
            hf_token = "hf_abc"
        "#;
        let cfg: MdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.download_root, PathBuf::from("/data/models"));
        assert_eq!(cfg.display_slots, 8);
        assert_eq!(cfg.hf_token.as_deref(), Some("hf_abc"));
    }
}
