use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::{Config, Profile};

/// Ordered list of config file locations searched from lowest to highest priority.
/// Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. System-wide default
    paths.push(PathBuf::from("/etc/agentchat/config.toml"));

    // 2. XDG / home
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config/agentchat/config.toml"));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("agentchat/config.toml"));
    }

    // 3. Workspace-local
    paths.push(PathBuf::from(".agentchat/config.toml"));
    paths.push(PathBuf::from("agentchat.toml"));

    paths
}

/// Load configuration by merging all discovered TOML files.
///
/// The `extra` argument may provide an explicit path (e.g. `--config` CLI
/// flag).  The profile (from `profile_override`, else the merged files, else
/// the default) picks the base defaults; file layers are merged on top.
pub fn load(extra: Option<&Path>, profile_override: Option<Profile>) -> anyhow::Result<Config> {
    let mut layers = toml::Value::Table(toml::map::Map::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_toml(&mut layers, read_layer(&path)?);
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_toml(&mut layers, read_layer(p)?);
    }

    let profile = match profile_override {
        Some(p) => p,
        None => match layers.get("profile") {
            Some(v) => v
                .clone()
                .try_into()
                .context("parsing `profile` (expected \"knowledge-base\" or \"customer-support\")")?,
            None => Profile::default(),
        },
    };
    debug!(%profile, "resolved profile");

    let mut merged = toml::Value::try_from(Config::for_profile(profile))
        .context("serializing profile defaults")?;
    merge_toml(&mut merged, layers);
    if let toml::Value::Table(t) = &mut merged {
        t.insert("profile".into(), toml::Value::String(profile.to_string()));
    }

    let config: Config = merged.try_into().context("decoding merged configuration")?;
    Ok(config)
}

fn read_layer(path: &Path) -> anyhow::Result<toml::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Deep-merge `src` into `dst`; src wins on scalar conflicts.
fn merge_toml(dst: &mut toml::Value, src: toml::Value) {
    match (dst, src) {
        (toml::Value::Table(d), toml::Value::Table(s)) => {
            for (k, v) in s {
                let entry = d.entry(k).or_insert(toml::Value::Table(toml::map::Map::new()));
                merge_toml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
