use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::Resource;
use hub_runtime::HubRulesConfig;

pub const RULES_CONFIG_ENV: &str = "HUB_RULES_CONFIG_PATH";

#[derive(Resource, Debug, Clone)]
pub struct HubRulesHandle(pub Arc<HubRulesConfig>);

impl HubRulesHandle {
    pub fn new(config: Arc<HubRulesConfig>) -> Self {
        Self(config)
    }

    pub fn get(&self) -> Arc<HubRulesConfig> {
        Arc::clone(&self.0)
    }

    pub fn config(&self) -> &HubRulesConfig {
        &self.0
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct HubRulesMetadata {
    path: Option<PathBuf>,
}

impl HubRulesMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Loads the rules from `HUB_RULES_CONFIG_PATH` when set, otherwise uses the
/// compiled-in copy. An unreadable or invalid override falls back to the
/// builtin rules with a warning.
pub fn load_hub_rules_from_env() -> (Arc<HubRulesConfig>, HubRulesMetadata) {
    let Some(path) = env::var(RULES_CONFIG_ENV).ok().map(PathBuf::from) else {
        tracing::info!(target: "hub::config", "hub_rules.loaded=builtin");
        return (HubRulesConfig::builtin(), HubRulesMetadata::new(None));
    };

    match HubRulesConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "hub::config",
                path = %path.display(),
                "hub_rules.loaded=file"
            );
            (Arc::new(config), HubRulesMetadata::new(Some(path)))
        }
        Err(err) => {
            tracing::warn!(
                target: "hub::config",
                path = %path.display(),
                error = %err,
                "hub_rules.load_failed"
            );
            tracing::info!(target: "hub::config", "hub_rules.loaded=builtin");
            (HubRulesConfig::builtin(), HubRulesMetadata::new(None))
        }
    }
}
