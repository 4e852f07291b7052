//! Shared runtime utilities for the hub rules.
//!
//! This crate re-exports the data contracts from `hub_schema` and adds the
//! pieces that do not need the Bevy host: the rules configuration contract,
//! the command payloads and the line-oriented command parser.

pub use hub_schema::*;

mod command_text;
mod commands;
pub mod rules_config;

pub use command_text::{parse_admin_command, parse_command_line, CommandParseError};
pub use commands::{AdminCommand, SandboxCommand};
pub use rules_config::{
    rules_config_schema, CleanerSettings, EffectSettings, EnforcementSettings, HubRulesConfig,
    PermissionTags, RegenSettings, RulesConfigError, RulesValidationError, TeleportSettings,
    ZoneDefaults, MAX_ZONE_RADIUS,
};
