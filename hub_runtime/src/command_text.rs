use std::num::{ParseFloatError, ParseIntError};
use std::str::SplitWhitespace;

use hub_schema::{ActorId, WorldPos, OVERWORLD};
use thiserror::Error;

use crate::{AdminCommand, SandboxCommand};

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown admin command: {0}")]
    UnknownAdminCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid integer '{value}' for {context}: {source}")]
    InvalidInteger {
        value: String,
        context: &'static str,
        source: ParseIntError,
    },
    #[error("invalid float '{value}' for {context}: {source}")]
    InvalidFloat {
        value: String,
        context: &'static str,
        source: ParseFloatError,
    },
}

pub fn parse_command_line(input: &str) -> Result<SandboxCommand, CommandParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CommandParseError::Empty);
    }

    let mut parts = trimmed.split_whitespace();
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::Empty)?;

    match verb.as_str() {
        "tick" => {
            let steps_str = parts.next().unwrap_or("1");
            let steps = parse_u32(steps_str, "tick steps")?;
            Ok(SandboxCommand::Tick { steps })
        }
        "join" => {
            let name = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("name"))?
                .to_string();
            let position = parse_position(&mut parts, "join position")?;
            let tags = parts
                .next()
                .map(|list| {
                    list.split(',')
                        .filter(|tag| !tag.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            Ok(SandboxCommand::Join {
                name,
                position,
                tags,
            })
        }
        "leave" => {
            let actor = parse_actor(&mut parts, "leave actor")?;
            Ok(SandboxCommand::Leave { actor })
        }
        "move" => {
            let actor = parse_actor(&mut parts, "move actor")?;
            let position = parse_position(&mut parts, "move position")?;
            Ok(SandboxCommand::Move { actor, position })
        }
        "tag" => {
            let actor = parse_actor(&mut parts, "tag actor")?;
            let tag = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("tag"))?
                .to_string();
            Ok(SandboxCommand::Tag { actor, tag })
        }
        "give" => {
            let actor = parse_actor(&mut parts, "give actor")?;
            let item = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("item"))?
                .to_string();
            let slot = parts
                .next()
                .map(|value| parse_usize(value, "give slot"))
                .transpose()?;
            Ok(SandboxCommand::Give { actor, item, slot })
        }
        "select" => {
            let actor = parse_actor(&mut parts, "select actor")?;
            let slot_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("slot"))?;
            let slot = parse_usize(slot_str, "select slot")?;
            Ok(SandboxCommand::Select { actor, slot })
        }
        "break" => {
            let actor = parse_actor(&mut parts, "break actor")?;
            let block = parse_position(&mut parts, "break block")?;
            Ok(SandboxCommand::Break { actor, block })
        }
        "interact" => {
            let actor = parse_actor(&mut parts, "interact actor")?;
            let block = parse_position(&mut parts, "interact block")?;
            Ok(SandboxCommand::Interact { actor, block })
        }
        "use" => {
            let actor = parse_actor(&mut parts, "use actor")?;
            Ok(SandboxCommand::Use { actor })
        }
        "hurt" => {
            let victim = parse_actor(&mut parts, "hurt victim")?;
            let amount_str = parts.next().unwrap_or("1");
            let amount = parse_f32(amount_str, "hurt amount")?;
            let attacker = parts
                .next()
                .map(|value| parse_u64(value, "hurt attacker").map(ActorId))
                .transpose()?;
            Ok(SandboxCommand::Hurt {
                victim,
                amount,
                attacker,
            })
        }
        "explode" => {
            let position = parse_position(&mut parts, "explode position")?;
            let dimension = parse_dimension(&mut parts);
            Ok(SandboxCommand::Explode {
                position,
                dimension,
            })
        }
        "spawn" => {
            let entity_type = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("entity type"))?
                .to_string();
            let position = parse_position(&mut parts, "spawn position")?;
            let dimension = parse_dimension(&mut parts);
            Ok(SandboxCommand::Spawn {
                entity_type,
                position,
                dimension,
            })
        }
        "drop" => {
            let item = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("item"))?
                .to_string();
            let position = parse_position(&mut parts, "drop position")?;
            let dimension = parse_dimension(&mut parts);
            Ok(SandboxCommand::Drop {
                item,
                position,
                dimension,
            })
        }
        "as" => {
            let actor = parse_actor(&mut parts, "as actor")?;
            let command = parse_admin_command(&mut parts)?;
            Ok(SandboxCommand::Admin { actor, command })
        }
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Parses the administrative verb and its arguments. Both the short chat
/// aliases and the long names are accepted.
pub fn parse_admin_command(
    parts: &mut SplitWhitespace<'_>,
) -> Result<AdminCommand, CommandParseError> {
    let verb = parts
        .next()
        .map(|v| v.to_ascii_lowercase())
        .ok_or(CommandParseError::MissingArgument("admin command"))?;

    match verb.as_str() {
        "sethub" | "set-zone-center" => Ok(AdminCommand::SetZoneCenter),
        "setradius" | "set-zone-radius" => {
            let radius_str = parts
                .next()
                .ok_or(CommandParseError::MissingArgument("radius"))?;
            let radius = parse_i64(radius_str, "zone radius")?;
            Ok(AdminCommand::SetZoneRadius { radius })
        }
        "banitem" | "ban-held-item" => Ok(AdminCommand::BanHeldItem),
        "hubdebug" | "zone-debug" => Ok(AdminCommand::ZoneDebug),
        "hub" => Ok(AdminCommand::Hub),
        "cleaner" => Ok(AdminCommand::Cleaner),
        other => Err(CommandParseError::UnknownAdminCommand(other.to_string())),
    }
}

fn parse_actor(
    parts: &mut SplitWhitespace<'_>,
    context: &'static str,
) -> Result<ActorId, CommandParseError> {
    let value = parts
        .next()
        .ok_or(CommandParseError::MissingArgument(context))?;
    parse_u64(value, context).map(ActorId)
}

fn parse_position(
    parts: &mut SplitWhitespace<'_>,
    context: &'static str,
) -> Result<WorldPos, CommandParseError> {
    let mut axes = [0.0f64; 3];
    for axis in axes.iter_mut() {
        let value = parts
            .next()
            .ok_or(CommandParseError::MissingArgument(context))?;
        *axis = parse_f64(value, context)?;
    }
    Ok(WorldPos::from_array(axes))
}

fn parse_dimension(parts: &mut SplitWhitespace<'_>) -> String {
    parts.next().unwrap_or(OVERWORLD).to_ascii_lowercase()
}

fn parse_u32(value: &str, context: &'static str) -> Result<u32, CommandParseError> {
    value
        .parse::<u32>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_u64(value: &str, context: &'static str) -> Result<u64, CommandParseError> {
    value
        .parse::<u64>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_i64(value: &str, context: &'static str) -> Result<i64, CommandParseError> {
    value
        .parse::<i64>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_usize(value: &str, context: &'static str) -> Result<usize, CommandParseError> {
    value
        .parse::<usize>()
        .map_err(|source| CommandParseError::InvalidInteger {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_f32(value: &str, context: &'static str) -> Result<f32, CommandParseError> {
    value
        .parse::<f32>()
        .map_err(|source| CommandParseError::InvalidFloat {
            value: value.to_string(),
            context,
            source,
        })
}

fn parse_f64(value: &str, context: &'static str) -> Result<f64, CommandParseError> {
    value
        .parse::<f64>()
        .map_err(|source| CommandParseError::InvalidFloat {
            value: value.to_string(),
            context,
            source,
        })
}
