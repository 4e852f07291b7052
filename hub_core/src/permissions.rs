use std::collections::HashSet;

use bitflags::bitflags;
use hub_runtime::{ActorId, PermissionTags};

use crate::host::ActorHost;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionFlags: u8 {
        const OWNER = 1 << 0;
        const ADMIN = 1 << 1;
        const MODERATOR = 1 << 2;
        const HELPER = 1 << 3;
        const BROADCAST_MANAGER = 1 << 4;
        const HUB_MANAGER = 1 << 5;

        /// Exempt from every zone rule.
        const ZONE_BYPASS = Self::OWNER.bits() | Self::HUB_MANAGER.bits();
    }
}

/// Staff ranking; derived ordering is the rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Rank {
    #[default]
    None,
    Helper,
    Moderator,
    Admin,
    Owner,
}

impl Rank {
    /// Highest rank carried by a flag set. Manager flags carry no rank.
    pub fn from_flags(flags: PermissionFlags) -> Rank {
        if flags.contains(PermissionFlags::OWNER) {
            Rank::Owner
        } else if flags.contains(PermissionFlags::ADMIN) {
            Rank::Admin
        } else if flags.contains(PermissionFlags::MODERATOR) {
            Rank::Moderator
        } else if flags.contains(PermissionFlags::HELPER) {
            Rank::Helper
        } else {
            Rank::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    Owner,
    Admin,
    Moderator,
    Helper,
    BroadcastManager,
    HubManager,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 6] = [
        PermissionLevel::Owner,
        PermissionLevel::Admin,
        PermissionLevel::Moderator,
        PermissionLevel::Helper,
        PermissionLevel::BroadcastManager,
        PermissionLevel::HubManager,
    ];

    pub fn flag(self) -> PermissionFlags {
        match self {
            PermissionLevel::Owner => PermissionFlags::OWNER,
            PermissionLevel::Admin => PermissionFlags::ADMIN,
            PermissionLevel::Moderator => PermissionFlags::MODERATOR,
            PermissionLevel::Helper => PermissionFlags::HELPER,
            PermissionLevel::BroadcastManager => PermissionFlags::BROADCAST_MANAGER,
            PermissionLevel::HubManager => PermissionFlags::HUB_MANAGER,
        }
    }

    fn index(self) -> usize {
        match self {
            PermissionLevel::Owner => 0,
            PermissionLevel::Admin => 1,
            PermissionLevel::Moderator => 2,
            PermissionLevel::Helper => 3,
            PermissionLevel::BroadcastManager => 4,
            PermissionLevel::HubManager => 5,
        }
    }
}

/// Role-tag tables for every permission level.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    levels: [HashSet<String>; 6],
}

impl PermissionTable {
    pub fn from_tags(tags: &PermissionTags) -> Self {
        let set = |list: &Vec<String>| list.iter().cloned().collect::<HashSet<_>>();
        Self {
            levels: [
                set(&tags.owner),
                set(&tags.admin),
                set(&tags.moderator),
                set(&tags.helper),
                set(&tags.broadcast_manager),
                set(&tags.hub_manager),
            ],
        }
    }

    /// Resolves a tag list into the set of levels it grants. Tag order
    /// never matters.
    pub fn flags_of(&self, tags: &[String]) -> PermissionFlags {
        PermissionLevel::ALL
            .into_iter()
            .filter(|level| {
                let table = &self.levels[level.index()];
                tags.iter().any(|tag| table.contains(tag))
            })
            .fold(PermissionFlags::empty(), |acc, level| acc | level.flag())
    }

    pub fn has_permission(&self, tags: &[String], level: PermissionLevel) -> bool {
        self.flags_of(tags).contains(level.flag())
    }

    pub fn rank_of(&self, tags: &[String]) -> Rank {
        Rank::from_flags(self.flags_of(tags))
    }

    pub fn has_rank_at_least(&self, tags: &[String], rank: Rank) -> bool {
        self.rank_of(tags) >= rank
    }

    /// Hub managers and owners are exempt from every zone rule.
    pub fn can_bypass_zone(&self, tags: &[String]) -> bool {
        self.flags_of(tags).intersects(PermissionFlags::ZONE_BYPASS)
    }
}

/// Fetches an actor's role tags. A host failure resolves to no tags, which
/// means no permission and no bypass.
pub fn resolve_tags(host: &dyn ActorHost, actor: ActorId) -> Vec<String> {
    match host.tags(actor) {
        Ok(tags) => tags,
        Err(err) => {
            tracing::warn!(
                target: "hub::rules",
                %actor,
                error = %err,
                "permissions.tags_unavailable"
            );
            Vec::new()
        }
    }
}
