//! Owner moderation actions
//!
//! One event carries the action name and, for targeted actions, the id of the
//! user it applies to. Batch actions touch every user except the owner.

use std::str::FromStr;

use tracing::info;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::message::Outgoing;
use crate::rooms::Rooms;
use crate::types::ClientId;

/// Close reason sent to a kicked user
pub const KICKED_BY_OWNER: &str = "kickedByOwner";
/// Close reason sent to a banned user
pub const BANNED_BY_OWNER: &str = "bannedByOwner";

/// The moderation actions an owner can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerActionKind {
    EnableAll,
    DisableAll,
    StopShare,
    ToggleSharePermission,
    Kick,
    Ban,
}

impl OwnerActionKind {
    /// Whether the action applies to the whole room rather than one user
    pub fn is_batch(self) -> bool {
        matches!(self, OwnerActionKind::EnableAll | OwnerActionKind::DisableAll)
    }
}

impl FromStr for OwnerActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable_all" => Ok(OwnerActionKind::EnableAll),
            "disable_all" => Ok(OwnerActionKind::DisableAll),
            "stop_share" => Ok(OwnerActionKind::StopShare),
            "toggle_share_permission" => Ok(OwnerActionKind::ToggleSharePermission),
            "kick" => Ok(OwnerActionKind::Kick),
            "ban" => Ok(OwnerActionKind::Ban),
            other => Err(AppError::UnknownAction(other.to_string())),
        }
    }
}

/// Moderation request from the room owner
#[derive(Debug, Clone, Default)]
pub struct OwnerAction {
    pub action: String,
    pub target_user_id: String,
}

impl OwnerAction {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let room = rooms.current_room(current.id)?;
        let actor = room.users.get(&current.id).ok_or(AppError::NotRoomMember)?;
        if !actor.owner {
            return Err(AppError::NotOwner);
        }

        let kind = self.action.parse::<OwnerActionKind>();

        if let Ok(kind) = kind {
            if kind.is_batch() {
                let can_share = kind == OwnerActionKind::EnableAll;
                let others: Vec<ClientId> = room
                    .users
                    .keys()
                    .filter(|id| **id != current.id)
                    .copied()
                    .collect();
                for id in others {
                    let Some(user) = room.users.get_mut(&id) else {
                        continue;
                    };
                    user.can_share = can_share;
                    if !can_share && user.streaming {
                        room.stop_streaming(id, outbox);
                    }
                }
                info!("Owner {} set share permission to {} in room {}", current.id, can_share, room.id);
                room.notify_info_changed(outbox);
                return Ok(());
            }
        }

        if self.target_user_id.is_empty() {
            return Err(AppError::MissingTarget);
        }
        let target: ClientId = self
            .target_user_id
            .parse()
            .map_err(|_| AppError::InvalidTargetId)?;
        if !room.users.contains_key(&target) {
            return Err(AppError::TargetNotFound);
        }
        if target == current.id {
            return Err(AppError::SelfTarget);
        }

        let departed = match kind? {
            OwnerActionKind::StopShare => {
                if room.users[&target].streaming {
                    room.stop_streaming(target, outbox);
                    room.notify_info_changed(outbox);
                }
                false
            }
            OwnerActionKind::ToggleSharePermission => {
                let Some(user) = room.users.get_mut(&target) else {
                    return Err(AppError::TargetNotFound);
                };
                user.can_share = !user.can_share;
                if !user.can_share && user.streaming {
                    room.stop_streaming(target, outbox);
                }
                room.notify_info_changed(outbox);
                false
            }
            kind @ (OwnerActionKind::Kick | OwnerActionKind::Ban) => {
                let Some(user) = room.users.remove(&target) else {
                    return Err(AppError::TargetNotFound);
                };
                let reason = if kind == OwnerActionKind::Ban {
                    room.banned_ips.insert(user.addr);
                    info!("Client {} ({}) banned from room {}", target, user.addr, room.id);
                    BANNED_BY_OWNER
                } else {
                    info!("Client {} kicked from room {}", target, room.id);
                    KICKED_BY_OWNER
                };

                for session in room.close_sessions_of(target) {
                    if let Some(other) = session.other(target) {
                        room.notify_end_share(other, session.id, outbox);
                    }
                }
                outbox.push(&user.info, Outgoing::close(reason));
                room.notify_info_changed(outbox);
                true
            }
            OwnerActionKind::EnableAll | OwnerActionKind::DisableAll => false,
        };

        if departed {
            rooms.connected.remove(&target);
            rooms.user_left();
        }
        Ok(())
    }
}
