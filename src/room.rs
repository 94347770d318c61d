//! Room struct definition
//!
//! A room holds its users, the sharing sessions between them, and the set of
//! banned addresses. Sessions reference users by id only, so a lookup miss
//! after a user is gone is a plain no-op.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::time::SystemTime;

use tracing::debug;

use crate::client::{ClientInfo, Outbox};
use crate::message::{IceServer, RoomUser, ServerMessage};
use crate::types::{ClientId, RoomId, SessionId};

/// A room member
#[derive(Debug)]
pub struct User {
    pub id: ClientId,
    pub name: String,
    /// Remote address (ban key)
    pub addr: IpAddr,
    pub owner: bool,
    pub can_share: bool,
    pub streaming: bool,
    /// Join order within the room, used for owner promotion
    pub joined: u64,
    /// Write capability for this user's connection
    pub info: ClientInfo,
}

/// One host → client sharing link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub host: ClientId,
    pub client: ClientId,
}

impl Session {
    /// The participant that is not `user`, if `user` takes part
    pub fn other(&self, user: ClientId) -> Option<ClientId> {
        if self.host == user {
            Some(self.client)
        } else if self.client == user {
            Some(self.host)
        } else {
            None
        }
    }
}

/// Screen sharing room
///
/// A non-empty room has exactly one owner. Empty rooms are removed by the
/// registry as soon as the last user is gone.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub users: HashMap<ClientId, User>,
    pub sessions: HashMap<SessionId, Session>,
    pub banned_ips: HashSet<IpAddr>,
    next_join: u64,
    pub created_at: SystemTime,
}

impl Room {
    /// Create an empty room
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            users: HashMap::new(),
            sessions: HashMap::new(),
            banned_ips: HashSet::new(),
            next_join: 0,
            created_at: SystemTime::now(),
        }
    }

    /// Add a user for the given connection
    pub fn add_user(&mut self, info: &ClientInfo, name: String, owner: bool) {
        let joined = self.next_join;
        self.next_join += 1;
        self.users.insert(
            info.id,
            User {
                id: info.id,
                name,
                addr: info.addr,
                owner,
                can_share: true,
                streaming: false,
                joined,
                info: info.clone(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn is_banned(&self, addr: &IpAddr) -> bool {
        self.banned_ips.contains(addr)
    }

    /// Current owner, if any
    pub fn owner(&self) -> Option<ClientId> {
        self.users.values().find(|u| u.owner).map(|u| u.id)
    }

    /// Hand ownership to the longest-tenured remaining user
    ///
    /// Returns the new owner, or None when the room is empty.
    pub fn promote_owner(&mut self) -> Option<ClientId> {
        let next = self.users.values_mut().min_by_key(|u| u.joined)?;
        next.owner = true;
        Some(next.id)
    }

    /// Open a session from `host` to `client` and tell both ends
    pub fn new_session(
        &mut self,
        host: ClientId,
        client: ClientId,
        ice_servers: &[IceServer],
        outbox: &mut Outbox,
    ) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(id, Session { id, host, client });
        debug!("Session {} opened in room {}: {} -> {}", id, self.id, host, client);

        if let Some(user) = self.users.get(&host) {
            outbox.push(
                &user.info,
                ServerMessage::HostSession {
                    id,
                    peer: client,
                    ice_servers: ice_servers.to_vec(),
                },
            );
        }
        if let Some(user) = self.users.get(&client) {
            outbox.push(
                &user.info,
                ServerMessage::ClientSession {
                    id,
                    peer: host,
                    ice_servers: ice_servers.to_vec(),
                },
            );
        }
        id
    }

    /// Remove a session
    ///
    /// Does not notify anyone; callers tell the participants.
    pub fn close_session(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        debug!("Session {} closed in room {}", id, self.id);
        Some(session)
    }

    /// Remove every session matching `pred`
    fn close_sessions_where(&mut self, pred: impl Fn(&Session) -> bool) -> Vec<Session> {
        let ids: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|s| pred(*s))
            .map(|s| s.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.close_session(id))
            .collect()
    }

    /// Remove every session hosted by `host`
    pub fn close_hosted_sessions(&mut self, host: ClientId) -> Vec<Session> {
        self.close_sessions_where(|s| s.host == host)
    }

    /// Remove every session `user` takes part in, as host or client
    pub fn close_sessions_of(&mut self, user: ClientId) -> Vec<Session> {
        self.close_sessions_where(|s| s.host == user || s.client == user)
    }

    /// Queue an end-of-share notice to `user` if they are still present
    pub fn notify_end_share(&self, user: ClientId, sid: SessionId, outbox: &mut Outbox) {
        if let Some(user) = self.users.get(&user) {
            outbox.push(&user.info, ServerMessage::EndShare { sid });
        }
    }

    /// Clear `host`'s streaming flag and end every session they host
    ///
    /// Both ends of each closed session that are still in the room are told.
    pub fn stop_streaming(&mut self, host: ClientId, outbox: &mut Outbox) {
        if let Some(user) = self.users.get_mut(&host) {
            user.streaming = false;
        }
        for session in self.close_hosted_sessions(host) {
            self.notify_end_share(session.host, session.id, outbox);
            self.notify_end_share(session.client, session.id, outbox);
        }
    }

    /// Room state as seen by `viewer`
    pub fn info_for(&self, viewer: ClientId) -> ServerMessage {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_key(|u| u.joined);
        ServerMessage::Room {
            id: self.id.clone(),
            users: users
                .into_iter()
                .map(|u| RoomUser {
                    id: u.id,
                    name: u.name.clone(),
                    streaming: u.streaming,
                    you: u.id == viewer,
                    owner: u.owner,
                    can_share: u.can_share,
                })
                .collect(),
        }
    }

    /// Broadcast the current room state to every user
    pub fn notify_info_changed(&self, outbox: &mut Outbox) {
        for user in self.users.values() {
            outbox.push(&user.info, self.info_for(user.id));
        }
    }
}
