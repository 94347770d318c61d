//! Start and stop presenting

use tracing::info;

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::rooms::Rooms;
use crate::types::ClientId;

/// Start presenting to every other user in the room
#[derive(Debug, Clone, Copy, Default)]
pub struct Share;

/// Stop presenting
#[derive(Debug, Clone, Copy, Default)]
pub struct StopShare;

impl Share {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let ice_servers = rooms.ice_servers().to_vec();
        let room = rooms.current_room(current.id)?;
        let user = room.users.get(&current.id).ok_or(AppError::NotRoomMember)?;
        if !user.can_share {
            return Err(AppError::SharePermissionDenied);
        }

        // restarting a share replaces the previous sessions
        room.stop_streaming(current.id, outbox);
        if let Some(user) = room.users.get_mut(&current.id) {
            user.streaming = true;
        }

        let viewers: Vec<ClientId> = room
            .users
            .keys()
            .filter(|id| **id != current.id)
            .copied()
            .collect();
        for viewer in viewers {
            room.new_session(current.id, viewer, &ice_servers, outbox);
        }
        info!("Client {} started sharing in room {}", current.id, room.id);
        room.notify_info_changed(outbox);
        Ok(())
    }
}

impl StopShare {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let room = rooms.current_room(current.id)?;
        if !room.users.contains_key(&current.id) {
            return Err(AppError::NotRoomMember);
        }

        room.stop_streaming(current.id, outbox);
        info!("Client {} stopped sharing in room {}", current.id, room.id);
        room.notify_info_changed(outbox);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::testing::*;
    use crate::event::{Event, OwnerAction};

    #[tokio::test]
    async fn test_share_opens_session_per_viewer() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let (u2, _rx2) = connect([10, 0, 0, 2]);
        let (u3, _rx3) = connect([10, 0, 0, 3]);
        for u in [&u1, &u2, &u3] {
            enter(&mut rooms, u, "r").await;
        }

        run(&mut rooms, &u2, Event::Share(Share)).await.unwrap();

        let r = room(&rooms, "r");
        assert!(r.users[&u2.id].streaming);
        assert_eq!(r.sessions.len(), 2);
        assert!(r.sessions.values().all(|s| s.host == u2.id));
        assert_consistent(&rooms);
    }

    #[tokio::test]
    async fn test_share_alone_streams_without_sessions() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        enter(&mut rooms, &u1, "r").await;

        run(&mut rooms, &u1, Event::Share(Share)).await.unwrap();

        let r = room(&rooms, "r");
        assert!(r.users[&u1.id].streaming);
        assert!(r.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_share_again_replaces_sessions() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let (u2, mut rx2) = connect([10, 0, 0, 2]);
        enter(&mut rooms, &u1, "r").await;
        enter(&mut rooms, &u2, "r").await;
        run(&mut rooms, &u1, Event::Share(Share)).await.unwrap();
        let first: Vec<_> = room(&rooms, "r").sessions.keys().copied().collect();
        drain(&mut rx2);

        run(&mut rooms, &u1, Event::Share(Share)).await.unwrap();

        let r = room(&rooms, "r");
        assert_eq!(r.sessions.len(), 1);
        assert!(!r.sessions.contains_key(&first[0]));
        assert_eq!(end_shares(&drain(&mut rx2)), 1);
    }

    #[tokio::test]
    async fn test_share_without_permission() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let (u2, _rx2) = connect([10, 0, 0, 2]);
        enter(&mut rooms, &u1, "r").await;
        enter(&mut rooms, &u2, "r").await;
        let revoke = Event::OwnerAction(OwnerAction {
            action: "toggle_share_permission".into(),
            target_user_id: u2.id.to_string(),
        });
        run(&mut rooms, &u1, revoke).await.unwrap();

        let result = run(&mut rooms, &u2, Event::Share(Share)).await;

        assert!(matches!(result, Err(AppError::SharePermissionDenied)));
        let r = room(&rooms, "r");
        assert!(!r.users[&u2.id].streaming);
        assert!(r.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_stop_share_notifies_viewers() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let (u2, mut rx2) = connect([10, 0, 0, 2]);
        enter(&mut rooms, &u1, "r").await;
        enter(&mut rooms, &u2, "r").await;
        run(&mut rooms, &u1, Event::Share(Share)).await.unwrap();
        drain(&mut rx2);

        run(&mut rooms, &u1, Event::StopShare(StopShare)).await.unwrap();

        let r = room(&rooms, "r");
        assert!(!r.users[&u1.id].streaming);
        assert!(r.sessions.is_empty());
        let out = drain(&mut rx2);
        assert_eq!(end_shares(&out), 1);
        assert_eq!(room_infos(&out), 1);
    }

    #[tokio::test]
    async fn test_share_outside_room() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let result = run(&mut rooms, &u1, Event::Share(Share)).await;
        assert!(matches!(result, Err(AppError::NotInRoom)));
        let result = run(&mut rooms, &u1, Event::StopShare(StopShare)).await;
        assert!(matches!(result, Err(AppError::NotInRoom)));
    }
}
