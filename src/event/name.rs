//! Rename

use crate::client::{ClientInfo, Outbox};
use crate::error::AppError;
use crate::rooms::Rooms;

/// Change the acting user's display name
#[derive(Debug, Clone)]
pub struct Name {
    pub username: String,
}

impl Name {
    pub fn execute(
        self,
        rooms: &mut Rooms,
        current: &ClientInfo,
        outbox: &mut Outbox,
    ) -> Result<(), AppError> {
        let room = rooms.current_room(current.id)?;
        let user = room
            .users
            .get_mut(&current.id)
            .ok_or(AppError::NotRoomMember)?;
        user.name = self.username;
        room.notify_info_changed(outbox);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::testing::*;
    use crate::event::Event;

    #[tokio::test]
    async fn test_rename_broadcasts() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let (u2, mut rx2) = connect([10, 0, 0, 2]);
        enter(&mut rooms, &u1, "r").await;
        enter(&mut rooms, &u2, "r").await;
        drain(&mut rx2);

        let rename = Event::Name(Name {
            username: "Carol".into(),
        });
        run(&mut rooms, &u1, rename).await.unwrap();

        assert_eq!(room(&rooms, "r").users[&u1.id].name, "Carol");
        assert_eq!(room_infos(&drain(&mut rx2)), 1);
    }

    #[tokio::test]
    async fn test_rename_outside_room() {
        let mut rooms = Rooms::default();
        let (u1, _rx1) = connect([10, 0, 0, 1]);
        let rename = Event::Name(Name {
            username: "Carol".into(),
        });
        assert!(matches!(
            run(&mut rooms, &u1, rename).await,
            Err(AppError::NotInRoom)
        ));
    }
}
