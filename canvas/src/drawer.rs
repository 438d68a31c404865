//! Drawer-change coordinator state for one room.
//!
//! A [`RoomSession`] is created when the engine enters a room and dropped when
//! it leaves. It tracks who holds the drawer role and whether the "you are now
//! drawer" notice has been shown for the current tenure.

#[cfg(test)]
#[path = "drawer_test.rs"]
mod drawer_test;

/// What a role-change notification means for the local participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleChange {
    /// The local participant just took the drawer role.
    pub became_drawer: bool,
    /// The local participant just lost the drawer role.
    pub lost_drawer: bool,
    /// Show the one-time drawer notice now.
    pub show_notice: bool,
}

/// Per-room drawer tenure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSession {
    room_id: String,
    drawer: Option<String>,
    notice_shown: bool,
}

impl RoomSession {
    #[must_use]
    pub fn new(room_id: impl Into<String>) -> Self {
        Self { room_id: room_id.into(), drawer: None, notice_shown: false }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Current drawer, if one has been announced.
    #[must_use]
    pub fn drawer(&self) -> Option<&str> {
        self.drawer.as_deref()
    }

    #[must_use]
    pub fn is_drawer(&self, user_id: &str) -> bool {
        self.drawer.as_deref() == Some(user_id)
    }

    /// Apply a `DRAWER_CHANGED` notification naming `new_drawer`.
    ///
    /// Returns `None` when the named drawer already holds the role: a repeat
    /// is not a tenure boundary, so nothing resets and no notice repeats.
    pub fn on_drawer_changed(&mut self, new_drawer: &str, local_user: &str) -> Option<RoleChange> {
        if self.drawer.as_deref() == Some(new_drawer) {
            return None;
        }
        let was_drawer = self.is_drawer(local_user);
        self.drawer = Some(new_drawer.to_owned());
        self.notice_shown = false;

        let became_drawer = new_drawer == local_user;
        let show_notice = became_drawer && self.take_notice();
        Some(RoleChange { became_drawer, lost_drawer: was_drawer && !became_drawer, show_notice })
    }

    /// A new game began; the next drawer tenure gets its notice again.
    pub fn begin_game(&mut self) {
        self.drawer = None;
        self.notice_shown = false;
    }

    fn take_notice(&mut self) -> bool {
        !std::mem::replace(&mut self.notice_shown, true)
    }
}
