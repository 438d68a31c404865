use super::*;

#[test]
fn new_session_has_no_drawer() {
    let session = RoomSession::new("room-1");
    assert_eq!(session.room_id(), "room-1");
    assert_eq!(session.drawer(), None);
    assert!(!session.is_drawer("alice"));
}

#[test]
fn becoming_drawer_shows_notice_once() {
    let mut session = RoomSession::new("room-1");

    let change = session.on_drawer_changed("alice", "alice").unwrap();

    assert!(change.became_drawer);
    assert!(change.show_notice);
    assert!(!change.lost_drawer);
    assert!(session.is_drawer("alice"));
}

#[test]
fn repeat_for_same_drawer_is_a_no_op() {
    let mut session = RoomSession::new("room-1");
    session.on_drawer_changed("alice", "alice");

    assert_eq!(session.on_drawer_changed("alice", "alice"), None);
    assert!(session.is_drawer("alice"));
}

#[test]
fn viewer_sees_change_without_notice() {
    let mut session = RoomSession::new("room-1");

    let change = session.on_drawer_changed("bob", "alice").unwrap();

    assert!(!change.became_drawer);
    assert!(!change.show_notice);
    assert!(!change.lost_drawer);
    assert_eq!(session.drawer(), Some("bob"));
}

#[test]
fn losing_the_role_is_reported() {
    let mut session = RoomSession::new("room-1");
    session.on_drawer_changed("alice", "alice");

    let change = session.on_drawer_changed("bob", "alice").unwrap();

    assert!(change.lost_drawer);
    assert!(!change.became_drawer);
}

#[test]
fn notice_returns_for_a_new_tenure() {
    let mut session = RoomSession::new("room-1");
    assert!(session.on_drawer_changed("alice", "alice").unwrap().show_notice);
    session.on_drawer_changed("bob", "alice");

    assert!(session.on_drawer_changed("alice", "alice").unwrap().show_notice);
}

#[test]
fn begin_game_forgets_the_drawer() {
    let mut session = RoomSession::new("room-1");
    session.on_drawer_changed("alice", "alice");

    session.begin_game();

    assert_eq!(session.drawer(), None);
    assert!(session.on_drawer_changed("alice", "alice").unwrap().show_notice);
}
