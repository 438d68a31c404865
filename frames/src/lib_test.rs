use super::*;

fn sample_frame() -> Frame {
    Frame {
        id: "id-1".to_owned(),
        parent_id: Some("parent-1".to_owned()),
        ts: 42,
        room_id: Some("room-1".to_owned()),
        from: Some("user-1".to_owned()),
        syscall: DRAW_EVENT.to_owned(),
        status: Status::Request,
        data: serde_json::json!({
            "kind": "MOVE",
            "x": 12.5,
            "y": 40.0,
            "tool": "pen",
            "color": "#112233",
            "lineWidth": 5.0,
            "originUserId": "user-1"
        }),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("not the drawer")]
struct NotDrawer;

impl ErrorCode for NotDrawer {
    fn error_code(&self) -> &'static str {
        "E_NOT_DRAWER"
    }
}

// =============================================================
// Status
// =============================================================

#[test]
fn status_numeric_mapping_matches_wire_enum() {
    assert_eq!(Status::Request.as_i32(), 0);
    assert_eq!(Status::Done.as_i32(), 1);
    assert_eq!(Status::Error.as_i32(), 2);
    assert_eq!(Status::Cancel.as_i32(), 3);
    assert_eq!(Status::Item.as_i32(), 4);
}

#[test]
fn status_from_wire_rejects_out_of_range_value() {
    let err = Status::from_i32(99).expect_err("status should be invalid");
    assert!(matches!(err, CodecError::InvalidStatus(99)));
}

#[test]
fn status_serializes_as_lowercase_json() {
    assert_eq!(serde_json::to_string(&Status::Request).expect("serialize"), "\"request\"");
    assert!(serde_json::from_str::<Status>("\"Error\"").is_err());
}

// =============================================================
// Constructors and builders
// =============================================================

#[test]
fn request_sets_fields() {
    let frame = Frame::request(DRAW_HISTORY, serde_json::json!({})).with_room_id("room-9");
    assert_eq!(frame.syscall, "draw:history");
    assert_eq!(frame.status, Status::Request);
    assert_eq!(frame.room_id.as_deref(), Some("room-9"));
    assert!(frame.parent_id.is_none());
    assert_eq!(frame.ts, 0);
    assert!(!frame.id.is_empty());
}

#[test]
fn reply_inherits_context() {
    let req = Frame::request(DRAW_HISTORY, serde_json::json!({})).with_room_id("room-1");
    let reply = req.done_with(serde_json::json!({"events": []}));

    assert_eq!(reply.parent_id.as_deref(), Some(req.id.as_str()));
    assert_eq!(reply.room_id.as_deref(), Some("room-1"));
    assert_eq!(reply.syscall, DRAW_HISTORY);
    assert_eq!(reply.status, Status::Done);
    assert_ne!(reply.id, req.id);
}

#[test]
fn error_from_typed_carries_code_and_message() {
    let req = Frame::request(DRAW_EVENT, serde_json::json!({}));
    let err = req.error_from(&NotDrawer);

    assert_eq!(err.status, Status::Error);
    assert_eq!(err.data_str(FRAME_CODE), Some("E_NOT_DRAWER"));
    assert_eq!(err.data_str(FRAME_MESSAGE), Some("not the drawer"));
    assert_eq!(err.data.get(FRAME_RETRYABLE), Some(&serde_json::json!(false)));
}

#[test]
fn with_data_promotes_non_object_payload() {
    let frame = Frame::request(ROOM_JOIN, Value::Null).with_data("userId", "u-1");
    assert_eq!(frame.data, serde_json::json!({"userId": "u-1"}));
}

#[test]
fn prefix_extraction() {
    let frame = Frame::request(DRAW_CLEAR, serde_json::json!({}));
    assert_eq!(frame.prefix(), "draw");

    let frame = Frame::request("noseparator", serde_json::json!({}));
    assert_eq!(frame.prefix(), "noseparator");
}

// =============================================================
// JSON codec
// =============================================================

#[test]
fn json_round_trip_preserves_frame() {
    let frame = sample_frame();
    let text = encode_frame_json(&frame).expect("encode");
    assert_eq!(decode_frame_json(&text).expect("decode"), frame);
}

#[test]
fn json_decode_ignores_unknown_fields_and_defaults_optionals() {
    let text = r#"{"id":"a","syscall":"draw:history","status":"request","futureField":1}"#;
    let frame = decode_frame_json(text).expect("decode");
    assert_eq!(frame.room_id, None);
    assert_eq!(frame.ts, 0);
    assert_eq!(frame.data, serde_json::json!({}));
}

#[test]
fn json_decode_rejects_garbage() {
    let err = decode_frame_json("not json").expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

// =============================================================
// Protobuf codec
// =============================================================

#[test]
fn protobuf_round_trip_preserves_frame() {
    let frame = sample_frame();
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode should succeed");
    assert_eq!(decoded, frame);
}

#[test]
fn decode_frame_rejects_malformed_bytes() {
    let err = decode_frame(&[0xff, 0x00, 0x01]).expect_err("bytes should fail");
    assert!(matches!(err, CodecError::Decode(_)));
}

#[test]
fn decode_frame_rejects_invalid_wire_status() {
    let wire = WireFrame {
        id: "id-1".to_owned(),
        parent_id: None,
        ts: 1,
        room_id: None,
        from: None,
        syscall: DRAW_HISTORY.to_owned(),
        status: 77,
        data: Some(json_to_proto_value(&serde_json::json!({}))),
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let err = decode_frame(&bytes).expect_err("status should fail");
    assert!(matches!(err, CodecError::InvalidStatus(77)));
}

#[test]
fn decode_frame_defaults_missing_data_to_empty_object() {
    let wire = WireFrame {
        id: "id-1".to_owned(),
        parent_id: None,
        ts: 1,
        room_id: None,
        from: None,
        syscall: DRAW_HISTORY.to_owned(),
        status: Status::Request.as_i32(),
        data: None,
    };
    let mut bytes = Vec::new();
    wire.encode(&mut bytes).expect("encode");

    let frame = decode_frame(&bytes).expect("decode");
    assert_eq!(frame.data, serde_json::json!({}));
}

#[test]
fn history_payload_survives_protobuf_transport() {
    let req = Frame::request(DRAW_HISTORY, serde_json::json!({})).with_room_id("r");
    let reply = req.done_with(serde_json::json!({
        "events": [
            {"kind": "START", "x": 10.0, "y": 10.0, "tool": "pen", "lineWidth": 5.0},
            {"kind": "CLEAR"}
        ]
    }));

    let decoded = decode_frame(&encode_frame(&reply)).expect("decode");
    let events = decoded
        .data
        .get("events")
        .and_then(Value::as_array)
        .expect("events array");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].get("kind").and_then(Value::as_str), Some("CLEAR"));
}

#[test]
fn integer_json_numbers_are_normalized_to_float_numbers() {
    let frame = Frame::request(DRAW_EVENT, serde_json::json!({"x": 2}));
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.data.get("x"), Some(&serde_json::json!(2.0)));
}
