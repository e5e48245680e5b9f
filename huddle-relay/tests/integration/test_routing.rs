use huddle_core::SignalMessage;

use crate::utils::{TestMember, init_tracing, offer_json, start_relay};

#[tokio::test]
async fn test_directed_frame_reaches_only_its_recipient() {
    init_tracing();
    let addr = start_relay().await.unwrap();

    let mut a = TestMember::join(addr, "room").await.unwrap();
    let mut b = TestMember::join(addr, "room").await.unwrap();
    let mut c = TestMember::join(addr, "room").await.unwrap();

    let frame = offer_json(&a.id, &c.id);
    c.send_text(frame.clone()).await.unwrap();

    assert_eq!(a.next_text().await.unwrap(), frame);
    b.expect_silence().await.unwrap();

    let reply = format!(
        r#"{{"type":"Answer","answer":{{"type":"answer","sdp":"v=0"}},"to":"{}","from":"{}"}}"#,
        c.id, a.id
    );
    a.send_text(reply).await.unwrap();

    let SignalMessage::Answer { to, from, .. } = c.next_message().await.unwrap() else {
        panic!("Expected an answer");
    };
    assert_eq!(to, c.id);
    assert_eq!(from, a.id);
}

#[tokio::test]
async fn test_bad_frames_are_dropped() {
    init_tracing();
    let addr = start_relay().await.unwrap();

    let mut a = TestMember::join(addr, "room").await.unwrap();
    let mut b = TestMember::join(addr, "room").await.unwrap();

    // Spoofed sender.
    b.send_text(offer_json(&a.id, &a.id)).await.unwrap();
    // Not JSON.
    b.send_text("hello").await.unwrap();
    // Unknown recipient.
    b.send_text(offer_json(&huddle_core::ParticipantId::generate(), &b.id))
        .await
        .unwrap();
    a.expect_silence().await.unwrap();

    // The socket stays usable afterwards.
    let frame = offer_json(&a.id, &b.id);
    b.send_text(frame.clone()).await.unwrap();
    assert_eq!(a.next_text().await.unwrap(), frame);
}
