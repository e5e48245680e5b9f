use huddle_coordinator::{LinkEvent, LinkState, NegotiationEvent};
use huddle_core::TrackRef;

use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{expect_messages, expect_silence, pid, roster_frame, wait_for_link_state};

#[tokio::test]
async fn test_negotiation_failure_marks_link_failed() {
    init_tracing();

    let mut t = create_test_coordinator();
    t.factory.fail_on("create_offer");
    let mut events = t.handle.observer().subscribe();

    t.handle.deliver(roster_frame("a", &["b"])).await.unwrap();

    let mut failed = None;
    while let Some(event) = events.recv().await {
        if let LinkEvent::LinkFailed { remote_id, reason } = event {
            failed = Some((remote_id, reason));
            break;
        }
    }
    let (remote_id, reason) = failed.expect("Expected a LinkFailed event");
    assert_eq!(remote_id, pid("b"));
    assert!(reason.contains("create_offer"));

    let link = t.handle.observer().get(&pid("b")).unwrap();
    assert_eq!(link.state, LinkState::Failed);
    assert!(link.failure_reason.is_some());
    expect_silence(&mut t.sent_rx).await.unwrap();
}

#[tokio::test]
async fn test_refused_link_does_not_block_others() {
    init_tracing();

    let mut t = create_test_coordinator();
    t.factory.refuse(&pid("b"));
    let mut events = t.handle.observer().subscribe();

    t.handle
        .deliver(roster_frame("a", &["b", "c"]))
        .await
        .unwrap();

    let sent = expect_messages(&mut t.sent_rx, 1).await.unwrap();
    assert_eq!(sent[0].recipient(), Some(&pid("c")));
    expect_silence(&mut t.sent_rx).await.unwrap();

    assert_eq!(t.factory.created(), vec![pid("c")]);

    let refused = t.handle.observer().get(&pid("b")).expect("Refused link is observable");
    assert_eq!(refused.state, LinkState::Failed);
    assert!(refused.failure_reason.is_some_and(|reason| reason.contains("no transport")));

    let mut failed = None;
    while let Some(event) = events.recv().await {
        if let LinkEvent::LinkFailed { remote_id, .. } = event {
            failed = Some(remote_id);
            break;
        }
    }
    assert_eq!(failed, Some(pid("b")));
}

#[tokio::test]
async fn test_lost_connection_fails_link_and_keeps_track() {
    init_tracing();

    let mut t = create_test_coordinator();
    t.handle.deliver(roster_frame("a", &["b"])).await.unwrap();
    expect_messages(&mut t.sent_rx, 1).await.unwrap();

    let track = TrackRef {
        id: "audio-1".into(),
        stream_id: "stream-b".into(),
        kind: "audio".into(),
    };
    t.factory
        .emit(NegotiationEvent::RemoteTrack(pid("b"), track.clone()))
        .await;
    t.factory
        .emit(NegotiationEvent::ConnectionLost(pid("b")))
        .await;

    wait_for_link_state(&t.handle, &pid("b"), LinkState::Failed)
        .await
        .unwrap();
    let link = t.handle.observer().get(&pid("b")).unwrap();
    assert_eq!(link.inbound_track, Some(track));
    assert_eq!(link.failure_reason.as_deref(), Some("connection lost"));
    expect_silence(&mut t.sent_rx).await.unwrap();
}
