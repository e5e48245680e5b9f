use huddle_coordinator::{LinkState, NegotiationEvent};
use huddle_core::{SdpKind, SignalMessage};

use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{
    answer_frame, expect_messages, expect_silence, offer_frame, pid, roster_frame,
    wait_for_link_state,
};

#[tokio::test]
async fn test_offer_without_link_is_answered_once() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(offer_frame("y", "x")).await.unwrap();

    let sent = expect_messages(&mut t.sent_rx, 1).await.expect("Expected an answer");
    let SignalMessage::Answer { answer, to, from } = &sent[0] else {
        panic!("Expected an answer, got {:?}", sent[0]);
    };
    assert_eq!(answer.kind, SdpKind::Answer);
    assert_eq!(to, &pid("x"));
    assert_eq!(from, &pid("y"));
    expect_silence(&mut t.sent_rx).await.unwrap();

    wait_for_link_state(&t.handle, &pid("x"), LinkState::AnswerSent)
        .await
        .unwrap();
    assert_eq!(
        t.factory.calls_for(&pid("x")),
        vec!["set_remote:Offer", "create_answer", "set_local:Answer"]
    );
    // No roster has arrived, so no self id is assigned.
    assert_eq!(t.handle.local_id(), None);
}

#[tokio::test]
async fn test_offerer_reaches_connected() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(roster_frame("a", &["b"])).await.unwrap();
    expect_messages(&mut t.sent_rx, 1).await.unwrap();

    t.handle.deliver(answer_frame("a", "b")).await.unwrap();
    wait_for_link_state(&t.handle, &pid("b"), LinkState::AnswerReceived)
        .await
        .unwrap();

    t.factory
        .emit(NegotiationEvent::DataChannelOpen(pid("b")))
        .await;
    wait_for_link_state(&t.handle, &pid("b"), LinkState::Connected)
        .await
        .unwrap();

    let link = t.handle.observer().get(&pid("b")).unwrap();
    assert!(link.data_channel_established);
}

#[tokio::test]
async fn test_answer_for_unknown_peer_is_dropped() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(roster_frame("a", &[])).await.unwrap();
    t.handle.deliver(answer_frame("a", "ghost")).await.unwrap();

    expect_silence(&mut t.sent_rx).await.unwrap();
    assert!(t.handle.links().is_empty());
}

#[tokio::test]
async fn test_second_offer_on_answered_link_is_answered_again() {
    init_tracing();

    let mut t = create_test_coordinator();

    // "y" sorts after "x", so it gives up its side of the exchange.
    t.handle.deliver(roster_frame("y", &[])).await.unwrap();
    t.handle.deliver(offer_frame("y", "x")).await.unwrap();
    expect_messages(&mut t.sent_rx, 1).await.unwrap();
    wait_for_link_state(&t.handle, &pid("x"), LinkState::AnswerSent)
        .await
        .unwrap();

    t.handle.deliver(offer_frame("y", "x")).await.unwrap();

    let sent = expect_messages(&mut t.sent_rx, 1)
        .await
        .expect("Expected a second answer");
    assert!(matches!(&sent[0], SignalMessage::Answer { to, .. } if to == &pid("x")));
    expect_silence(&mut t.sent_rx).await.unwrap();

    assert_eq!(t.factory.created(), vec![pid("x")]);
    let calls = t.factory.calls_for(&pid("x"));
    assert_eq!(calls.iter().filter(|c| *c == "create_answer").count(), 2);
    assert!(!calls.contains(&"set_local:Rollback".to_owned()));
    assert_eq!(
        t.handle.observer().get(&pid("x")).map(|link| link.state),
        Some(LinkState::AnswerSent)
    );
}

#[tokio::test]
async fn test_second_offer_on_answered_link_is_ignored_by_smaller_id() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(roster_frame("a", &[])).await.unwrap();
    t.handle.deliver(offer_frame("a", "b")).await.unwrap();
    expect_messages(&mut t.sent_rx, 1).await.unwrap();

    t.handle.deliver(offer_frame("a", "b")).await.unwrap();

    expect_silence(&mut t.sent_rx).await.unwrap();
    let calls = t.factory.calls_for(&pid("b"));
    assert_eq!(calls.iter().filter(|c| *c == "create_answer").count(), 1);
    assert_eq!(
        t.handle.observer().get(&pid("b")).map(|link| link.state),
        Some(LinkState::AnswerSent)
    );
}
