use huddle_coordinator::{LinkEvent, LinkState};
use huddle_core::SignalMessage;

use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{expect_messages, expect_silence, pid, roster_frame};

#[tokio::test]
async fn test_roster_offers_to_everyone() {
    init_tracing();

    let mut t = create_test_coordinator();
    let mut events = t.handle.observer().subscribe();

    t.handle
        .deliver(roster_frame("a", &["b", "c", "a"]))
        .await
        .expect("Coordinator stopped");

    let sent = expect_messages(&mut t.sent_rx, 2)
        .await
        .expect("Expected two offers");
    expect_silence(&mut t.sent_rx).await.expect("Only offers expected");

    let mut recipients = Vec::new();
    for message in &sent {
        let SignalMessage::Offer { to, from, .. } = message else {
            panic!("Expected an offer, got {:?}", message);
        };
        assert_eq!(from, &pid("a"));
        recipients.push(to.clone());
    }
    recipients.sort();
    assert_eq!(recipients, vec![pid("b"), pid("c")]);

    assert_eq!(t.handle.local_id(), Some(pid("a")));
    let links = t.handle.links();
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|link| link.state == LinkState::OfferSent));

    assert_eq!(
        events.recv().await,
        Some(LinkEvent::LinkAdded { remote_id: pid("b") })
    );
    assert_eq!(
        events.recv().await,
        Some(LinkEvent::StateChanged {
            remote_id: pid("b"),
            from: LinkState::Initiating,
            to: LinkState::OfferSent,
        })
    );
}

#[tokio::test]
async fn test_roster_with_only_self_sends_nothing() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(roster_frame("a", &[])).await.unwrap();

    expect_silence(&mut t.sent_rx).await.expect("Nothing to offer");
    assert!(t.factory.created().is_empty());
}
