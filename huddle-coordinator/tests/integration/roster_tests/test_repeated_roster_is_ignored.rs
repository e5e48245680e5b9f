use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{expect_messages, expect_silence, pid, roster_frame};

#[tokio::test]
async fn test_repeated_roster_is_ignored() {
    init_tracing();

    let mut t = create_test_coordinator();

    t.handle.deliver(roster_frame("a", &["b"])).await.unwrap();
    expect_messages(&mut t.sent_rx, 1).await.expect("Expected one offer");

    t.handle
        .deliver(roster_frame("z", &["b", "c"]))
        .await
        .unwrap();

    expect_silence(&mut t.sent_rx)
        .await
        .expect("A second roster must not trigger offers");
    assert_eq!(t.handle.local_id(), Some(pid("a")));
    assert_eq!(t.factory.created(), vec![pid("b")]);
}
