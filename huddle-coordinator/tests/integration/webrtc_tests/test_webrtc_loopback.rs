use std::sync::Arc;

use huddle_coordinator::{
    Coordinator, CoordinatorConfig, LinkState, TransportConfig, WebRtcNegotiatorFactory,
};

use crate::integration::init_tracing;
use crate::utils::{LoopbackRelay, pid, roster_frame, wait_for_link_state_within};

/// Timeout for connection establishment (ms).
const CONNECTION_TIMEOUT_MS: u64 = 10000;

#[tokio::test]
#[ignore = "opens UDP sockets and runs real ICE"]
async fn test_two_coordinators_connect_over_webrtc() {
    init_tracing();

    let transport = TransportConfig {
        ice_servers: Vec::new(),
        ..Default::default()
    };
    let relay = LoopbackRelay::default();

    let (coordinator_a, handle_a) = Coordinator::new(
        CoordinatorConfig::default(),
        Arc::new(WebRtcNegotiatorFactory::new(transport.clone()).expect("webrtc api")),
        Arc::new(relay.clone()),
    );
    let (coordinator_b, handle_b) = Coordinator::new(
        CoordinatorConfig::default(),
        Arc::new(WebRtcNegotiatorFactory::new(transport).expect("webrtc api")),
        Arc::new(relay.clone()),
    );
    relay.join(pid("a"), handle_a.clone()).await;
    relay.join(pid("b"), handle_b.clone()).await;
    tokio::spawn(coordinator_a.run());
    tokio::spawn(coordinator_b.run());

    // "a" joined first; "b" is told about it and offers.
    handle_a.deliver(roster_frame("a", &[])).await.unwrap();
    handle_b.deliver(roster_frame("b", &["a"])).await.unwrap();

    wait_for_link_state_within(&handle_b, &pid("a"), LinkState::Connected, CONNECTION_TIMEOUT_MS)
        .await
        .expect("Offerer never connected");
    wait_for_link_state_within(&handle_a, &pid("b"), LinkState::Connected, CONNECTION_TIMEOUT_MS)
        .await
        .expect("Answerer never connected");
}
