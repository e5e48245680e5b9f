pub mod durability_tests;
pub mod offer_tests;
pub mod roster_tests;
pub mod webrtc_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Level;

use huddle_coordinator::{Coordinator, CoordinatorConfig, CoordinatorHandle};
use huddle_core::SignalMessage;

use crate::utils::{MockNegotiationFactory, MockRelayOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct TestCoordinator {
    pub handle: CoordinatorHandle,
    pub relay: MockRelayOutput,
    pub sent_rx: mpsc::UnboundedReceiver<SignalMessage>,
    pub factory: MockNegotiationFactory,
    pub task: JoinHandle<()>,
}

pub fn create_test_coordinator() -> TestCoordinator {
    let factory = MockNegotiationFactory::new();
    let (relay, sent_rx) = MockRelayOutput::new();

    let (coordinator, handle) = Coordinator::new(
        CoordinatorConfig::default(),
        Arc::new(factory.clone()),
        Arc::new(relay.clone()),
    );

    let task = tokio::spawn(async move {
        coordinator.run().await;
    });

    TestCoordinator {
        handle,
        relay,
        sent_rx,
        factory,
        task,
    }
}
