/// Channel sizing for a [`Coordinator`](crate::coordinator::Coordinator).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Relay frames buffered before `CoordinatorHandle::deliver` waits.
    pub inbound_capacity: usize,
    /// Negotiation events buffered before a capability callback waits.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 256,
            event_capacity: 256,
        }
    }
}
