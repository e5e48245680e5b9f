mod transport_config;
mod webrtc_negotiator;

pub use transport_config::*;
pub use webrtc_negotiator::*;
