mod relay_output;
mod ws_relay;

pub use relay_output::*;
pub use ws_relay::*;
