use huddle_core::IceServerConfig;

pub const DATA_CHANNEL_LABEL: &str = "GENERAL_DATA_CHANNEL";

/// Settings for the `webrtc` negotiation capability.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    pub data_channel_label: String,
    pub ordered: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServerConfig::default_stun(),
            data_channel_label: DATA_CHANNEL_LABEL.to_owned(),
            ordered: true,
        }
    }
}
