mod channel;

pub use channel::{
    ChannelEndpoint, ChannelReading, ControlChannel, INVALID_STATE_PAYLOAD, parse_state,
};
