mod channel_host;

pub use channel_host::SessionChannelHost;
