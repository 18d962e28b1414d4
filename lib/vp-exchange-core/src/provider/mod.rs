pub mod event_channel;
pub mod http_client;
pub mod presentation_factory;
pub mod signer;
pub mod transport;
