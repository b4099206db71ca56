pub mod app_config;
pub mod channel;
pub mod protocol;
pub mod session;
