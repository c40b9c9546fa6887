pub mod fee_priority;
pub mod network;
pub mod send_config;
