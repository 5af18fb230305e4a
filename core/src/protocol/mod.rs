//! Helper protocol clients

pub mod client;
pub mod sessions;
pub mod stream;
