pub mod config;
pub mod copy;
pub mod origin;
pub mod session;
