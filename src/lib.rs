//! Waiter: a static website server for quickly prototyping static sites.

pub mod logger;
pub mod server;
