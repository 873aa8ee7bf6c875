//! reqecho - HTTP/1.x request echo server
//!
//! Incremental request parsing over keep-alive connections, answering each
//! request with an HTML page describing it.

pub mod config;
pub mod http;
pub mod server;
