//! HTTP adapter: routing, handlers, and the server wrapper.

pub mod handlers;
pub mod server;

pub use server::HttpServer;
