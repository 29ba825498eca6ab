//! HTTP server for the rate limit API.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use super::handlers::{self, AppState};
use crate::error::Result;
use crate::ratelimit::RateLimiter;

/// HTTP server exposing the rate limit API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The rate limiter instance
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, limiter: Arc<RateLimiter>) -> Self {
        Self { addr, limiter }
    }

    /// Build the API router around a limiter instance.
    pub fn router(limiter: Arc<RateLimiter>) -> Router {
        Router::new()
            .route("/api/data", get(handlers::get_data))
            .route("/api/rate-limit-status", get(handlers::get_status))
            .route("/api/reset-rate-limit", post(handlers::reset_limit))
            .route("/health", get(handlers::health))
            .with_state(AppState { limiter })
    }

    /// Start the server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, "Starting HTTP server for the rate limit API");

        axum::serve(listener, Self::router(self.limiter)).await?;
        Ok(())
    }

    /// Start the server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(
            addr = %self.addr,
            "Starting HTTP server for the rate limit API with graceful shutdown"
        );

        axum::serve(listener, Self::router(self.limiter))
            .with_graceful_shutdown(signal)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::LimitRules;

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:3001".parse().unwrap();
        let limiter = Arc::new(RateLimiter::new(LimitRules::default()));
        let _server = HttpServer::new(addr, limiter);
    }
}
