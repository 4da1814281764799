//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client so every generation request
//! reuses pooled connections and TLS sessions.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for generative text API calls
///
/// - 60s timeout; summaries of long transcripts can take a while
/// - 90s idle timeout to balance resource usage and performance
pub static GENERATION_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to create generation HTTP client")
});

/// Get the global generation HTTP client
#[inline]
pub fn generation_client() -> &'static Client {
    &GENERATION_CLIENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_same_instance() {
        let client1 = generation_client();
        let client2 = generation_client();
        assert!(std::ptr::eq(client1, client2));
    }
}
