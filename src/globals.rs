use std::sync::OnceLock;

/// Global HTTP client for all network requests
static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get a reference to the global HTTP client
/// Lazily initialized on first access
pub fn http_client() -> &'static reqwest::Client {
    HTTP_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client")
    })
}
