//! Utility modules shared by the providers and the CLI.
//!
//! - [`HttpClient`]: reqwest client with a user agent and timeouts
//!
//! ```rust,no_run
//! use popcorn::utils::{HttpClient, DEFAULT_TIMEOUT};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::with_timeout(DEFAULT_TIMEOUT)?;
//! let _response = client.get("https://www.omdbapi.com/").send().await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::{HttpClient, DEFAULT_TIMEOUT};
