//! # MailHog Client
//! Asynchronous wrapper around the MailHog v2 HTTP API, providing simple methods to list and search captured email from Rust using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers whose integration tests send real email to a local MailHog instance: configure with [`ClientBuilder`], run the code under test, then query captured messages ([`Message`]) by sender, recipient or keyword and assert on their headers, body, and text/HTML parts.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, and the library issues one request at a time.
//!
//! ## Out of scope
//! Not an SMTP client, not a MailHog server, and not a mailbox manager. Messages are read-only; deleting or releasing them is left to MailHog's own API.
//!
//! ## Errors
//! A non-2xx response becomes [`Error::Status`] carrying the status code and reason phrase. Transport failures surface as [`Error::Request`], and bodies that do not match the expected shape surface as [`Error::Json`]. A query with no results is not an error: single-message lookups return `Ok(None)`.
//!
//! ## Example
//! ```no_run
//! use mailhog_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailhog_client::Error> {
//!     let client = Client::new("http://localhost")?;
//!
//!     if let Some(msg) = client.find_one_to("someone@example.com").await? {
//!         println!("Subject: {:?}", msg.subject());
//!         println!("HTML: {:?}", msg.html_part());
//!     }
//!
//!     for msg in client.find_from("noreply@example.com", Some(10)).await? {
//!         println!("{}: {:?}", msg.id(), msg.text_part());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;

pub use client::{Client, ClientBuilder, Criteria, DEFAULT_LIMIT, DEFAULT_PORT};
pub use error::Error;
pub use models::{Headers, Message, Messages, MimePart, RawContent, RawMessage, RawMime};

/// Result type alias for MailHog operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
