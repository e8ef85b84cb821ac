// linkday-api: Async Rust client for the LinkDay link-in-bio backend

pub mod auth;
pub mod client;
pub mod credential;
pub mod error;
pub mod links;
pub mod models;
pub mod navigate;
pub mod profile;
pub mod transport;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use credential::{
    COOKIE_NAME, CredentialStore, CredentialVault, FileCredentialStore, MemoryCredentialStore,
};
pub use error::Error;
pub use navigate::{LOGIN_PATH, Navigator, NoopNavigator, RecordingNavigator};
pub use transport::TransportConfig;
