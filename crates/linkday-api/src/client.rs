// LinkDay HTTP client
//
// Wraps `reqwest::Client` with bearer credential attachment, envelope
// unwrapping and 401 handling. Endpoint groups (auth, links, profile)
// are inherent methods in sibling modules to keep this file focused on
// transport mechanics.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::credential::{CredentialStore, CredentialVault};
use crate::error::Error;
use crate::models::{Ack, Envelope, ErrorBody};
use crate::navigate::{LOGIN_PATH, Navigator, NoopNavigator};
use crate::transport::TransportConfig;

/// Backend base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Message used when a failed response carries none of its own.
const FALLBACK_MESSAGE: &str = "Something went wrong";

/// Async client for the LinkDay backend.
///
/// The single point of outbound communication: it owns the credential
/// vault, attaches `Authorization: Bearer` when a token is held, and on a
/// 401 clears the credential and asks the [`Navigator`] to go to login.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    vault: CredentialVault,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("vault", &self.vault)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url`, rehydrating the credential from `store`.
    pub fn new(
        base_url: Url,
        store: Arc<dyn CredentialStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let vault = CredentialVault::open(store, Arc::clone(&transport.cookie_jar), base_url.clone())?;
        Ok(Self {
            http,
            base_url,
            vault,
            navigator: Arc::new(NoopNavigator),
            login_path: LOGIN_PATH.into(),
        })
    }

    /// Route 401 navigations to `navigator`.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Override the login entry point used on 401.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Read-only view of the credential copies.
    pub fn credentials(&self) -> &CredentialVault {
        &self.vault
    }

    /// Store or clear the bearer credential (memory, durable store, cookie).
    pub fn set_credential(&self, token: Option<SecretString>) -> Result<(), Error> {
        self.vault.set(token)
    }

    /// Whether a durable credential exists.
    pub fn has_credential(&self) -> bool {
        self.vault.has_durable()
    }

    /// Local-only logout: drops the credential, no network call.
    pub fn logout(&self) -> Result<(), Error> {
        debug!("logging out locally");
        self.set_credential(None)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("GET {url}");
        self.execute(Method::GET, url, None::<&()>).await
    }

    pub(crate) async fn send<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("{method} {url}");
        self.execute(method, url, Some(body)).await
    }

    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(segments)?;
        debug!("{method} {url}");
        self.execute(method, url, None::<&()>).await
    }

    /// Issue the request and parse the envelope, whatever the status.
    async fn execute<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<Envelope<T>, Error> {
        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(token) = self.vault.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let resp = builder.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "request failed before a response arrived");
            Error::Network(e)
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            error!(%method, %url, error = %e, "failed to read response body");
            Error::Network(e)
        })?;

        if !status.is_success() {
            return Err(self.fail(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            let preview = text.chars().take(200).collect::<String>();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: text.clone(),
            }
        })
    }

    /// Turn a non-2xx response into an error, clearing the credential on 401.
    fn fail(&self, status: StatusCode, text: &str) -> Error {
        let parsed: ErrorBody = serde_json::from_str(text).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.into());

        if status == StatusCode::UNAUTHORIZED {
            warn!("credential rejected (HTTP 401), returning to login");
            if let Err(e) = self.vault.set(None) {
                warn!(error = %e, "failed to clear durable credential");
            }
            self.navigator.navigate(&self.login_path);
            return Error::Unauthorized { message };
        }

        debug!(status = status.as_u16(), %message, "request failed");
        Error::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }
}

// ── Envelope unwrapping ─────────────────────────────────────────────

/// Unwrap an envelope whose `data` is mandatory.
pub(crate) fn require<T>(
    envelope: Envelope<T>,
    operation: &'static str,
    fallback: &str,
) -> Result<T, Error> {
    if !envelope.success {
        return Err(Error::Rejected {
            message: envelope.server_message().unwrap_or(fallback).to_owned(),
        });
    }
    envelope.data.ok_or(Error::MissingData { operation })
}

/// Unwrap an acknowledgement envelope; `data` may be omitted.
pub(crate) fn acknowledge(envelope: Envelope<Ack>, fallback: &str) -> Result<Ack, Error> {
    if !envelope.success {
        return Err(Error::Rejected {
            message: envelope.server_message().unwrap_or(fallback).to_owned(),
        });
    }
    Ok(envelope.data.unwrap_or_else(|| Ack {
        success: true,
        message: envelope.message.unwrap_or_default(),
    }))
}
