// OS keyring credential backend.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use linkday_api::{CredentialStore, Error};

/// Keyring service name shared by every profile.
pub const KEYRING_SERVICE: &str = "linkday";

/// Stores the bearer token under `<profile>/token` in the system keyring.
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    account: String,
}

impl KeyringCredentialStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("{profile_name}/token"),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry, Error> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account).map_err(keyring_error)
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(keyring_error)?;
        debug!(account = %self.account, "credential stored in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

fn keyring_error(err: keyring::Error) -> Error {
    Error::CredentialStore(format!("keyring: {err}"))
}
