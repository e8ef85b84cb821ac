// Authentication endpoints
//
// Login and registration hand back `{ token, user }`; the token goes
// straight into the credential vault and only the user is returned.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, require};
use crate::error::Error;
use crate::models::{AuthPayload, RegisterRequest, User};

impl ApiClient {
    /// `POST /api/auth/login`
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, Error> {
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let envelope = self.send(Method::POST, &["api", "auth", "login"], &body).await?;
        let payload: AuthPayload = require(envelope, "login", "Login failed")?;
        self.adopt_token(payload.token)?;
        debug!(user = %payload.user.username, "login successful");
        Ok(payload.user)
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, Error> {
        let body = json!({
            "name": request.name,
            "email": request.email,
            "username": request.username,
            "password": request.password.expose_secret(),
        });
        let envelope = self
            .send(Method::POST, &["api", "auth", "register"], &body)
            .await?;
        let payload: AuthPayload = require(envelope, "register", "Registration failed")?;
        self.adopt_token(payload.token)?;
        debug!(user = %payload.user.username, "registration successful");
        Ok(payload.user)
    }

    /// `GET /api/auth/me`
    pub async fn current_user(&self) -> Result<User, Error> {
        let envelope = self.get(&["api", "auth", "me"]).await?;
        require(envelope, "current user", "Failed to get current user")
    }

    fn adopt_token(&self, token: Option<String>) -> Result<(), Error> {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.set_credential(Some(SecretString::from(token))),
            None => Ok(()),
        }
    }
}
