// Profile and public-page endpoints.

use reqwest::Method;
use serde_json::json;

use crate::client::{ApiClient, acknowledge, require};
use crate::error::Error;
use crate::models::{Ack, ClickResult, PublicProfile, UpdateProfileRequest, User};

impl ApiClient {
    /// `PUT /api/user/profile`
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, Error> {
        let envelope = self
            .send(Method::PUT, &["api", "user", "profile"], request)
            .await?;
        require(envelope, "update profile", "Failed to update profile")
    }

    /// `PUT /api/user/username`
    pub async fn update_username(&self, username: &str) -> Result<Ack, Error> {
        let body = json!({ "username": username });
        let envelope = self
            .send(Method::PUT, &["api", "user", "username"], &body)
            .await?;
        acknowledge(envelope, "Failed to update username")
    }

    /// `GET /u/:username` (no credential required).
    pub async fn public_profile(&self, username: &str) -> Result<PublicProfile, Error> {
        let envelope = self.get(&["u", username]).await?;
        require(envelope, "public profile", "Profile not found")
    }

    /// `POST /api/click/:id` (no credential required).
    pub async fn track_click(&self, link_id: &str) -> Result<ClickResult, Error> {
        let envelope = self.send_empty(Method::POST, &["api", "click", link_id]).await?;
        require(envelope, "track click", "Failed to track click")
    }
}
