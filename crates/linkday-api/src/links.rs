// Link collection endpoints (all bearer-authenticated).

use reqwest::Method;

use crate::client::{ApiClient, acknowledge, require};
use crate::error::Error;
use crate::models::{Ack, CreateLinkRequest, Link, ReorderRequest, UpdateLinkRequest};

impl ApiClient {
    /// `GET /api/links`
    pub async fn links(&self) -> Result<Vec<Link>, Error> {
        let envelope = self.get(&["api", "links"]).await?;
        require(envelope, "list links", "Failed to fetch links")
    }

    /// `POST /api/links`
    pub async fn create_link(&self, request: &CreateLinkRequest) -> Result<Link, Error> {
        let envelope = self.send(Method::POST, &["api", "links"], request).await?;
        require(envelope, "create link", "Failed to create link")
    }

    /// `PUT /api/links/:id`
    pub async fn update_link(&self, id: &str, request: &UpdateLinkRequest) -> Result<Link, Error> {
        let envelope = self.send(Method::PUT, &["api", "links", id], request).await?;
        require(envelope, "update link", "Failed to update link")
    }

    /// `DELETE /api/links/:id`
    pub async fn delete_link(&self, id: &str) -> Result<Ack, Error> {
        let envelope = self.send_empty(Method::DELETE, &["api", "links", id]).await?;
        acknowledge(envelope, "Failed to delete link")
    }

    /// `PATCH /api/links/reorder` with the full id sequence.
    pub async fn reorder_links(&self, link_ids: &[String]) -> Result<Ack, Error> {
        let body = ReorderRequest { link_ids };
        let envelope = self
            .send(Method::PATCH, &["api", "links", "reorder"], &body)
            .await?;
        acknowledge(envelope, "Failed to reorder links")
    }
}
