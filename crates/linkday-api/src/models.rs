// Wire types for the LinkDay backend.
//
// Every response is wrapped in an `Envelope`. Identity fields arrive as
// Mongo-style `_id` strings; `id` is accepted as an alias so records
// persisted by this crate round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── Envelope ────────────────────────────────────────────────────────

/// The `{ success, message?, data? }` wrapper every backend response uses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    /// Some error responses use `error` instead of `message`.
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The server-provided message, preferring `message` over `error`.
    pub fn server_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.is_empty())
    }
}

/// Error-shaped body, parsed from non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

// ── User ────────────────────────────────────────────────────────────

/// Public page theme chosen by the user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Colorful,
}

/// Identity record of an account, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Link ────────────────────────────────────────────────────────────

/// One outbound link on a user's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

// ── Auth payloads ───────────────────────────────────────────────────

/// `data` of a successful login or registration.
#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    #[serde(default)]
    pub token: Option<String>,
    pub user: User,
}

/// Fields required to create an account. The password is serialized
/// by the client at request time, never stored here in plain form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: secrecy::SecretString,
}

// ── Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.theme.is_none() && self.avatar.is_none()
    }
}

/// Plain `{ success, message }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ── Links ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateLinkRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderRequest<'a> {
    pub link_ids: &'a [String],
}

// ── Public surface ──────────────────────────────────────────────────

/// A visitor's view of someone's page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user: User,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl PublicProfile {
    /// Links a visitor actually sees: active ones, in display order.
    pub fn visible_links(&self) -> Vec<&Link> {
        let mut links: Vec<&Link> = self.links.iter().filter(|l| l.is_active).collect();
        links.sort_by_key(|l| l.order);
        links
    }
}

/// Result of registering a click on a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub redirect_url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link_json(id: &str, order: u32, active: bool) -> serde_json::Value {
        json!({
            "_id": id,
            "userId": "u1",
            "title": id,
            "url": format!("https://{id}.example"),
            "order": order,
            "clicks": 0,
            "isActive": active,
            "createdAt": "2024-06-15T10:30:00Z",
            "updatedAt": "2024-06-15T10:30:00Z"
        })
    }

    #[test]
    fn user_accepts_mongo_id_and_plain_id() {
        let mongo: User = serde_json::from_value(json!({
            "_id": "abc",
            "name": "Ada",
            "email": "ada@example.com",
            "username": "ada",
            "theme": "colorful",
            "isActive": true,
            "createdAt": "2024-06-15T10:30:00Z",
            "updatedAt": "2024-06-15T10:30:00Z"
        }))
        .unwrap();
        assert_eq!(mongo.id, "abc");
        assert_eq!(mongo.theme, Theme::Colorful);

        let round: User = serde_json::from_str(&serde_json::to_string(&mongo).unwrap()).unwrap();
        assert_eq!(round, mongo);
    }

    #[test]
    fn link_defaults_to_active() {
        let mut raw = link_json("a", 0, true);
        raw.as_object_mut().unwrap().remove("isActive");
        let link: Link = serde_json::from_value(raw).unwrap();
        assert!(link.is_active);
        assert_eq!(link.clicks, 0);
    }

    #[test]
    fn public_profile_hides_inactive_and_sorts_by_order() {
        let profile: PublicProfile = serde_json::from_value(json!({
            "user": {
                "_id": "u1", "name": "Ada", "email": "a@example.com", "username": "ada",
                "createdAt": "2024-06-15T10:30:00Z", "updatedAt": "2024-06-15T10:30:00Z"
            },
            "links": [link_json("c", 2, true), link_json("b", 1, false), link_json("a", 0, true)]
        }))
        .unwrap();

        let ids: Vec<&str> = profile.visible_links().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn update_link_serializes_only_set_fields() {
        let patch = UpdateLinkRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "isActive": false })
        );
    }

    #[test]
    fn theme_parses_from_str() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(Theme::Colorful.to_string(), "colorful");
    }
}
