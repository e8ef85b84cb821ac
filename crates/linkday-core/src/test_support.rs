// Fixtures for unit tests.

use chrono::{TimeZone, Utc};

use crate::model::{Link, Theme, User};

pub(crate) fn link(id: &str, order: u32) -> Link {
    let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).single().unwrap_or_default();
    Link {
        id: id.into(),
        user_id: "u1".into(),
        title: format!("Link {id}"),
        url: format!("https://{id}.example"),
        description: None,
        icon: None,
        order,
        clicks: 0,
        is_active: true,
        created_at: at,
        updated_at: at,
    }
}

pub(crate) fn link_with_clicks(id: &str, order: u32, clicks: u64) -> Link {
    Link {
        clicks,
        ..link(id, order)
    }
}

pub(crate) fn user(username: &str) -> User {
    let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).single().unwrap_or_default();
    User {
        id: "u1".into(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        username: username.into(),
        avatar: None,
        bio: None,
        theme: Theme::Light,
        is_active: true,
        created_at: at,
        updated_at: at,
    }
}
