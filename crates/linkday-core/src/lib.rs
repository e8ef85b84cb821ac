//! Reactive client-side state for LinkDay front-ends (CLI today).
//!
//! Sits between `linkday-api` and the presentation layer:
//!
//! - **[`Linkday`]**: facade wiring one [`ApiClient`](linkday_api::ApiClient)
//!   to the stores and vending the route guards.
//!
//! - **[`SessionStore`]**: who is signed in. Login, registration,
//!   revalidation and logout are observable transitions over a `watch`
//!   channel, persisted (identity only) through a [`SessionPersistence`].
//!
//! - **[`LinkStore`]**: the signed-in user's links, kept in a `DashMap`
//!   with an ordered snapshot. Mutations touch only the records a response
//!   concerns; [`LinkStream`] exposes `current()` / `latest()` / `changed()`.
//!
//! - **Guards** ([`guard`]): the edge cookie check, the auth-pages redirect
//!   and the protected-view mount/render decisions.
//!
//! - **Fencing** ([`fence`]): every action takes a `CancellationToken` and a
//!   per-entity ticket, so late or cancelled responses never overwrite newer
//!   state.

pub mod analytics;
pub mod app;
pub mod config;
pub mod error;
pub mod fence;
pub mod guard;
pub mod model;
pub mod persist;
pub mod session;
pub mod store;
pub mod stream;
pub mod validation;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use analytics::{AnalyticsSummary, DashboardOverview};
pub use app::Linkday;
pub use config::{ClientConfig, DEFAULT_APP_URL, Routes};
pub use error::CoreError;
pub use guard::{AuthPagesGuard, EdgeDecision, EdgeGuard, Entry, GuardView, MountAction, ProtectedGuard};
pub use persist::{
    FileSessionPersistence, MemorySessionPersistence, PersistedSession, SESSION_FILE,
    SessionPersistence,
};
pub use session::{SessionPhase, SessionState, SessionStore};
pub use store::{LinkSnapshot, LinkStore, StoreStatus};
pub use stream::LinkStream;

pub use model::{
    Ack, ClickResult, CreateLinkRequest, Link, PublicProfile, RegisterRequest, Theme,
    UpdateLinkRequest, UpdateProfileRequest, User,
};

pub use tokio_util::sync::CancellationToken;
