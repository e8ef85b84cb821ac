// Domain model shared with the transport layer.
//
// Records come from the backend verbatim; the core crate adds no wrappers.

pub use linkday_api::models::{
    Ack, ClickResult, CreateLinkRequest, Link, PublicProfile, RegisterRequest, Theme,
    UpdateLinkRequest, UpdateProfileRequest, User,
};
