// Hard navigation hook
//
// When the backend rejects the credential the client must send the user
// back to the login entry point. The front-end decides what that means.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Default login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Receives full-page navigation requests from the API client.
pub trait Navigator: Send + Sync + fmt::Debug {
    fn navigate(&self, path: &str);
}

/// Ignores navigation requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}

/// Records every navigation request, newest last.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
