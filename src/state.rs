//! Shared server state
//!
//! Built once at startup and passed by reference into every connection;
//! nothing in here mutates afterwards, which is what keeps connections
//! independent of each other.

use crate::config::Config;
use crate::share::ShareRoot;

#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub root: ShareRoot,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, root: ShareRoot) -> Self {
        Self { config, root }
    }
}
