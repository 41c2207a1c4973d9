//! Opt-out diagnostic sink shared by the auth, store and ranking layers.
//! Events are plain `tracing` events; a disabled logger drops them before they
//! reach the subscriber. Nothing here feeds back into control flow.

use tracing::{debug, info, warn};

/// Human-readable messages emitted by the client.
pub mod messages {
    pub const PREFIX: &str = "[Ranking Builder]";
    pub const AN_ERROR_OCCURRED: &str = "an error occured.";
    pub const PLEASE_AUTH_USER: &str = "please, authenticate user.";
    pub const PLEASE_INSERT_CORRECT_USERID: &str = "please, insert a correct userId.";
    pub const USER_CREATED: &str = "user created.";
    pub const USER_CREATED_FAIL: &str = "an error occurred while creating the user.";
    pub const USER_UPDATED: &str = "user updated.";
    pub const USER_UPDATED_FAIL: &str = "an error occurred while updating the user.";
    pub const USER_DELETED: &str = "user deleted.";
    pub const USER_DELETED_FAIL: &str = "an error occurred while deleting the user.";
    pub const USER_GET_FAIL: &str = "an error occurred while getting user.";
    pub const USER_LIST_FAIL: &str = "an error occurred while listing users.";
    pub const USER_DOES_NOT_HAVE_PERMISSION: &str = "user does not have permission to update data.";
    pub const USER_IS_AUTH: &str = "user is authenticated.";
    pub const USER_IS_ANONYMOUS: &str = "user is authenticated anonymously.";
    pub const USER_IS_NOT_AUTH: &str = "user is not authenticated.";
    pub const USER_SIGNED_OUT: &str = "user is not authenticated anymore.";
    pub const USER_IS_NOT_AUTH_FAIL: &str = "an error occured and the user is still authenticated.";
}

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    enabled: bool,
}

impl Default for Logger {
    fn default() -> Self { Self { enabled: true } }
}

impl Logger {
    pub fn new(disable_log: bool) -> Self { Self { enabled: !disable_log } }

    pub fn disabled() -> Self { Self { enabled: false } }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn info(&self, area: Area, msg: &str) {
        if !self.enabled { return; }
        match area {
            Area::Auth => info!(target: "ranking_builder::auth", "{} {}", messages::PREFIX, msg),
            Area::Store => info!(target: "ranking_builder::store", "{} {}", messages::PREFIX, msg),
            Area::Ranking => info!(target: "ranking_builder::ranking", "{} {}", messages::PREFIX, msg),
        }
    }

    /// Log a message tagged with the record id it concerns.
    pub fn info_id(&self, area: Area, msg: &str, id: &str) {
        if !self.enabled { return; }
        match area {
            Area::Auth => info!(target: "ranking_builder::auth", id = %id, "{} {}", messages::PREFIX, msg),
            Area::Store => info!(target: "ranking_builder::store", id = %id, "{} {}", messages::PREFIX, msg),
            Area::Ranking => info!(target: "ranking_builder::ranking", id = %id, "{} {}", messages::PREFIX, msg),
        }
    }

    pub fn warn(&self, area: Area, msg: &str, cause: &dyn std::fmt::Display) {
        if !self.enabled { return; }
        match area {
            Area::Auth => warn!(target: "ranking_builder::auth", cause = %cause, "{} {}", messages::PREFIX, msg),
            Area::Store => warn!(target: "ranking_builder::store", cause = %cause, "{} {}", messages::PREFIX, msg),
            Area::Ranking => warn!(target: "ranking_builder::ranking", cause = %cause, "{} {}", messages::PREFIX, msg),
        }
    }

    pub fn debug(&self, area: Area, msg: &str) {
        if !self.enabled { return; }
        match area {
            Area::Auth => debug!(target: "ranking_builder::auth", "{} {}", messages::PREFIX, msg),
            Area::Store => debug!(target: "ranking_builder::store", "{} {}", messages::PREFIX, msg),
            Area::Ranking => debug!(target: "ranking_builder::ranking", "{} {}", messages::PREFIX, msg),
        }
    }
}

/// Subsystem an event belongs to; maps onto the tracing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Auth,
    Store,
    Ranking,
}
