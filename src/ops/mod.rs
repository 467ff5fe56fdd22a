//! Domain operations, one async function per use case.
//!
//! All of them take the backend as `&dyn Backend`, return
//! [`DataResult`](crate::error::DataResult), and never retry.

pub mod friends;
pub mod messages;
pub mod notifications;
pub mod profiles;
pub mod sessions;
pub mod tags;
pub mod vouches;

pub(crate) const SESSIONS: &str = "sessions";
pub(crate) const PROFILES: &str = "profiles";
pub(crate) const FRIENDSHIPS: &str = "friendships";
pub(crate) const FRIEND_REQUESTS: &str = "friend_requests";
pub(crate) const TAGS: &str = "tags";
pub(crate) const SESSION_MESSAGES: &str = "session_messages";
pub(crate) const NOTIFICATIONS: &str = "notifications";
pub(crate) const CONVERSATIONS: &str = "conversations";
pub(crate) const DIRECT_MESSAGES: &str = "direct_messages";

/// Select list that embeds the creator's username.
pub(crate) const SESSION_COLUMNS: &str = "*, creator:profiles!created_by(username)";

pub(crate) fn to_json<T: serde::Serialize>(
    operation: &'static str,
    value: &T,
) -> crate::error::DataResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|err| crate::error::DataError::Request(format!("{}: {}", operation, err)))
}
