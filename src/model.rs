//! View models handed to the UI. Field names serialize in camelCase; the row
//! types in `db::rows` keep the backend's snake_case names.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Closed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Seeking,
    Offering,
    Participant,
    Giver,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Seeking => "seeking",
            ParticipantRole::Offering => "offering",
            ParticipantRole::Participant => "participant",
            ParticipantRole::Giver => "giver",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyMode {
    #[default]
    Public,
    Friends,
    Tags,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FriendRequest,
    FriendAccepted,
    SessionJoin,
    SessionLeave,
    SessionInvite,
    Vouch,
    TagAdded,
    Message,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::FriendRequest => "friend_request",
            NotificationType::FriendAccepted => "friend_accepted",
            NotificationType::SessionJoin => "session_join",
            NotificationType::SessionLeave => "session_leave",
            NotificationType::SessionInvite => "session_invite",
            NotificationType::Vouch => "vouch",
            NotificationType::TagAdded => "tag_added",
            NotificationType::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Minimal profile embedded in other entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub username: String,
}

impl UserRef {
    pub fn unknown() -> Self {
        Self {
            username: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub title: String,
    pub location: GeoPoint,
    #[serde(rename = "type")]
    pub session_type: String,
    pub event_time: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: SessionStatus,
    pub created_by: Uuid,
    pub creator: UserRef,
    pub participants: Vec<Uuid>,
    pub participant_roles: BTreeMap<String, ParticipantRole>,
    pub visible_to_tags: Vec<Uuid>,
    pub privacy: PrivacyMode,
    pub help_description: Option<String>,
    pub skill: Option<String>,
    pub outcome: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub cookie_score: i64,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: Uuid,
    pub username: String,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub cookie_score: i64,
    pub avatar_url: Option<String>,
    /// Not computed here; always zero.
    pub mutual_friends: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub sender: UserRef,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ActorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagSummary>,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Messages and unread count are filled by separate calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub participants: Vec<Uuid>,
    pub messages: Vec<DirectMessage>,
    pub unread_count: u32,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub sender: UserRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vouch {
    pub id: Uuid,
    pub voucher_username: String,
    pub skill: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful vouch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VouchReceipt {
    pub vouch_id: Option<Uuid>,
    pub points_awarded: Option<i64>,
}

/// Input for creating a session.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub title: String,
    pub location: GeoPoint,
    pub session_type: String,
    pub event_time: DateTime<Utc>,
    pub duration: Option<i32>,
    pub created_by: Uuid,
    pub creator_role: ParticipantRole,
    pub visible_to_tags: Vec<Uuid>,
    pub privacy: PrivacyMode,
    pub help_description: Option<String>,
    pub skill: Option<String>,
}

/// Partial session update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: Option<SessionStatus>,
    pub visible_to_tags: Option<Vec<Uuid>>,
    pub privacy: Option<PrivacyMode>,
    pub help_description: Option<String>,
    pub skill: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub avatar_url: Option<String>,
}

/// Arguments for `create_notification_safe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub kind: NotificationType,
    pub actor_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}
