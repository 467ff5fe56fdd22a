//! Backend row shapes, one per table or procedure payload.
//!
//! Field names follow the database columns exactly. Decoding a response into
//! these types is where unexpected shapes get rejected; nullable columns are
//! `Option` here and get defaulted by the mappers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::model::{NotificationType, ParticipantRole, PrivacyMode, SessionStatus};

/// Embedded `profiles(username)` join.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRefRow {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionRow {
    pub id: Uuid,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub session_type: String,
    pub event_time: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: SessionStatus,
    pub created_by: Uuid,
    pub creator: Option<ProfileRefRow>,
    pub participants: Option<Vec<Uuid>>,
    pub participant_roles: Option<BTreeMap<String, ParticipantRole>>,
    pub visible_to_tags: Option<Vec<Uuid>>,
    pub privacy: Option<PrivacyMode>,
    pub help_description: Option<String>,
    pub skill: Option<String>,
    pub outcome: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInsert {
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub session_type: String,
    pub event_time: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: SessionStatus,
    pub created_by: Uuid,
    pub participants: Vec<Uuid>,
    pub participant_roles: BTreeMap<String, ParticipantRole>,
    pub visible_to_tags: Vec<Uuid>,
    pub privacy: PrivacyMode,
    pub help_description: Option<String>,
    pub skill: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_to_tags: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<PrivacyMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub username: String,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub cookie_score: Option<i64>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FriendshipRow {
    pub friend_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FriendRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub sender: Option<ProfileRefRow>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestInsert {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub created_by: Uuid,
    pub members: Option<Vec<Uuid>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagInsert {
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub created_by: Uuid,
    pub members: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub actor_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read: Option<bool>,
}

/// `profiles(id, username)` lookup used by notification enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct ActorRow {
    pub id: Uuid,
    pub username: Option<String>,
}

/// `sessions(id, title)` lookup used by notification enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTitleRow {
    pub id: Uuid,
    pub title: String,
}

/// `tags(id, name, color, emoji)` lookup used by notification enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSummaryRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRow {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectMessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectMessageInsert {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionMessageRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sender: Option<ProfileRefRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionMessageInsert {
    pub session_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
}

/// Row of `get_user_vouch_history`.
#[derive(Debug, Clone, Deserialize)]
pub struct VouchHistoryRow {
    pub id: Uuid,
    pub voucher_username: Option<String>,
    pub skill: String,
    pub points: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// Procedure payloads: the fields that accompany `success: true`.

/// Procedures that report nothing beyond success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {}

#[derive(Debug, Clone, Deserialize)]
pub struct VouchPayload {
    pub vouch_id: Option<Uuid>,
    pub points_awarded: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPayload {
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationIdPayload {
    pub conversation_id: Uuid,
}
