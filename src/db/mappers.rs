//! Row → view-model translation. Every function here is total: nullable
//! containers become empty ones and missing embedded profiles become the
//! `Unknown` placeholder.

use std::collections::BTreeMap;

use super::rows::*;
use crate::model::*;

fn user_ref(row: Option<ProfileRefRow>) -> UserRef {
    row.and_then(|r| r.username)
        .map(|username| UserRef { username })
        .unwrap_or_else(UserRef::unknown)
}

pub fn session_from_row(row: SessionRow) -> Session {
    Session {
        id: row.id,
        title: row.title,
        location: GeoPoint {
            lat: row.latitude,
            lng: row.longitude,
        },
        session_type: row.session_type,
        event_time: row.event_time,
        duration: row.duration,
        status: row.status,
        created_by: row.created_by,
        creator: user_ref(row.creator),
        participants: row.participants.unwrap_or_default(),
        participant_roles: row.participant_roles.unwrap_or_default(),
        visible_to_tags: row.visible_to_tags.unwrap_or_default(),
        privacy: row.privacy.unwrap_or_default(),
        help_description: row.help_description,
        skill: row.skill,
        outcome: row.outcome,
        created_at: row.created_at,
    }
}

/// The creator joins their own session with the role they picked.
pub fn session_insert(new: NewSession) -> SessionInsert {
    let mut roles = BTreeMap::new();
    roles.insert(new.created_by.to_string(), new.creator_role);
    SessionInsert {
        title: new.title,
        latitude: new.location.lat,
        longitude: new.location.lng,
        session_type: new.session_type,
        event_time: new.event_time,
        duration: new.duration,
        status: SessionStatus::Active,
        created_by: new.created_by,
        participants: vec![new.created_by],
        participant_roles: roles,
        visible_to_tags: new.visible_to_tags,
        privacy: new.privacy,
        help_description: new.help_description,
        skill: new.skill,
    }
}

pub fn session_update(patch: SessionPatch) -> SessionUpdate {
    SessionUpdate {
        title: patch.title,
        event_time: patch.event_time,
        duration: patch.duration,
        status: patch.status,
        visible_to_tags: patch.visible_to_tags,
        privacy: patch.privacy,
        help_description: patch.help_description,
        skill: patch.skill,
        outcome: patch.outcome,
    }
}

pub fn profile_from_row(row: ProfileRow) -> Profile {
    Profile {
        id: row.id,
        username: row.username,
        branch: row.branch,
        year: row.year,
        cookie_score: row.cookie_score.unwrap_or(0),
        avatar_url: row.avatar_url,
    }
}

pub fn profile_update(patch: ProfilePatch) -> ProfileUpdate {
    ProfileUpdate {
        username: patch.username,
        branch: patch.branch,
        year: patch.year,
        avatar_url: patch.avatar_url,
    }
}

pub fn friend_from_row(row: ProfileRow) -> Friend {
    Friend {
        id: row.id,
        username: row.username,
        branch: row.branch,
        year: row.year,
        cookie_score: row.cookie_score.unwrap_or(0),
        avatar_url: row.avatar_url,
        mutual_friends: 0,
    }
}

pub fn friend_request_from_row(row: FriendRequestRow) -> FriendRequest {
    FriendRequest {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        sender: user_ref(row.sender),
        created_at: row.created_at,
    }
}

pub fn tag_from_row(row: TagRow) -> Tag {
    Tag {
        id: row.id,
        name: row.name,
        color: row.color,
        emoji: row.emoji,
        created_by: row.created_by,
        members: row.members.unwrap_or_default(),
        created_at: row.created_at,
    }
}

pub fn tag_insert(new: NewTag) -> TagInsert {
    TagInsert {
        name: new.name,
        color: new.color,
        emoji: new.emoji,
        created_by: new.created_by,
        members: new.members,
    }
}

pub fn actor_from_row(row: ActorRow) -> ActorSummary {
    ActorSummary {
        id: row.id,
        username: row.username.unwrap_or_else(|| UserRef::unknown().username),
    }
}

pub fn session_summary_from_row(row: SessionTitleRow) -> SessionSummary {
    SessionSummary {
        id: row.id,
        title: row.title,
    }
}

pub fn tag_summary_from_row(row: TagSummaryRow) -> TagSummary {
    TagSummary {
        id: row.id,
        name: row.name,
        color: row.color,
        emoji: row.emoji,
    }
}

/// Summaries are resolved by separate lookups and passed in.
pub fn notification_from_row(
    row: NotificationRow,
    user: Option<ActorSummary>,
    session: Option<SessionSummary>,
    tag: Option<TagSummary>,
) -> Notification {
    Notification {
        id: row.id,
        kind: row.kind,
        user,
        session,
        tag,
        created_at: row.created_at,
        read: row.read.unwrap_or(false),
    }
}

pub fn conversation_from_row(row: ConversationRow) -> Conversation {
    Conversation {
        id: row.id,
        participants: vec![row.user1_id, row.user2_id],
        messages: Vec::new(),
        unread_count: 0,
        updated_at: row.updated_at,
    }
}

pub fn direct_message_from_row(row: DirectMessageRow) -> DirectMessage {
    DirectMessage {
        id: row.id,
        conversation_id: row.conversation_id,
        sender_id: row.sender_id,
        content: row.content,
        created_at: row.created_at,
        read: row.read.unwrap_or(false),
    }
}

pub fn session_message_from_row(row: SessionMessageRow) -> SessionMessage {
    SessionMessage {
        id: row.id,
        session_id: row.session_id,
        sender_id: row.sender_id,
        sender: user_ref(row.sender),
        content: row.content,
        created_at: row.created_at,
    }
}

pub fn vouch_from_row(row: VouchHistoryRow) -> Vouch {
    Vouch {
        id: row.id,
        voucher_username: row
            .voucher_username
            .unwrap_or_else(|| UserRef::unknown().username),
        skill: row.skill,
        points: row.points.unwrap_or(0),
        created_at: row.created_at,
    }
}

pub fn vouch_receipt(payload: VouchPayload) -> VouchReceipt {
    VouchReceipt {
        vouch_id: payload.vouch_id,
        points_awarded: payload.points_awarded,
    }
}
