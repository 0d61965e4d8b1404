//! Thin typed wrappers over common Bot API methods.
//!
//! Each wrapper builds one [`Request`] and hands it to [`Client::invoke`] or
//! [`Client::call`]. Anything not covered here goes through `invoke` directly.

use chrono::{DateTime, Utc};

use crate::errors::InvocationError;
use crate::peer::Peer;
use crate::request::{Request, RequestPart};
use crate::types::{Chat, File, User, UserProfilePhotos};
use crate::Client;

// ─── Option bundles ───────────────────────────────────────────────────────────

/// Optional arguments of [`Client::get_user_profile_photos`].
#[derive(Clone, Debug, Default)]
pub struct ProfilePhotosOptions {
    /// Index of the first photo, `0` for the newest.
    pub offset: i32,
    /// How many photos to return (1-100), `0` for the server default.
    pub limit:  i32,
}

impl RequestPart for ProfilePhotosOptions {
    fn add_to_request(&self, request: Request) -> Request {
        request
            .add_opt_int("offset", self.offset)
            .add_opt_int("limit", self.limit)
    }
}

/// Optional arguments of [`Client::kick_chat_member`].
#[derive(Clone, Debug, Default)]
pub struct KickOptions {
    /// When the user is unbanned. Less than 30 seconds or more than 366 days
    /// from now means forever.
    pub until: Option<DateTime<Utc>>,
}

impl RequestPart for KickOptions {
    fn add_to_request(&self, request: Request) -> Request {
        request.add_opt_time("until_date", self.until)
    }
}

/// Optional arguments of [`Client::restrict_chat_member`].
///
/// All flags `true` lifts every restriction.
#[derive(Clone, Debug, Default)]
pub struct RestrictOptions {
    pub until:                      Option<DateTime<Utc>>,
    pub can_send_messages:          bool,
    /// Implies `can_send_messages`.
    pub can_send_media_messages:    bool,
    /// Implies `can_send_media_messages`.
    pub can_send_other_messages:    bool,
    /// Implies `can_send_media_messages`.
    pub can_send_web_page_previews: bool,
}

impl RequestPart for RestrictOptions {
    fn add_to_request(&self, request: Request) -> Request {
        request
            .add_opt_time("until_date", self.until)
            .add_opt_bool("can_send_messages", self.can_send_messages)
            .add_opt_bool("can_send_media_messages", self.can_send_media_messages)
            .add_opt_bool("can_send_other_messages", self.can_send_other_messages)
            .add_opt_bool("can_send_web_page_previews", self.can_send_web_page_previews)
    }
}

// ─── Client methods ───────────────────────────────────────────────────────────

impl Client {
    // ── Bot ────────────────────────────────────────────────────────────────

    /// The bot's own account.
    pub async fn get_me(&self) -> Result<User, InvocationError> {
        self.invoke(Request::new("getMe")).await
    }

    /// Remove the webhook so updates can be polled again.
    pub async fn delete_webhook(&self) -> Result<(), InvocationError> {
        self.call(Request::new("deleteWebhook")).await
    }

    // ── Files ──────────────────────────────────────────────────────────────

    /// Resolve `file_id` to a downloadable [`File`].
    pub async fn get_file(&self, file_id: &str) -> Result<File, InvocationError> {
        self.invoke(Request::new("getFile").add_string("file_id", file_id)).await
    }

    pub async fn get_user_profile_photos(
        &self,
        user_id: i64,
        opts:    Option<&ProfilePhotosOptions>,
    ) -> Result<UserProfilePhotos, InvocationError> {
        self.invoke(
            Request::new("getUserProfilePhotos")
                .add_int64("user_id", user_id)
                .add_part(opts),
        ).await
    }

    // ── Chats ──────────────────────────────────────────────────────────────

    pub async fn get_chat(&self, peer: impl Into<Peer>) -> Result<Chat, InvocationError> {
        self.invoke(Request::new("getChat").add_chat_id(peer)).await
    }

    /// Change the title of a non-private chat (1-255 characters).
    pub async fn set_chat_title(
        &self,
        peer:  impl Into<Peer>,
        title: &str,
    ) -> Result<(), InvocationError> {
        self.call(
            Request::new("setChatTitle")
                .add_chat_id(peer)
                .add_string("title", title),
        ).await
    }

    /// Change the description of a supergroup or channel (0-255 characters).
    pub async fn set_chat_description(
        &self,
        peer:        impl Into<Peer>,
        description: &str,
    ) -> Result<(), InvocationError> {
        self.call(
            Request::new("setChatDescription")
                .add_chat_id(peer)
                .add_string("description", description),
        ).await
    }

    pub async fn get_chat_members_count(&self, peer: impl Into<Peer>) -> Result<i32, InvocationError> {
        self.invoke(Request::new("getChatMembersCount").add_chat_id(peer)).await
    }

    // ── Members ────────────────────────────────────────────────────────────

    /// Ban `user_id`. In supergroups and channels the user cannot come back
    /// by invite link until unbanned.
    pub async fn kick_chat_member(
        &self,
        peer:    impl Into<Peer>,
        user_id: i64,
        opts:    Option<&KickOptions>,
    ) -> Result<(), InvocationError> {
        self.call(
            Request::new("kickChatMember")
                .add_chat_id(peer)
                .add_int64("user_id", user_id)
                .add_part(opts),
        ).await
    }

    pub async fn unban_chat_member(
        &self,
        peer:    impl Into<Peer>,
        user_id: i64,
    ) -> Result<(), InvocationError> {
        self.call(
            Request::new("unbanChatMember")
                .add_chat_id(peer)
                .add_int64("user_id", user_id),
        ).await
    }

    /// Restrict `user_id` in a supergroup.
    pub async fn restrict_chat_member(
        &self,
        peer:    impl Into<Peer>,
        user_id: i64,
        opts:    Option<&RestrictOptions>,
    ) -> Result<(), InvocationError> {
        self.call(
            Request::new("restrictChatMember")
                .add_chat_id(peer)
                .add_int64("user_id", user_id)
                .add_part(opts),
        ).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
