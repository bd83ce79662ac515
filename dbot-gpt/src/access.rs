//! Access guard: only allow-listed usernames reach the rest of the chain.

use async_trait::async_trait;
use dbot_core::{Bot, Handler, Message, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, instrument, warn};

pub const MSG_ACCESS_DENIED: &str = "Access not granted";

pub struct AccessGuard {
    allowed_users: HashSet<String>,
    bot: Arc<dyn Bot>,
}

impl AccessGuard {
    pub fn new(allowed_users: impl IntoIterator<Item = String>, bot: Arc<dyn Bot>) -> Self {
        Self {
            allowed_users: allowed_users.into_iter().collect(),
            bot,
        }
    }

    pub fn is_allowed(&self, username: Option<&str>) -> bool {
        username.is_some_and(|u| self.allowed_users.contains(u))
    }
}

#[async_trait]
impl Handler for AccessGuard {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn before(&self, message: &Message) -> Result<bool> {
        if self.is_allowed(message.user.username.as_deref()) {
            return Ok(true);
        }
        warn!(
            username = ?message.user.username,
            chat_id = message.chat.id,
            "Access denied"
        );
        if let Err(e) = self.bot.reply_to(message, MSG_ACCESS_DENIED).await {
            error!(error = %e, "Failed to send access denied reply");
        }
        Ok(false)
    }
}
