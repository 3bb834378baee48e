use crate::host::Player;
use crate::limits::ClipNotice;
use crate::models::types::UserId;
use std::collections::HashSet;

pub const NOTICE_PREFIX: &str = "[StackLimit] ";

/// Remembers which operators have already seen the current batch of clip
/// notices. Reset on every reload.
#[derive(Debug, Default, Clone)]
pub struct NotificationTracker {
    notified: HashSet<UserId>,
}

impl NotificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.notified.clear();
    }

    pub fn is_notified(&self, id: UserId) -> bool {
        self.notified.contains(&id)
    }

    /// Records a player for the current batch. Returns `true` only the first
    /// time, which is when the caller should [`deliver`].
    pub fn mark(&mut self, id: UserId) -> bool {
        self.notified.insert(id)
    }
}

/// Sends every notice, in order. Returns how many messages were sent.
pub fn deliver(player: &mut dyn Player, notices: &[ClipNotice]) -> usize {
    for notice in notices {
        player.send_message(&format!("{NOTICE_PREFIX}{notice}"));
    }
    notices.len()
}
