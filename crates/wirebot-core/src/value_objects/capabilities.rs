//! Capability bitmask sent in the Identify handshake
//!
//! Each bit opts the session into one class of dispatch events.

use bitflags::bitflags;

bitflags! {
    /// Event classes a session subscribes to when identifying
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u64 {
        const GUILDS           = 1 << 0;
        const MEMBERS          = 1 << 1;
        const MODERATION       = 1 << 2;
        const EMOJIS           = 1 << 3;
        const INTEGRATIONS     = 1 << 4;
        const WEBHOOKS         = 1 << 5;
        const INVITES          = 1 << 6;
        const VOICE_STATES     = 1 << 7;
        const PRESENCES        = 1 << 8;
        const GUILD_MESSAGES   = 1 << 9;
        const GUILD_REACTIONS  = 1 << 10;
        const GUILD_TYPING     = 1 << 11;
        const DIRECT_MESSAGES  = 1 << 12;
        const DIRECT_REACTIONS = 1 << 13;
        const DIRECT_TYPING    = 1 << 14;
    }
}

impl Capabilities {
    /// The full standard subscription (every defined event class)
    #[must_use]
    pub const fn standard() -> Self {
        Self::all()
    }

    /// Message-focused subscription for bots that only route commands
    #[must_use]
    pub const fn messages_only() -> Self {
        Self::GUILD_MESSAGES.union(Self::DIRECT_MESSAGES)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::standard()
    }
}
