use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relay {
    One,
    Two,
}

impl Relay {
    pub fn number(self) -> i64 {
        match self {
            Relay::One => 1,
            Relay::Two => 2,
        }
    }
}

impl TryFrom<i64> for Relay {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Relay::One),
            2 => Ok(Relay::Two),
            other => Err(other),
        }
    }
}

/// Desired relay positions the device picks up on its next poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayCommands {
    pub relay1: bool,
    pub relay2: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Process-wide relay command state. Cloning shares the same state; nothing is
/// persisted, so a restart turns both relays off.
#[derive(Debug, Clone, Default)]
pub struct RelayCommandStore {
    inner: Arc<RwLock<RelayCommands>>,
}

impl RelayCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the desired state of one relay and return the resulting
    /// snapshot.
    pub fn set(&self, relay: Relay, state: bool) -> RelayCommands {
        let mut commands = self.inner.write();
        match relay {
            Relay::One => commands.relay1 = state,
            Relay::Two => commands.relay2 = state,
        }
        commands.last_updated = Some(Utc::now());
        *commands
    }

    pub fn snapshot(&self) -> RelayCommands {
        *self.inner.read()
    }
}
