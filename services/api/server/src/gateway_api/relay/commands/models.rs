use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::relay_commands::RelayCommands;

/// What the device should switch its relays to. `timestamp` is `null` until
/// the first command arrives.
#[derive(Debug, Serialize, ToSchema)]
pub struct RelayCommandsResponse {
    pub relay1: bool,
    pub relay2: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<RelayCommands> for RelayCommandsResponse {
    fn from(c: RelayCommands) -> Self {
        Self {
            relay1: c.relay1,
            relay2: c.relay2,
            timestamp: c.last_updated,
        }
    }
}
