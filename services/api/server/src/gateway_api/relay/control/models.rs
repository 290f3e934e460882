use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::gateway_api::readings::ingest::models::STATUS_SUCCESS;

/// Desired state for one relay. `state` must be a JSON boolean.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RelayCommandRequest {
    #[validate(range(min = 1, max = 2, message = "relay must be 1 or 2"))]
    #[schema(minimum = 1, maximum = 2)]
    pub relay: i64,
    pub state: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RelayControlResponse {
    pub status: &'static str,
    pub relay: i64,
    pub state: bool,
    pub message: String,
}

impl RelayControlResponse {
    pub fn stored(relay: i64, state: bool, poll_interval_secs: u64) -> Self {
        Self {
            status: STATUS_SUCCESS,
            relay,
            state,
            message: format!(
                "Command stored, device will poll in {poll_interval_secs} seconds"
            ),
        }
    }
}
