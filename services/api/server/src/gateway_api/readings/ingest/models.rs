use postgres_models::models::readings::NewReading;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub const STATUS_SUCCESS: &str = "success";

/// Reading as posted by the metering device.
///
/// Every field is optional. Missing or wrongly typed values fall back to `0`
/// for measurements and `false` for relay states, so a partially broken
/// sensor never stops the rest of a sample from being stored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReadingPayload {
    #[serde(deserialize_with = "lenient_f64")]
    pub voltage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub current1: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub current2: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub current3: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_current: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub power1: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub power2: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_power: f64,
    #[serde(deserialize_with = "lenient_bool")]
    pub relay1_state: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub relay2_state: bool,
}

impl TryFrom<serde_json::Map<String, Value>> for ReadingPayload {
    type Error = serde_json::Error;

    fn try_from(
        object: serde_json::Map<String, Value>,
    ) -> Result<Self, Self::Error> {
        serde_json::from_value(Value::Object(object))
    }
}

impl From<ReadingPayload> for NewReading {
    fn from(p: ReadingPayload) -> Self {
        Self {
            voltage: p.voltage,
            current1: p.current1,
            current2: p.current2,
            current3: p.current3,
            total_current: p.total_current,
            power1: p.power1,
            power2: p.power2,
            total_power: p.total_power,
            relay1_state: p.relay1_state,
            relay2_state: p.relay2_state,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub status: &'static str,
    pub message: &'static str,
}

impl IngestResponse {
    pub fn saved() -> Self {
        Self {
            status: STATUS_SUCCESS,
            message: "Data saved",
        }
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| coerce_f64(&v))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| coerce_bool(&v))
}

pub(crate) fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

pub(crate) fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "on"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: Value) -> ReadingPayload {
        match value {
            Value::Object(object) => ReadingPayload::try_from(object).unwrap(),
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        let payload = parse(json!({
            "voltage": 231.5,
            "current1": "1.25",
            "current2": " 2 ",
            "total_power": 1200,
        }));

        assert_eq!(payload.voltage, 231.5);
        assert_eq!(payload.current1, 1.25);
        assert_eq!(payload.current2, 2.0);
        assert_eq!(payload.total_power, 1200.0);
    }

    #[test]
    fn malformed_measurements_become_zero() {
        let payload = parse(json!({
            "voltage": "abc",
            "current1": null,
            "current2": [1, 2],
            "current3": {"a": 1},
            "power1": true,
            "power2": "NaN",
        }));

        assert_eq!(payload.voltage, 0.0);
        assert_eq!(payload.current1, 0.0);
        assert_eq!(payload.current2, 0.0);
        assert_eq!(payload.current3, 0.0);
        assert_eq!(payload.power1, 1.0);
        assert_eq!(payload.power2, 0.0);
    }

    #[test]
    fn relay_states_accept_common_spellings() {
        assert!(coerce_bool(&json!(true)));
        assert!(coerce_bool(&json!(1)));
        assert!(coerce_bool(&json!(0.5)));
        assert!(coerce_bool(&json!("ON")));
        assert!(coerce_bool(&json!("True")));
        assert!(coerce_bool(&json!("1")));

        assert!(!coerce_bool(&json!(false)));
        assert!(!coerce_bool(&json!(0)));
        assert!(!coerce_bool(&json!("off")));
        assert!(!coerce_bool(&json!("yes")));
        assert!(!coerce_bool(&json!(null)));
    }

    #[test]
    fn empty_object_is_all_defaults() {
        let reading = NewReading::from(parse(json!({})));
        assert_eq!(reading, NewReading::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload = parse(json!({"firmware": "1.2.3", "relay2_state": "on"}));
        assert!(payload.relay2_state);
    }
}
