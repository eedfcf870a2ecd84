use crate::error::CoreError;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Field names the KPI calculations recognise. Everything else is carried but ignored.
pub mod fields {
    pub const SUBSCRIPTION_ID: &str = "subscription_id";
    pub const MRR_AMOUNT: &str = "mrr_amount";
    pub const CHURN_FLAG: &str = "churn_flag";
    pub const START_DATE: &str = "start_date";
}

/// One subscription row: an open mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl SubscriptionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for SubscriptionRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The set of field names present in a batch of records.
///
/// A field belongs to the schema if at least one record carries it, which is
/// what decides whether the field-dependent rules (deletion filter, churn flag,
/// monthly grouping) apply to the batch at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: BTreeSet<String>,
}

impl Schema {
    pub fn from_records(records: &[SubscriptionRecord]) -> Self {
        records
            .iter()
            .flat_map(|r| r.field_names())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Schema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts a decoded JSON payload into subscription records.
///
/// The payload must be an array whose every element is an object; anything
/// else is a client input error naming the offending position.
pub fn records_from_json(payload: serde_json::Value) -> Result<Vec<SubscriptionRecord>, CoreError> {
    let items = match payload {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(CoreError::InvalidInput(
                "payload".to_string(),
                format!("expected an array of records, found {}", json_kind(&other)),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect::<SubscriptionRecord>()),
            other => Err(CoreError::InvalidInput(
                format!("record {}", index),
                format!("expected an object, found {}", json_kind(&other)),
            )),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_is_the_union_of_keys() {
        let records = vec![
            SubscriptionRecord::new().with("subscription_id", "1"),
            SubscriptionRecord::new().with("mrr_amount", "10").with("plan", "pro"),
        ];
        let schema = Schema::from_records(&records);
        assert!(schema.contains(fields::SUBSCRIPTION_ID));
        assert!(schema.contains(fields::MRR_AMOUNT));
        assert!(schema.contains("plan"));
        assert!(!schema.contains(fields::CHURN_FLAG));
        assert_eq!(schema.fields().count(), 3);
    }

    #[test]
    fn empty_batch_has_empty_schema() {
        assert_eq!(Schema::from_records(&[]), Schema::default());
    }

    #[test]
    fn array_of_objects_becomes_records() {
        let records = records_from_json(json!([
            {"subscription_id": "1", "mrr_amount": 100},
            {}
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("mrr_amount"), Some(&FieldValue::from(100i64)));
        assert!(records[1].is_empty());
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let err = records_from_json(json!({"subscription_id": "1"})).unwrap_err();
        assert!(err.to_string().contains("expected an array of records, found an object"));
    }

    #[test]
    fn non_object_element_is_rejected_with_position() {
        let err = records_from_json(json!([{"a": 1}, 5])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("record 1"), "{message}");
        assert!(message.contains("found a number"), "{message}");
    }

    #[test]
    fn record_round_trips_as_a_plain_object() {
        let record: SubscriptionRecord =
            serde_json::from_value(json!({"subscription_id": "7", "churn_flag": 1})).unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"churn_flag": 1, "subscription_id": "7"})
        );
    }
}
