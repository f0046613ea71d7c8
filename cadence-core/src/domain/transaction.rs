//! Transaction domain model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// Key added to each record once the recurring classifier has run
pub const RECURRING_KEY: &str = "recurring";

/// A single ledger entry as delivered by the aggregation provider
///
/// The provider record is kept verbatim (key order included) so that fields this
/// crate does not interpret pass through to the caller unchanged. `name`, `date`
/// and `amount` are parsed once up front because the classifier groups and
/// compares on them, and stay read-only so they cannot drift from the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    name: String,
    date: NaiveDate,
    amount: Decimal,
    /// `None` until the recurring classifier has run
    pub recurring: Option<bool>,
    raw: Map<String, JsonValue>,
}

/// Typed view over the fields the core interprets
#[derive(Deserialize)]
struct RequiredFields {
    name: String,
    date: NaiveDate,
    #[serde(deserialize_with = "deserialize_amount")]
    amount: Decimal,
}

/// Deserialize amount that can be number or string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        JsonValue::String(s) => s
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        _ => Err(D::Error::custom("expected number or string for amount")),
    }
}

impl Transaction {
    /// Build a transaction from a raw provider record
    ///
    /// Fails when `name`, `date` or `amount` is missing or has the wrong shape.
    /// A `recurring` key already present in the record is ignored: the flag is
    /// computed here, never taken from the source.
    pub fn from_record(mut raw: Map<String, JsonValue>) -> serde_json::Result<Self> {
        raw.shift_remove(RECURRING_KEY);
        let fields = RequiredFields::deserialize(JsonValue::Object(raw.clone()))?;
        Ok(Self {
            name: fields.name,
            date: fields.date,
            amount: fields.amount,
            recurring: None,
            raw,
        })
    }

    /// Convenience constructor for records with only the interpreted fields
    ///
    /// `amount` is stored as a JSON number, the way the provider sends it.
    pub fn new(name: impl Into<String>, date: NaiveDate, amount: Decimal) -> Self {
        let name = name.into();
        let mut raw = Map::new();
        raw.insert("name".to_string(), JsonValue::String(name.clone()));
        raw.insert(
            "date".to_string(),
            JsonValue::String(date.format("%Y-%m-%d").to_string()),
        );
        raw.insert("amount".to_string(), amount_number(amount));
        Self {
            name,
            date,
            amount,
            recurring: None,
            raw,
        }
    }

    /// Merchant/description, exact-match grouping key
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Provider fields not interpreted by this crate
    pub fn extra(&self, key: &str) -> Option<&JsonValue> {
        self.raw.get(key)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring.unwrap_or(false)
    }
}

// Keeps the decimal text when it has no JSON number form
fn amount_number(amount: Decimal) -> JsonValue {
    let text = amount.normalize().to_string();
    serde_json::from_str::<serde_json::Number>(&text)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::String(text))
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let len = self.raw.len() + usize::from(self.recurring.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.raw {
            map.serialize_entry(key, value)?;
        }
        if let Some(recurring) = self.recurring {
            map.serialize_entry(RECURRING_KEY, &recurring)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Map::<String, JsonValue>::deserialize(deserializer)?;
        Transaction::from_record(raw).map_err(serde::de::Error::custom)
    }
}

/// One response unit from the provider's transaction query
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsPage {
    /// Full count available for the query, not the size of this page
    pub total_transactions: usize,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
