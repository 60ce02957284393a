//! Quote data model and snapshot-document field decoding.
//!
//! A `Quote` is one entry of a snapshot, keyed by ticker symbol. Every field
//! except the symbol is optional: the upstream fetch routine may omit any of
//! them, and a missing or mistyped field must never fail the load of the
//! entry it belongs to. Decoding from the snapshot document therefore goes
//! through [`Quote::from_entry`], which degrades bad fields to `None` instead
//! of erroring.
//!
//! On the write side, quotes serialize with the document's historical key
//! names (`Price`, `Original Price`, `Value`, ...). On the read side, key
//! matching ignores case and whitespace, so documents written with the
//! drifted `OriginalPrice`/`OriginalValue` spellings decode identically.
use serde::Serialize;
use serde_json::Value;
use strum::Display;

/// Direction of a position relative to its baseline, derived from `margin`.
///
/// `Unknown` is distinct from a zero margin: a quote without a margin has no
/// trend, while a margin of exactly zero counts as a gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Trend {
    /// Margin is present and non-negative.
    Gain,
    /// Margin is present and negative.
    Loss,
    /// Margin is absent.
    Unknown,
}

/// Stock quote for a single ticker symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Ticker symbol; unique key within a snapshot, never empty.
    #[serde(rename = "Symbol")]
    pub symbol: String,
    /// Current price per share.
    #[serde(rename = "Price", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Reference/baseline price per share.
    #[serde(rename = "Original Price", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Current value of the holding.
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Baseline value of the holding.
    #[serde(rename = "Original Value", skip_serializing_if = "Option::is_none")]
    pub original_value: Option<f64>,
    /// Percentage change against the baseline.
    #[serde(rename = "Margin", skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    /// Textual time of day the quote was captured.
    #[serde(rename = "Time", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl Quote {
    /// Creates a quote for `symbol` with every data field unset.
    pub fn new(symbol: impl Into<String>) -> Self {
        Quote {
            symbol: symbol.into(),
            price: None,
            original_price: None,
            value: None,
            original_value: None,
            margin: None,
            time: None,
        }
    }

    /// Decodes one snapshot-document entry into a `Quote`.
    ///
    /// Returns `None` only if the entry as a whole is unusable (the symbol is
    /// empty or the value is not an object); the caller then skips this entry
    /// and keeps the rest of the snapshot. Individual fields that are missing
    /// or of an unexpected shape decode to `None` without affecting sibling
    /// fields. A `Symbol` field inside the entry is ignored: the map key wins.
    pub fn from_entry(symbol: &str, entry: &Value) -> Option<Quote> {
        if symbol.is_empty() {
            return None;
        }
        let fields = entry.as_object()?;
        let mut quote = Quote::new(symbol);

        for (key, value) in fields {
            match normalize_key(key).as_str() {
                "price" => quote.price = coerce_number(value),
                "originalprice" => quote.original_price = coerce_number(value),
                "value" => quote.value = coerce_number(value),
                "originalvalue" => quote.original_value = coerce_number(value),
                "margin" => quote.margin = coerce_number(value),
                "time" => quote.time = coerce_text(value),
                _ => {}
            }
        }
        Some(quote)
    }

    /// Gain/loss direction of this quote; `Unknown` when `margin` is absent.
    pub fn trend(&self) -> Trend {
        match self.margin {
            Some(m) if m < 0.0 => Trend::Loss,
            Some(_) => Trend::Gain,
            None => Trend::Unknown,
        }
    }
}

/// Lowercases a document key and strips whitespace, so `"Original Price"`
/// and `"OriginalPrice"` compare equal.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reads a numeric field that may arrive as a JSON number or a numeric
/// string; anything else is `None`.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a textual field; numbers are stringified, anything else is `None`.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_all_fields_from_historical_key_names() {
        let entry = json!({
            "Symbol": "AAPL",
            "Price": 150.0,
            "Original Price": 140.0,
            "Value": 1500.0,
            "Original Value": 1400.0,
            "Margin": 7.14,
            "Time": "12:00 PM",
        });

        let quote = Quote::from_entry("AAPL", &entry).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, Some(150.0));
        assert_eq!(quote.original_price, Some(140.0));
        assert_eq!(quote.value, Some(1500.0));
        assert_eq!(quote.original_value, Some(1400.0));
        assert_eq!(quote.margin, Some(7.14));
        assert_eq!(quote.time.as_deref(), Some("12:00 PM"));
    }

    #[test]
    fn normalizes_key_drift() {
        let entry = json!({
            "OriginalPrice": 140.0,
            "originalvalue": 1400.0,
            "PRICE": 150.0,
        });

        let quote = Quote::from_entry("AAPL", &entry).unwrap();
        assert_eq!(quote.original_price, Some(140.0));
        assert_eq!(quote.original_value, Some(1400.0));
        assert_eq!(quote.price, Some(150.0));
    }

    #[test]
    fn accepts_numbers_encoded_as_strings() {
        let entry = json!({ "Price": "150.5", "Margin": " -3.2 " });

        let quote = Quote::from_entry("TSLA", &entry).unwrap();
        assert_eq!(quote.price, Some(150.5));
        assert_eq!(quote.margin, Some(-3.2));
    }

    #[test]
    fn mistyped_field_degrades_to_none_without_losing_siblings() {
        let entry = json!({ "Price": true, "Value": 900.0, "Time": [1, 2] });

        let quote = Quote::from_entry("NVDA", &entry).unwrap();
        assert_eq!(quote.price, None);
        assert_eq!(quote.value, Some(900.0));
        assert_eq!(quote.time, None);
    }

    #[test]
    fn non_object_entry_is_rejected() {
        assert!(Quote::from_entry("AAPL", &json!("oops")).is_none());
        assert!(Quote::from_entry("AAPL", &json!(42)).is_none());
    }

    #[test]
    fn empty_symbol_is_rejected() {
        assert!(Quote::from_entry("", &json!({ "Price": 1.0 })).is_none());
    }

    #[test]
    fn trend_distinguishes_unknown_from_zero() {
        assert_eq!(Quote::new("A").trend(), Trend::Unknown);

        let mut flat = Quote::new("A");
        flat.margin = Some(0.0);
        assert_eq!(flat.trend(), Trend::Gain);

        let mut down = Quote::new("A");
        down.margin = Some(-0.1);
        assert_eq!(down.trend(), Trend::Loss);
    }

    #[test]
    fn serializes_with_document_keys_and_skips_absent_fields() {
        let mut quote = Quote::new("AAPL");
        quote.price = Some(150.0);
        quote.original_price = Some(140.0);

        let value = serde_json::to_value(&quote).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["Symbol"], json!("AAPL"));
        assert_eq!(obj["Price"], json!(150.0));
        assert_eq!(obj["Original Price"], json!(140.0));
        assert!(!obj.contains_key("Margin"));
        assert!(!obj.contains_key("Time"));
    }
}
