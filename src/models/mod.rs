use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, ScanError};

/// One detected food item and its estimated calories (kcal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: f64,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
        }
    }
}

/// Reply of the remote bill analysis service.
///
/// Wire shape: `{ "success": bool, "data": { "<item>": <kcal>, ... } }`.
/// Parsing is structurally permissive: a missing or non-bool `success` reads
/// as `false`, and `data` that is absent, not an object, or holds a
/// non-numeric value reads as `items = None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default, deserialize_with = "lenient_success")]
    pub success: bool,
    #[serde(rename = "data", default, deserialize_with = "lenient_items")]
    pub items: Option<Vec<FoodItem>>,
}

impl AnalysisResponse {
    /// Parse the raw response body. Only malformed JSON is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::parse_bytes(raw.as_bytes())
    }

    /// Same as [`AnalysisResponse::parse`] for bodies not yet known to be UTF-8;
    /// invalid UTF-8 is a `Parse` error like any other malformed JSON.
    pub fn parse_bytes(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw)?;

        if !value.is_object() {
            log::warn!("⚠️ Analysis response is not a JSON object, treating as failed");
            return Ok(Self::default());
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Boundary check for calorie values; the summarizer itself never rejects them.
    pub fn validate(&self) -> Result<()> {
        for item in self.items.iter().flatten() {
            if item.calories < 0.0 || !item.calories.is_finite() {
                return Err(ScanError::InvalidCalories {
                    name: item.name.clone(),
                    calories: item.calories,
                });
            }
        }
        Ok(())
    }
}

fn lenient_success<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

// Object order is kept by serde_json's preserve_order; a duplicated key keeps
// its first position with the last value.
fn lenient_items<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<FoodItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| value.as_f64().map(|calories| FoodItem::new(name, calories)))
            .collect(),
        _ => None,
    };
    Ok(items)
}

/// Ordered, totaled view of a successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieSummary {
    pub items: Vec<FoodItem>,
    pub total: f64,
    pub report_date: NaiveDate,
}

impl CalorieSummary {
    /// Report date as "Month D, YYYY", e.g. "January 5, 2024"
    pub fn report_date_label(&self) -> String {
        self.report_date.format("%B %-d, %Y").to_string()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_response() {
        let raw = r#"{"success": true, "data": {"Burger": 550, "Fries": 320}}"#;
        let response = AnalysisResponse::parse(raw).unwrap();

        assert!(response.success);
        assert_eq!(
            response.items,
            Some(vec![FoodItem::new("Burger", 550.0), FoodItem::new("Fries", 320.0)])
        );
    }

    #[test]
    fn test_parse_keeps_insertion_order() {
        let raw = r#"{"success": true, "data": {"Zucchini": 1, "Apple": 2, "Mango": 3.5}}"#;
        let response = AnalysisResponse::parse(raw).unwrap();

        let names: Vec<&str> = response
            .items
            .as_ref()
            .unwrap()
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zucchini", "Apple", "Mango"]);
    }

    #[test]
    fn test_parse_duplicate_key_last_value_wins() {
        let raw = r#"{"success": true, "data": {"Tea": 5, "Cake": 300, "Tea": 40}}"#;
        let items = AnalysisResponse::parse(raw).unwrap().items.unwrap();

        assert_eq!(items, vec![FoodItem::new("Tea", 40.0), FoodItem::new("Cake", 300.0)]);
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = AnalysisResponse::parse("{\"success\": true, \"data\": {").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));

        let err = AnalysisResponse::parse("").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        let err = AnalysisResponse::parse_bytes(&[0xff, 0xfe, b'{']).unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));

        let err = AnalysisResponse::parse_bytes(b"{\"success\": true, \"data\": {\"\xff\": 10}}").unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));

        let response = AnalysisResponse::parse_bytes(br#"{"success": true, "data": {"Pho": 420}}"#).unwrap();
        assert_eq!(response.items, Some(vec![FoodItem::new("Pho", 420.0)]));
    }

    #[test]
    fn test_parse_is_permissive_about_shape() {
        let response = AnalysisResponse::parse(r#"{"foo": 1}"#).unwrap();
        assert!(!response.success);
        assert!(response.items.is_none());

        let response = AnalysisResponse::parse(r#"{"success": "yes", "data": null}"#).unwrap();
        assert!(!response.success);
        assert!(response.items.is_none());

        let response = AnalysisResponse::parse(r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert!(response.success);
        assert!(response.items.is_none());

        let response = AnalysisResponse::parse("[1, 2, 3]").unwrap();
        assert_eq!(response, AnalysisResponse::default());
    }

    #[test]
    fn test_parse_non_numeric_calories_drops_items() {
        let raw = r#"{"success": true, "data": {"Burger": "550", "Fries": 320}}"#;
        let response = AnalysisResponse::parse(raw).unwrap();

        assert!(response.success);
        assert!(response.items.is_none());
    }

    #[test]
    fn test_validate_rejects_negative_calories() {
        let response = AnalysisResponse {
            success: true,
            items: Some(vec![FoodItem::new("Salad", 120.0), FoodItem::new("Refund", -50.0)]),
        };

        match response.validate() {
            Err(ScanError::InvalidCalories { name, calories }) => {
                assert_eq!(name, "Refund");
                assert_eq!(calories, -50.0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_zero_and_missing_items() {
        let response = AnalysisResponse {
            success: true,
            items: Some(vec![FoodItem::new("Water", 0.0)]),
        };
        assert!(response.validate().is_ok());
        assert!(AnalysisResponse::default().validate().is_ok());
    }

    #[test]
    fn test_report_date_label() {
        let summary = CalorieSummary {
            items: vec![],
            total: 0.0,
            report_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        };
        assert_eq!(summary.report_date_label(), "January 5, 2024");
        assert_eq!(summary.item_count(), 0);
    }
}
