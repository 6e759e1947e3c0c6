use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{Result, ScanError};
use crate::models::{AnalysisResponse, CalorieSummary};

/// Turns analysis responses into calorie summaries dated "today".
///
/// "Today" is taken in the configured timezone, or the machine's local
/// timezone when none is set.
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    timezone: Option<Tz>,
}

impl Summarizer {
    pub fn new(timezone: Option<Tz>) -> Self {
        Self { timezone }
    }

    pub fn today(&self) -> NaiveDate {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }

    pub fn summarize(&self, response: &AnalysisResponse) -> Result<CalorieSummary> {
        summarize_on(response, self.today())
    }

    /// Full clipboard pipeline: parse, summarize, format.
    /// Errors are returned to the caller, never swallowed.
    pub fn clipboard_text(&self, raw: &[u8]) -> Result<String> {
        let response = AnalysisResponse::parse_bytes(raw)?;
        let summary = self.summarize(&response)?;
        Ok(format_report(&summary))
    }
}

/// Summarize with an explicit report date
pub fn summarize_on(response: &AnalysisResponse, report_date: NaiveDate) -> Result<CalorieSummary> {
    let items = match (response.success, &response.items) {
        (true, Some(items)) => items.clone(),
        _ => {
            log::debug!(
                "Refusing to summarize response (success: {}, items present: {})",
                response.success,
                response.items.is_some()
            );
            return Err(ScanError::InvalidResponse);
        }
    };

    let total = items.iter().fold(0.0, |sum, item| sum + item.calories);
    log::debug!("📊 Summarized {} items, {} kcal total", items.len(), total);

    Ok(CalorieSummary {
        items,
        total,
        report_date,
    })
}

/// Clipboard report. Line order follows `summary.items`.
pub fn format_report(summary: &CalorieSummary) -> String {
    let mut report = format!("Meal Analysis - {}\n", summary.report_date_label());
    report.push_str(&format!("Total Calories: {}\n\n", format_calories(summary.total)));
    report.push_str("Items:\n");

    for item in &summary.items {
        report.push_str(&format!(
            "- {}: {} calories\n",
            item.name,
            format_calories(item.calories)
        ));
    }

    report
}

/// Render a number the way JavaScript prints it: `550`, `12.5`, `0` for
/// negative zero, exponent form at 1e21 and above or below 1e-6.
pub fn format_calories(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exponential = format!("{:e}", value);
        match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exponential,
        }
    } else {
        value.to_string()
    }
}

/// Format a summary that may not exist; absence is `MissingSummary`, not an empty string
pub fn format_optional_report(summary: Option<&CalorieSummary>) -> Result<String> {
    summary.map(format_report).ok_or(ScanError::MissingSummary)
}
