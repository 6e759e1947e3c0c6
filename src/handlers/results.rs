use crate::error::{Result, ScanError};
use crate::models::{AnalysisResponse, CalorieSummary};
use crate::services::summarizer::{format_calories, format_optional_report, Summarizer};

pub const FAILURE_TITLE: &str = "Analysis Failed";
pub const FAILURE_MESSAGE: &str = "We couldn't analyze your bill. Please try again.";

/// What the results screen shows for one scan
#[derive(Debug)]
pub enum ResultsView {
    Ready(CalorieSummary),
    Failed(ScanError),
}

impl ResultsView {
    pub fn from_raw(raw: &[u8], summarizer: &Summarizer) -> Self {
        let outcome = AnalysisResponse::parse_bytes(raw).and_then(|response| summarizer.summarize(&response));

        match outcome {
            Ok(summary) => {
                log::info!(
                    "✅ Bill analyzed: {} items, {} kcal",
                    summary.item_count(),
                    summary.total
                );
                ResultsView::Ready(summary)
            }
            Err(e) => {
                log::error!("❌ Could not build results: {}", e);
                ResultsView::Failed(e)
            }
        }
    }

    pub fn summary(&self) -> Option<&CalorieSummary> {
        match self {
            ResultsView::Ready(summary) => Some(summary),
            ResultsView::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResultsView::Failed(_))
    }

    /// Text for the "Copy to Clipboard" action
    pub fn copy_text(&self) -> Result<String> {
        format_optional_report(self.summary())
    }

    pub fn render_text(&self) -> String {
        match self {
            ResultsView::Ready(summary) => {
                let mut out = format!(
                    "Meal Analysis\n{}\n\nTotal Calories\n{}\n\nItems Detected ({})\n",
                    summary.report_date_label(),
                    format_calories(summary.total),
                    summary.item_count()
                );
                for item in &summary.items {
                    out.push_str(&format!("- {}: {} cal\n", item.name, format_calories(item.calories)));
                }
                out
            }
            ResultsView::Failed(_) => format!("{}\n{}\n", FAILURE_TITLE, FAILURE_MESSAGE),
        }
    }
}
