use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("analysis failed, try again")]
    InvalidResponse,

    #[error("invalid calorie value for '{name}': {calories}")]
    InvalidCalories { name: String, calories: f64 },

    #[error("no summary available to format")]
    MissingSummary,
}

impl ScanError {
    /// Short message shown to the user; the Display impl carries the details
    pub fn user_message(&self) -> &'static str {
        match self {
            ScanError::Parse(_) => "cannot read response",
            ScanError::InvalidResponse => "analysis failed, try again",
            ScanError::InvalidCalories { .. } => "analysis returned invalid calorie values",
            ScanError::MissingSummary => "no data available to copy",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
