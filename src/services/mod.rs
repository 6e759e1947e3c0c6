pub mod summarizer; // Calorie summary + clipboard report

pub use summarizer::Summarizer;
