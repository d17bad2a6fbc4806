//! AI Deal Scoring Module
//!
//! Prompt construction, the Anthropic-backed scoring engine, and the
//! normalization layer that turns raw model output into a complete
//! DealAnalysis no matter what came back over the wire.

pub mod normalizer;
pub mod prompts;
pub mod schemas;
pub mod scorer;

// Re-exports
pub use normalizer::{ normalize_response, parse_response, ParseOutcome };
pub use prompts::PromptBuilder;
pub use schemas::{ DealAnalysis, RiskLevel };
pub use scorer::{ DealScorer, ScoreOutcome };
