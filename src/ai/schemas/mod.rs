/// Structured output schemas for AI scoring
pub mod deal_analysis;

// Re-exports
pub use deal_analysis::{ DealAnalysis, RiskLevel };
pub(crate) use deal_analysis::PartialAnalysis;
