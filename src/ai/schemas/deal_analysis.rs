/// Deal analysis schema
///
/// The typed contract every scoring run resolves to. Downstream code
/// (persistence, display, exports) can rely on all fourteen fields being
/// present no matter how mangled the model output was.
use serde::{ Deserialize, Serialize };

/// Assessed risk level of a deal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Case-insensitive parse. Anything unrecognized lands on Medium.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }
}

/// Complete analysis of one deal
///
/// Field order matches the JSON the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAnalysis {
    /// Overall score, always within 0-100
    pub score: i64,

    /// Narrative sections
    pub executive_summary: String,
    pub market_analysis: String,
    pub origin_analysis: String,
    pub buyer_profile: String,
    pub price_analysis: String,
    pub payment_logistics: String,

    /// Item lists
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub unusual_patterns: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,

    pub recommendation: String,
    pub risk_level: RiskLevel,

    #[serde(default)]
    pub reasoning: Vec<String>,
}

/// Loose view of the model's JSON before defaults are applied.
///
/// Every field is optional and risk_level stays a raw string so a sloppy
/// but well-typed response still parses. The score is handled separately
/// by the normalizer.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PartialAnalysis {
    pub executive_summary: Option<String>,
    pub market_analysis: Option<String>,
    pub origin_analysis: Option<String>,
    pub buyer_profile: Option<String>,
    pub price_analysis: Option<String>,
    pub payment_logistics: Option<String>,
    pub red_flags: Option<Vec<String>>,
    pub unusual_patterns: Option<Vec<String>>,
    pub strengths: Option<Vec<String>>,
    pub next_steps: Option<Vec<String>>,
    pub recommendation: Option<String>,
    pub risk_level: Option<String>,
    pub reasoning: Option<Vec<String>>,
}

/// Clip a string to at most `max_chars` characters
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

impl DealAnalysis {
    /// Merge a parsed response with the standing defaults for anything
    /// the model left out
    pub(crate) fn with_defaults(score: i64, parsed: PartialAnalysis) -> Self {
        Self {
            score,
            executive_summary: parsed.executive_summary
                .unwrap_or_else(|| "Analysis in progress...".to_string()),
            market_analysis: parsed.market_analysis
                .unwrap_or_else(|| "Market data being analyzed...".to_string()),
            origin_analysis: parsed.origin_analysis
                .unwrap_or_else(|| "Origin analysis pending...".to_string()),
            buyer_profile: parsed.buyer_profile
                .unwrap_or_else(|| "Buyer analysis pending...".to_string()),
            price_analysis: parsed.price_analysis
                .unwrap_or_else(|| "Price analysis pending...".to_string()),
            payment_logistics: parsed.payment_logistics
                .unwrap_or_else(|| "Payment analysis pending...".to_string()),
            red_flags: parsed.red_flags.unwrap_or_default(),
            unusual_patterns: parsed.unusual_patterns.unwrap_or_default(),
            strengths: parsed.strengths.unwrap_or_default(),
            next_steps: parsed.next_steps.unwrap_or_default(),
            recommendation: parsed.recommendation
                .unwrap_or_else(|| "Review detailed analysis".to_string()),
            risk_level: parsed.risk_level
                .map(|s| RiskLevel::parse(&s))
                .unwrap_or(RiskLevel::Medium),
            reasoning: parsed.reasoning.unwrap_or_default(),
        }
    }

    /// Analysis for a response that was not valid JSON. Embeds the raw
    /// text so nothing the model said is lost.
    pub(crate) fn degraded(score: i64, raw_text: &str, reason: &str) -> Self {
        const SEE_SUMMARY: &str = "See Executive Summary for raw AI response";

        Self {
            score,
            executive_summary: format!(
                "Warning: JSON Parsing Error. Raw response:\n\n{}",
                truncate_chars(raw_text, 1000)
            ),
            market_analysis: SEE_SUMMARY.to_string(),
            origin_analysis: SEE_SUMMARY.to_string(),
            buyer_profile: SEE_SUMMARY.to_string(),
            price_analysis: SEE_SUMMARY.to_string(),
            payment_logistics: SEE_SUMMARY.to_string(),
            red_flags: vec![format!("JSON parsing failed: {}", reason)],
            unusual_patterns: vec![],
            strengths: vec![],
            next_steps: vec![
                "Check the console output for the full response".to_string(),
                "Try re-running the analysis".to_string()
            ],
            recommendation: "Check console output or try again".to_string(),
            risk_level: RiskLevel::Medium,
            reasoning: vec!["Warning: AI returned invalid JSON format".to_string()],
        }
    }

    /// Analysis for an unexpected failure inside normalization itself
    pub(crate) fn fatal(error: &str) -> Self {
        Self {
            score: 50,
            executive_summary: format!("Warning: Error: {}", error),
            market_analysis: "Error occurred".to_string(),
            origin_analysis: "Error occurred".to_string(),
            buyer_profile: "Error occurred".to_string(),
            price_analysis: "Error occurred".to_string(),
            payment_logistics: "Error occurred".to_string(),
            red_flags: vec![error.to_string()],
            unusual_patterns: vec![],
            strengths: vec![],
            next_steps: vec!["Check error message".to_string(), "Try again".to_string()],
            recommendation: "Try running analysis again".to_string(),
            risk_level: RiskLevel::Medium,
            reasoning: vec!["Warning: Unexpected error occurred".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_defaults_fills_every_field() {
        let analysis = DealAnalysis::with_defaults(75, PartialAnalysis::default());

        assert_eq!(analysis.score, 75);
        assert_eq!(analysis.executive_summary, "Analysis in progress...");
        assert_eq!(analysis.market_analysis, "Market data being analyzed...");
        assert_eq!(analysis.origin_analysis, "Origin analysis pending...");
        assert_eq!(analysis.buyer_profile, "Buyer analysis pending...");
        assert_eq!(analysis.price_analysis, "Price analysis pending...");
        assert_eq!(analysis.payment_logistics, "Payment analysis pending...");
        assert!(analysis.red_flags.is_empty());
        assert!(analysis.unusual_patterns.is_empty());
        assert!(analysis.strengths.is_empty());
        assert!(analysis.next_steps.is_empty());
        assert_eq!(analysis.recommendation, "Review detailed analysis");
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
        assert!(analysis.reasoning.is_empty());
    }

    #[test]
    fn test_with_defaults_keeps_provided_values() {
        let parsed = PartialAnalysis {
            executive_summary: Some("Strong deal".to_string()),
            red_flags: Some(vec!["thin paper trail".to_string()]),
            risk_level: Some("LOW".to_string()),
            ..Default::default()
        };

        let analysis = DealAnalysis::with_defaults(90, parsed);
        assert_eq!(analysis.executive_summary, "Strong deal");
        assert_eq!(analysis.red_flags, vec!["thin paper trail".to_string()]);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        // Untouched sections still get their defaults
        assert_eq!(analysis.market_analysis, "Market data being analyzed...");
    }

    #[test]
    fn test_risk_level_parse_is_forgiving() {
        assert_eq!(RiskLevel::parse("low"), RiskLevel::Low);
        assert_eq!(RiskLevel::parse("HIGH"), RiskLevel::High);
        assert_eq!(RiskLevel::parse(" Medium "), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse("severe"), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse(""), RiskLevel::Medium);
    }

    #[test]
    fn test_degraded_embeds_truncated_raw_text() {
        let raw = "x".repeat(1500);
        let analysis = DealAnalysis::degraded(50, &raw, "expected value at line 1");

        assert!(analysis.executive_summary.starts_with("Warning: JSON Parsing Error."));
        // 1000 chars of raw text, not the full 1500
        assert!(analysis.executive_summary.contains(&"x".repeat(1000)));
        assert!(!analysis.executive_summary.contains(&"x".repeat(1001)));
        assert_eq!(analysis.red_flags.len(), 1);
        assert!(analysis.red_flags[0].contains("expected value"));
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters count as one
        assert_eq!(truncate_chars("日本語テスト", 3), "日本語");
    }

    #[test]
    fn test_fatal_carries_error_text() {
        let analysis = DealAnalysis::fatal("invalid score value: \"87.5\"");

        assert_eq!(analysis.score, 50);
        assert_eq!(analysis.executive_summary, "Warning: Error: invalid score value: \"87.5\"");
        assert_eq!(analysis.red_flags, vec!["invalid score value: \"87.5\"".to_string()]);
        assert_eq!(analysis.recommendation, "Try running analysis again");
    }

    #[test]
    fn test_serde_round_trip_preserves_everything() {
        let analysis = DealAnalysis::with_defaults(64, PartialAnalysis {
            strengths: Some(vec!["LME-referenced pricing".to_string()]),
            risk_level: Some("high".to_string()),
            ..Default::default()
        });

        let json = serde_json::to_string(&analysis).unwrap();
        let back: DealAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(analysis, back);
    }
}
