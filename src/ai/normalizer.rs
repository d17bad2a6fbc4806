/// Response normalizer
///
/// Turns whatever text the model produced into a complete `DealAnalysis`.
/// This function never fails: a response that cannot be parsed as JSON
/// degrades to an analysis that embeds the raw text, and a response whose
/// score field is unusable collapses to a generic error analysis. Callers
/// always get all fourteen fields back.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ai::schemas::{ DealAnalysis, PartialAnalysis };
use crate::logger::{ self, LogTag };

/// Score used when nothing recoverable was found in the response
const DEFAULT_SCORE: i64 = 50;

/// Last-resort score recovery from responses that are not valid JSON
static SCORE_FALLBACK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""score"\s*:\s*(\d+)"#).unwrap()
});

// ===== OUTCOME =====

/// How a raw model response resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Valid JSON with a usable score
    Parsed(DealAnalysis),
    /// Invalid JSON. The raw text is embedded in the analysis and the
    /// score was recovered by regex where possible.
    Degraded(DealAnalysis),
    /// The score field existed but held an unusable value
    Fatal(DealAnalysis),
}

impl ParseOutcome {
    pub fn into_analysis(self) -> DealAnalysis {
        match self {
            ParseOutcome::Parsed(a) => a,
            ParseOutcome::Degraded(a) => a,
            ParseOutcome::Fatal(a) => a,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ParseOutcome::Degraded(_))
    }
}

/// Split between "the JSON was bad" and "the score value was bad".
/// Only the latter forfeits the raw text.
enum ParseFailure {
    Syntax(String),
    Internal(String),
}

// ===== NORMALIZATION =====

/// Resolve a raw model response into one of the three outcome tiers
pub fn normalize_response(raw: &str) -> ParseOutcome {
    match try_parse(raw) {
        Ok(analysis) => ParseOutcome::Parsed(analysis),
        Err(ParseFailure::Syntax(reason)) => {
            let score = recover_score(raw);
            logger::warning(
                LogTag::Scorer,
                &format!(
                    "⚠️ AI response was not valid JSON ({}), recovered score {}",
                    reason,
                    score
                )
            );
            ParseOutcome::Degraded(DealAnalysis::degraded(score, raw, &reason))
        }
        Err(ParseFailure::Internal(error)) => {
            logger::error(LogTag::Scorer, &format!("❌ Unusable AI response: {}", error));
            ParseOutcome::Fatal(DealAnalysis::fatal(&error))
        }
    }
}

/// Convenience wrapper for callers that only want the analysis
pub fn parse_response(raw: &str) -> DealAnalysis {
    normalize_response(raw).into_analysis()
}

fn try_parse(raw: &str) -> Result<DealAnalysis, ParseFailure> {
    let cleaned = strip_markdown_fences(raw);
    let candidate = extract_json_object(cleaned).ok_or_else(||
        ParseFailure::Syntax("no JSON object found".to_string())
    )?;

    let value: Value = serde_json
        ::from_str(candidate)
        .map_err(|e| ParseFailure::Syntax(e.to_string()))?;

    let score_value = value
        .get("score")
        .ok_or_else(|| ParseFailure::Syntax("missing score field".to_string()))?;
    let score = coerce_score(score_value)?;

    let parsed: PartialAnalysis = serde_json
        ::from_value(value)
        .map_err(|e| ParseFailure::Syntax(e.to_string()))?;

    Ok(DealAnalysis::with_defaults(score, parsed))
}

// ===== EXTRACTION HELPERS =====

/// Drop the markdown code fences models like to wrap JSON in
fn strip_markdown_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Find the first balanced JSON object in the text.
///
/// Walks brace depth while tracking string state, so braces inside
/// string literals do not count and escaped quotes do not end a string.
/// Returns the first object that closes back to depth zero, which keeps
/// surrounding prose and any trailing objects out of the parse.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => {
                in_string = true;
            }
            b'{' => {
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Convert the score field into an integer.
///
/// Whole numbers pass through, floats truncate, and numeric strings are
/// accepted. Anything else is an unusable value and fails the whole
/// response, there is no point keeping narrative fields attached to a
/// score we invented.
fn coerce_score(value: &Value) -> Result<i64, ParseFailure> {
    let score = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                f as i64
            } else {
                return Err(ParseFailure::Internal(format!("invalid score value: {}", value)));
            }
        }
        Value::String(s) =>
            s
                .trim()
                .parse::<i64>()
                .map_err(|_| ParseFailure::Internal(format!("invalid score value: {:?}", s)))?,
        other => {
            return Err(ParseFailure::Internal(format!("invalid score value: {}", other)));
        }
    };

    Ok(score.clamp(0, 100))
}

/// Pull a score out of text that failed JSON parsing
fn recover_score(raw: &str) -> i64 {
    SCORE_FALLBACK_PATTERN.captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(|score| score.clamp(0, 100))
        .unwrap_or(DEFAULT_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::schemas::RiskLevel;

    #[test]
    fn test_clean_fenced_response() {
        let raw = "```json\n{\"score\": 82, \"risk_level\": \"low\", \"executive_summary\": \"Solid LME-referenced offer\"}\n```";
        let outcome = normalize_response(raw);
        assert!(outcome.is_clean());

        let analysis = outcome.into_analysis();
        assert_eq!(analysis.score, 82);
        assert_eq!(analysis.risk_level, RiskLevel::Low);
        assert_eq!(analysis.executive_summary, "Solid LME-referenced offer");
        // Sections the model skipped get their defaults
        assert_eq!(analysis.market_analysis, "Market data being analyzed...");
        assert_eq!(analysis.recommendation, "Review detailed analysis");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"score\": 61}\n```";
        let outcome = normalize_response(raw);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 61);
    }

    #[test]
    fn test_prose_around_object_and_clamping() {
        let raw = "Sure, here you go: {\"score\": 105}";
        let outcome = normalize_response(raw);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 100);
    }

    #[test]
    fn test_provided_lists_survive_defaults() {
        let raw = "{\"score\": 40, \"red_flags\": [\"pricing 22% below LME\"]}";
        let analysis = parse_response(raw);
        assert_eq!(analysis.score, 40);
        assert_eq!(analysis.red_flags, vec!["pricing 22% below LME".to_string()]);
        assert!(analysis.strengths.is_empty());
        assert!(analysis.unusual_patterns.is_empty());
        assert_eq!(analysis.recommendation, "Review detailed analysis");
        assert_eq!(analysis.buyer_profile, "Buyer analysis pending...");
        assert_eq!(analysis.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_non_json_degrades_with_default_score() {
        let outcome = normalize_response("not json at all");
        assert!(outcome.is_degraded());

        let analysis = outcome.into_analysis();
        assert_eq!(analysis.score, 50);
        assert!(analysis.executive_summary.contains("not json at all"));
        assert_eq!(analysis.red_flags.len(), 1);
        assert!(analysis.red_flags[0].starts_with("JSON parsing failed:"));
    }

    #[test]
    fn test_empty_input_degrades() {
        let outcome = normalize_response("");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_analysis().score, 50);
    }

    #[test]
    fn test_missing_score_degrades() {
        let outcome = normalize_response("{\"recommendation\": \"Buy\"}");
        assert!(outcome.is_degraded());

        let analysis = outcome.into_analysis();
        assert_eq!(analysis.score, 50);
        assert!(analysis.red_flags[0].contains("missing score field"));
    }

    #[test]
    fn test_score_recovered_from_broken_json() {
        // Unterminated string, the object never balances
        let raw = "{\"score\": 88, \"executive_summary\": \"cut off mid";
        let outcome = normalize_response(raw);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.into_analysis().score, 88);
    }

    #[test]
    fn test_recovered_score_is_clamped() {
        let raw = "{\"score\": 150, \"executive_summary\": \"cut off mid";
        assert_eq!(parse_response(raw).score, 100);
    }

    #[test]
    fn test_wrong_typed_field_degrades_but_keeps_score() {
        let raw = "{\"score\": 70, \"red_flags\": \"should have been a list\"}";
        let outcome = normalize_response(raw);
        assert!(outcome.is_degraded());

        let analysis = outcome.into_analysis();
        assert_eq!(analysis.score, 70);
        assert!(analysis.executive_summary.contains("should have been a list"));
    }

    #[test]
    fn test_array_score_is_fatal() {
        let outcome = normalize_response("{\"score\": [1]}");
        let analysis = match outcome {
            ParseOutcome::Fatal(a) => a,
            other => panic!("expected fatal outcome, got {:?}", other),
        };
        assert_eq!(analysis.score, 50);
        assert!(analysis.executive_summary.starts_with("Warning: Error:"));
        assert!(analysis.red_flags[0].contains("invalid score value"));
    }

    #[test]
    fn test_null_score_is_fatal() {
        let outcome = normalize_response("{\"score\": null}");
        assert!(matches!(outcome, ParseOutcome::Fatal(_)));
    }

    #[test]
    fn test_non_integer_string_score_is_fatal() {
        let outcome = normalize_response("{\"score\": \"87.5\"}");
        assert!(matches!(outcome, ParseOutcome::Fatal(_)));
        assert_eq!(outcome.into_analysis().score, 50);
    }

    #[test]
    fn test_integer_string_score_is_accepted() {
        let outcome = normalize_response("{\"score\": \"91\"}");
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 91);
    }

    #[test]
    fn test_float_score_truncates() {
        let outcome = normalize_response("{\"score\": 87.5}");
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 87);
    }

    #[test]
    fn test_negative_score_clamps_to_zero() {
        assert_eq!(parse_response("{\"score\": -5}").score, 0);
    }

    #[test]
    fn test_first_balanced_object_wins() {
        let raw = "{\"score\": 64} and then a second one {\"score\": 99}";
        let outcome = normalize_response(raw);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 64);
    }

    #[test]
    fn test_reparse_of_serialized_analysis_is_clean() {
        let first = parse_response("{\"score\": 82, \"risk_level\": \"high\", \"strengths\": [\"known buyer\"]}");
        let json = serde_json::to_string(&first).unwrap();

        let outcome = normalize_response(&json);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis(), first);
    }

    #[test]
    fn test_extract_handles_nested_objects() {
        let text = "{\"a\": {\"b\": {\"c\": 1}}, \"d\": 2} tail";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": {\"c\": 1}}, \"d\": 2}"));
    }

    #[test]
    fn test_extract_ignores_braces_inside_strings() {
        let text = "{\"note\": \"a } inside\", \"x\": 1}";
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_handles_escaped_quotes() {
        let text = "{\"note\": \"he said \\\"hi }\\\" there\", \"x\": 1}";
        assert_eq!(extract_json_object(text), Some(text));

        let raw = "{\"score\": 55, \"executive_summary\": \"brace } and \\\"quote\\\" inside\"}";
        let outcome = normalize_response(raw);
        assert!(outcome.is_clean());
        assert_eq!(outcome.into_analysis().score, 55);
    }

    #[test]
    fn test_extract_returns_none_without_object() {
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("{ never closes"), None);
    }
}
