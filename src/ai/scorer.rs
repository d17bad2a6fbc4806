/// Deal scoring engine
///
/// Ties the pieces together: loads a deal, builds the prompts, invokes the
/// model, normalizes whatever came back and persists the result. The model
/// is reached through the `ModelInvoker` trait so tests can swap in a
/// canned responder.
use std::sync::Arc;

use anyhow::{ anyhow, Result };

use crate::ai::normalizer;
use crate::ai::prompts::PromptBuilder;
use crate::ai::schemas::DealAnalysis;
use crate::apis::llm::{ AnthropicClient, ModelInvoker };
use crate::config::Config;
use crate::database::Database;
use crate::logger::{ self, LogTag };

/// Result of one scoring run.
///
/// `success` is false only when the deal could not be loaded, the model
/// invocation itself failed, or the result could not be saved. A malformed
/// model response still counts as success, the analysis just carries the
/// degradation markers.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub success: bool,
    pub error: Option<String>,
    pub analysis: Option<DealAnalysis>,
}

impl ScoreOutcome {
    fn ok(analysis: DealAnalysis) -> Self {
        Self { success: true, error: None, analysis: Some(analysis) }
    }

    fn failed(error: String) -> Self {
        Self { success: false, error: Some(error), analysis: None }
    }
}

pub struct DealScorer {
    invoker: Arc<dyn ModelInvoker>,
    db: Arc<Database>,
}

impl DealScorer {
    pub fn new(db: Arc<Database>, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker, db }
    }

    /// Scorer backed by the Anthropic API with the configured key and model
    pub fn from_config(db: Arc<Database>, config: &Config) -> Result<Self> {
        let api_key = config.resolved_api_key();
        let client = AnthropicClient::from_config(&config.anthropic, api_key).map_err(|e|
            anyhow!(e)
        )?;

        Ok(Self::new(db, Arc::new(client)))
    }

    /// Score one deal and persist the analysis
    pub async fn score_deal(&self, deal_id: i64) -> ScoreOutcome {
        let deal = match self.db.get_deal(deal_id) {
            Ok(Some(deal)) => deal,
            Ok(None) => {
                logger::warning(LogTag::Scorer, &format!("⚠️ Deal {} not found", deal_id));
                return ScoreOutcome::failed(format!("Deal {} not found", deal_id));
            }
            Err(e) => {
                logger::error(
                    LogTag::Scorer,
                    &format!("❌ Failed to load deal {}: {}", deal_id, e)
                );
                return ScoreOutcome::failed(e.to_string());
            }
        };

        logger::info(
            LogTag::Scorer,
            &format!("🔍 Scoring deal {} ({})", deal.id, deal.commodity_type)
        );

        let user_prompt = PromptBuilder::build_user_prompt(&deal);
        let raw = match self.invoker.invoke(PromptBuilder::system_prompt(), &user_prompt).await {
            Ok(text) => text,
            Err(e) => {
                logger::error(
                    LogTag::Scorer,
                    &format!("❌ Model invocation failed for deal {}: {}", deal_id, e)
                );
                return ScoreOutcome::failed(e.to_string());
            }
        };

        let outcome = normalizer::normalize_response(&raw);
        if !outcome.is_clean() {
            logger::warning(
                LogTag::Scorer,
                &format!("⚠️ Analysis for deal {} was recovered from a malformed response", deal_id)
            );
        }
        let analysis = outcome.into_analysis();

        if let Err(e) = self.persist(deal_id, &analysis) {
            logger::error(
                LogTag::Scorer,
                &format!("❌ Failed to save analysis for deal {}: {}", deal_id, e)
            );
            return ScoreOutcome::failed(format!("Failed to save analysis: {}", e));
        }

        logger::info(
            LogTag::Scorer,
            &format!(
                "✅ Deal {} scored {}/100 ({} risk)",
                deal_id,
                analysis.score,
                analysis.risk_level.as_str()
            )
        );

        ScoreOutcome::ok(analysis)
    }

    fn persist(&self, deal_id: i64, analysis: &DealAnalysis) -> Result<()> {
        let reasoning_json = serde_json::to_string(&analysis.reasoning)?;
        let analysis_json = serde_json::to_string(analysis)?;
        self.db.save_analysis(deal_id, analysis.score, &reasoning_json, &analysis_json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::apis::llm::LlmError;
    use crate::types::NewDeal;

    struct FixedInvoker(String);

    #[async_trait]
    impl ModelInvoker for FixedInvoker {
        async fn invoke(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    struct FailingInvoker;

    #[async_trait]
    impl ModelInvoker for FailingInvoker {
        async fn invoke(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Err(LlmError::Timeout { provider: "anthropic".to_string(), timeout_ms: 120_000 })
        }
    }

    fn test_db() -> (tempfile::TempDir, Arc<Database>) {
        let dir = tempdir().unwrap();
        let db = Database::new(dir.path().join("deals.db")).unwrap();
        (dir, Arc::new(db))
    }

    fn insert_sample_deal(db: &Database) -> i64 {
        db
            .insert_deal(
                &(NewDeal {
                    commodity_type: "copper".to_string(),
                    source_name: "Maria Santos".to_string(),
                    source_reliability: Some(8),
                    deal_text: "Copper cathodes, 500 MT monthly, FOB Santos".to_string(),
                    ..Default::default()
                })
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_clean_response_is_persisted() {
        let (_dir, db) = test_db();
        let id = insert_sample_deal(&db);

        let invoker = FixedInvoker(
            "{\"score\": 82, \"risk_level\": \"low\", \"reasoning\": [\"POSITIVE: reliable source\"]}".to_string()
        );
        let scorer = DealScorer::new(db.clone(), Arc::new(invoker));

        let outcome = scorer.score_deal(id).await;
        assert!(outcome.success);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.analysis.as_ref().unwrap().score, 82);

        let stored = db.get_deal(id).unwrap().unwrap();
        assert_eq!(stored.ai_score, Some(82));
        assert_eq!(
            stored.ai_reasoning.as_deref(),
            Some("[\"POSITIVE: reliable source\"]")
        );
        // The stored analysis parses back into the same struct
        let parsed: DealAnalysis = serde_json::from_str(stored.ai_analysis.as_deref().unwrap()).unwrap();
        assert_eq!(Some(parsed), outcome.analysis);
    }

    #[tokio::test]
    async fn test_garbage_response_still_persists_degraded_analysis() {
        let (_dir, db) = test_db();
        let id = insert_sample_deal(&db);

        let scorer = DealScorer::new(
            db.clone(),
            Arc::new(FixedInvoker("the model rambled instead of answering".to_string()))
        );

        let outcome = scorer.score_deal(id).await;
        assert!(outcome.success);

        let analysis = outcome.analysis.unwrap();
        assert_eq!(analysis.score, 50);
        assert!(analysis.executive_summary.contains("the model rambled"));

        let stored = db.get_deal(id).unwrap().unwrap();
        assert_eq!(stored.ai_score, Some(50));
        assert!(stored.ai_analysis.unwrap().contains("JSON parsing failed"));
    }

    #[tokio::test]
    async fn test_invocation_failure_reports_error() {
        let (_dir, db) = test_db();
        let id = insert_sample_deal(&db);

        let scorer = DealScorer::new(db.clone(), Arc::new(FailingInvoker));

        let outcome = scorer.score_deal(id).await;
        assert!(!outcome.success);
        assert!(outcome.analysis.is_none());
        assert!(outcome.error.unwrap().contains("Request timeout"));

        // Nothing was written to the deal
        let stored = db.get_deal(id).unwrap().unwrap();
        assert_eq!(stored.ai_score, None);
    }

    #[tokio::test]
    async fn test_missing_deal_reports_error() {
        let (_dir, db) = test_db();
        let scorer = DealScorer::new(db, Arc::new(FixedInvoker("{}".to_string())));

        let outcome = scorer.score_deal(9999).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Deal 9999 not found"));
    }
}
