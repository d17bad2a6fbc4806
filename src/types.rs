use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

/// How the price of a deal is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    /// Absolute price in a currency (e.g. 1850.0 USD)
    FixedPrice,
    /// Percentage discount against the LME benchmark (gross / commission / net)
    LmeDiscount,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::FixedPrice => "fixed_price",
            PriceType::LmeDiscount => "lme_discount",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed_price" => Some(PriceType::FixedPrice),
            "lme_discount" => Some(PriceType::LmeDiscount),
            _ => None,
        }
    }
}

/// A commodity deal as stored in the deals table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub commodity_type: String,
    pub source_name: String,
    /// Source reliability rating on a 0-10 scale
    pub source_reliability: Option<i64>,
    /// Raw deal text as received (email, message, broker sheet)
    pub deal_text: String,
    pub price: Option<f64>,
    pub price_currency: String,
    pub quantity: Option<f64>,
    pub quantity_unit: Option<String>,
    pub origin_country: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_terms: Option<String>,
    pub additional_notes: Option<String>,
    pub date_received: DateTime<Utc>,
    /// Workflow status (unassigned, reviewing, negotiating, closed, rejected)
    pub status: String,
    pub price_type: PriceType,
    /// LME discount before commission, in percent (negative = below benchmark)
    pub gross_discount: Option<f64>,
    /// Commission taken by intermediaries, in percent
    pub commission: Option<f64>,
    /// Effective discount after commission, in percent
    pub net_discount: Option<f64>,
    pub ai_score: Option<i64>,
    /// JSON array of reasoning strings from the last scoring run
    pub ai_reasoning: Option<String>,
    /// Full analysis object from the last scoring run, serialized as JSON
    pub ai_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a new deal. Optional fields fall back to the
/// column defaults (USD currency, unassigned status, fixed_price type).
#[derive(Debug, Clone, Default)]
pub struct NewDeal {
    pub commodity_type: String,
    pub source_name: String,
    pub source_reliability: Option<i64>,
    pub deal_text: String,
    pub price: Option<f64>,
    pub price_currency: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_unit: Option<String>,
    pub origin_country: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_terms: Option<String>,
    pub additional_notes: Option<String>,
    pub date_received: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub price_type: Option<PriceType>,
    pub gross_discount: Option<f64>,
    pub commission: Option<f64>,
    pub net_discount: Option<f64>,
}

/// Partial update for an existing deal. Only fields set to Some are written.
#[derive(Debug, Clone, Default)]
pub struct DealUpdate {
    pub commodity_type: Option<String>,
    pub source_name: Option<String>,
    pub source_reliability: Option<i64>,
    pub deal_text: Option<String>,
    pub price: Option<f64>,
    pub price_currency: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_unit: Option<String>,
    pub origin_country: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_terms: Option<String>,
    pub additional_notes: Option<String>,
    pub status: Option<String>,
    pub price_type: Option<PriceType>,
    pub gross_discount: Option<f64>,
    pub commission: Option<f64>,
    pub net_discount: Option<f64>,
}

/// Filter for listing deals
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    pub status: Option<String>,
    pub commodity_type: Option<String>,
    /// Maximum rows to return (defaults to 100)
    pub limit: Option<u32>,
}

/// A known deal source (broker, trader, desk contact)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    /// Reliability rating on a 0-10 scale
    pub reliability_rating: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate statistics over the deals table
#[derive(Debug, Clone, Serialize)]
pub struct DealStatistics {
    pub total_deals: u64,
    pub by_status: Vec<StatusCount>,
    /// Average AI score over scored deals, rounded to 2 decimals (0.0 when none)
    pub avg_score: f64,
    /// Top 5 commodity types by deal count
    pub top_commodities: Vec<CommodityCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommodityCount {
    pub commodity_type: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_type_round_trip() {
        assert_eq!(PriceType::parse("fixed_price"), Some(PriceType::FixedPrice));
        assert_eq!(PriceType::parse("lme_discount"), Some(PriceType::LmeDiscount));
        assert_eq!(PriceType::parse("spot"), None);
        assert_eq!(PriceType::LmeDiscount.as_str(), "lme_discount");
    }

    #[test]
    fn test_price_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&PriceType::LmeDiscount).unwrap();
        assert_eq!(json, "\"lme_discount\"");
        let parsed: PriceType = serde_json::from_str("\"fixed_price\"").unwrap();
        assert_eq!(parsed, PriceType::FixedPrice);
    }
}
