use anyhow::{ Context, Result };
use chrono::{ DateTime, Utc };
use rusqlite::{ params, params_from_iter, types::Value };

use crate::database::connection::Database;
use crate::types::{ Deal, DealFilter, DealUpdate, NewDeal, PriceType };

/// Column list shared by every SELECT so row indices stay stable
const DEAL_COLUMNS: &str =
    "id, commodity_type, source_name, source_reliability, deal_text, \
     price, price_currency, quantity, quantity_unit, origin_country, \
     payment_method, shipping_terms, additional_notes, date_received, \
     status, price_type, gross_discount, commission, net_discount, \
     ai_score, ai_reasoning, ai_analysis, created_at";

/// Minimal row view used by the database fix tool
#[derive(Debug, Clone)]
pub struct ScoredDealRow {
    pub id: i64,
    pub ai_reasoning: Option<String>,
    pub ai_analysis: Option<String>,
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn deal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Deal> {
    Ok(Deal {
        id: row.get(0)?,
        commodity_type: row.get(1)?,
        source_name: row.get(2)?,
        source_reliability: row.get(3)?,
        deal_text: row.get(4)?,
        price: row.get(5)?,
        price_currency: row.get(6)?,
        quantity: row.get(7)?,
        quantity_unit: row.get(8)?,
        origin_country: row.get(9)?,
        payment_method: row.get(10)?,
        shipping_terms: row.get(11)?,
        additional_notes: row.get(12)?,
        date_received: parse_timestamp(&row.get::<_, String>(13)?),
        status: row.get(14)?,
        price_type: PriceType::parse(&row.get::<_, String>(15)?).unwrap_or(PriceType::FixedPrice),
        gross_discount: row.get(16)?,
        commission: row.get(17)?,
        net_discount: row.get(18)?,
        ai_score: row.get(19)?,
        ai_reasoning: row.get(20)?,
        ai_analysis: row.get(21)?,
        created_at: parse_timestamp(&row.get::<_, String>(22)?),
    })
}

impl Database {
    /// Insert a new deal, returning its id
    pub fn insert_deal(&self, deal: &NewDeal) -> Result<i64> {
        let conn = self.conn.lock().unwrap();

        let date_received = deal.date_received.unwrap_or_else(Utc::now).to_rfc3339();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO deals (
                commodity_type, source_name, source_reliability, deal_text,
                price, price_currency, quantity, quantity_unit, origin_country,
                payment_method, shipping_terms, additional_notes, date_received,
                status, price_type, gross_discount, commission, net_discount, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                deal.commodity_type,
                deal.source_name,
                deal.source_reliability,
                deal.deal_text,
                deal.price,
                deal.price_currency.as_deref().unwrap_or("USD"),
                deal.quantity,
                deal.quantity_unit,
                deal.origin_country,
                deal.payment_method,
                deal.shipping_terms,
                deal.additional_notes,
                date_received,
                deal.status.as_deref().unwrap_or("unassigned"),
                deal.price_type.unwrap_or(PriceType::FixedPrice).as_str(),
                deal.gross_discount,
                deal.commission,
                deal.net_discount,
                created_at
            ]
        ).context("Failed to insert deal")?;

        Ok(conn.last_insert_rowid())
    }

    /// Fetch one deal by id
    pub fn get_deal(&self, id: i64) -> Result<Option<Deal>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            &format!("SELECT {} FROM deals WHERE id = ?1", DEAL_COLUMNS)
        )?;

        let mut rows = stmt.query_map(params![id], deal_from_row)?;
        match rows.next() {
            Some(deal) => Ok(Some(deal?)),
            None => Ok(None),
        }
    }

    /// Most recently inserted deal, if any
    pub fn latest_deal(&self) -> Result<Option<Deal>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            &format!("SELECT {} FROM deals ORDER BY id DESC LIMIT 1", DEAL_COLUMNS)
        )?;

        let mut rows = stmt.query_map([], deal_from_row)?;
        match rows.next() {
            Some(deal) => Ok(Some(deal?)),
            None => Ok(None),
        }
    }

    /// List deals newest-first, optionally filtered by status and commodity
    pub fn list_deals(&self, filter: &DealFilter) -> Result<Vec<Deal>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = format!("SELECT {} FROM deals WHERE 1=1", DEAL_COLUMNS);
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = &filter.status {
            sql.push_str(" AND status = ?");
            values.push(Value::from(status.clone()));
        }
        if let Some(commodity) = &filter.commodity_type {
            sql.push_str(" AND commodity_type = ?");
            values.push(Value::from(commodity.clone()));
        }
        sql.push_str(" ORDER BY date_received DESC LIMIT ?");
        values.push(Value::from(filter.limit.unwrap_or(100) as i64));

        let mut stmt = conn.prepare(&sql)?;
        let deals = stmt
            .query_map(params_from_iter(values.iter()), deal_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to list deals")?;

        Ok(deals)
    }

    /// Apply a partial update. Returns false when the patch is empty or
    /// no row matched the id.
    pub fn update_deal(&self, id: i64, patch: &DealUpdate) -> Result<bool> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(v) = &patch.commodity_type {
            sets.push("commodity_type = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.source_name {
            sets.push("source_name = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = patch.source_reliability {
            sets.push("source_reliability = ?");
            values.push(Value::from(v));
        }
        if let Some(v) = &patch.deal_text {
            sets.push("deal_text = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = patch.price {
            sets.push("price = ?");
            values.push(Value::from(v));
        }
        if let Some(v) = &patch.price_currency {
            sets.push("price_currency = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = patch.quantity {
            sets.push("quantity = ?");
            values.push(Value::from(v));
        }
        if let Some(v) = &patch.quantity_unit {
            sets.push("quantity_unit = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.origin_country {
            sets.push("origin_country = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.payment_method {
            sets.push("payment_method = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.shipping_terms {
            sets.push("shipping_terms = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.additional_notes {
            sets.push("additional_notes = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = &patch.status {
            sets.push("status = ?");
            values.push(Value::from(v.clone()));
        }
        if let Some(v) = patch.price_type {
            sets.push("price_type = ?");
            values.push(Value::from(v.as_str().to_string()));
        }
        if let Some(v) = patch.gross_discount {
            sets.push("gross_discount = ?");
            values.push(Value::from(v));
        }
        if let Some(v) = patch.commission {
            sets.push("commission = ?");
            values.push(Value::from(v));
        }
        if let Some(v) = patch.net_discount {
            sets.push("net_discount = ?");
            values.push(Value::from(v));
        }

        if sets.is_empty() {
            return Ok(false);
        }

        values.push(Value::from(id));
        let sql = format!("UPDATE deals SET {} WHERE id = ?", sets.join(", "));

        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(&sql, params_from_iter(values.iter()))
            .context("Failed to update deal")?;

        Ok(changed > 0)
    }

    /// Set the workflow status of a deal
    pub fn update_deal_status(&self, id: i64, status: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn
            .execute("UPDATE deals SET status = ?1 WHERE id = ?2", params![status, id])
            .context("Failed to update deal status")?;

        Ok(changed > 0)
    }

    /// Delete a deal. Returns false when no row matched.
    pub fn delete_deal(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn
            .execute("DELETE FROM deals WHERE id = ?1", params![id])
            .context("Failed to delete deal")?;

        Ok(changed > 0)
    }

    /// Persist a scoring run: numeric score plus the serialized reasoning
    /// list and full analysis object
    pub fn save_analysis(
        &self,
        id: i64,
        score: i64,
        reasoning_json: &str,
        analysis_json: &str
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let changed = conn
            .execute(
                "UPDATE deals SET ai_score = ?1, ai_reasoning = ?2, ai_analysis = ?3 WHERE id = ?4",
                params![score, reasoning_json, analysis_json, id]
            )
            .context("Failed to save analysis")?;

        Ok(changed > 0)
    }

    /// All deals that have been scored, with their stored analysis columns
    pub fn scored_deal_rows(&self) -> Result<Vec<ScoredDealRow>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, ai_reasoning, ai_analysis FROM deals WHERE ai_score IS NOT NULL"
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ScoredDealRow {
                    id: row.get(0)?,
                    ai_reasoning: row.get(1)?,
                    ai_analysis: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Replace a deal's reasoning column with an empty JSON list
    pub fn reset_reasoning(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute("UPDATE deals SET ai_reasoning = '[]' WHERE id = ?1", params![id]).context(
            "Failed to reset reasoning"
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn sample_deal() -> NewDeal {
        NewDeal {
            commodity_type: "Gold".to_string(),
            source_name: "John Mensah".to_string(),
            source_reliability: Some(7),
            deal_text: "Ghana Gold Dore Bars, 500kg, LME -9%, SBLC payment, CIF".to_string(),
            quantity: Some(500.0),
            quantity_unit: Some("kg".to_string()),
            origin_country: Some("Ghana".to_string()),
            payment_method: Some("SBLC".to_string()),
            shipping_terms: Some("CIF".to_string()),
            price_type: Some(PriceType::LmeDiscount),
            gross_discount: Some(-9.0),
            commission: Some(2.0),
            net_discount: Some(-11.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let (_dir, db) = test_db();

        let id = db.insert_deal(&sample_deal()).unwrap();
        let deal = db.get_deal(id).unwrap().unwrap();

        assert_eq!(deal.commodity_type, "Gold");
        assert_eq!(deal.source_name, "John Mensah");
        assert_eq!(deal.source_reliability, Some(7));
        assert_eq!(deal.price_currency, "USD");
        assert_eq!(deal.status, "unassigned");
        assert_eq!(deal.price_type, PriceType::LmeDiscount);
        assert_eq!(deal.gross_discount, Some(-9.0));
        assert_eq!(deal.net_discount, Some(-11.0));
        assert_eq!(deal.ai_score, None);
    }

    #[test]
    fn test_get_missing_deal_returns_none() {
        let (_dir, db) = test_db();
        assert!(db.get_deal(999).unwrap().is_none());
    }

    #[test]
    fn test_list_deals_filters_by_status() {
        let (_dir, db) = test_db();

        let id1 = db.insert_deal(&sample_deal()).unwrap();
        db.insert_deal(&sample_deal()).unwrap();
        db.update_deal_status(id1, "reviewing").unwrap();

        let reviewing = db
            .list_deals(&DealFilter {
                status: Some("reviewing".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(reviewing.len(), 1);
        assert_eq!(reviewing[0].id, id1);

        let all = db.list_deals(&DealFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_list_deals_orders_newest_first() {
        let (_dir, db) = test_db();

        let mut older = sample_deal();
        older.date_received = Some(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap());
        let mut newer = sample_deal();
        newer.date_received = Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());

        let older_id = db.insert_deal(&older).unwrap();
        let newer_id = db.insert_deal(&newer).unwrap();

        let deals = db.list_deals(&DealFilter::default()).unwrap();
        assert_eq!(deals[0].id, newer_id);
        assert_eq!(deals[1].id, older_id);
    }

    #[test]
    fn test_list_deals_respects_limit() {
        let (_dir, db) = test_db();
        for _ in 0..5 {
            db.insert_deal(&sample_deal()).unwrap();
        }

        let deals = db
            .list_deals(&DealFilter { limit: Some(3), ..Default::default() })
            .unwrap();
        assert_eq!(deals.len(), 3);
    }

    #[test]
    fn test_update_deal_applies_patch() {
        let (_dir, db) = test_db();
        let id = db.insert_deal(&sample_deal()).unwrap();

        let updated = db
            .update_deal(id, &DealUpdate {
                price: Some(1850.0),
                price_type: Some(PriceType::FixedPrice),
                status: Some("negotiating".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(updated);

        let deal = db.get_deal(id).unwrap().unwrap();
        assert_eq!(deal.price, Some(1850.0));
        assert_eq!(deal.price_type, PriceType::FixedPrice);
        assert_eq!(deal.status, "negotiating");
        // Untouched fields survive
        assert_eq!(deal.commodity_type, "Gold");
    }

    #[test]
    fn test_update_with_empty_patch_returns_false() {
        let (_dir, db) = test_db();
        let id = db.insert_deal(&sample_deal()).unwrap();
        assert!(!db.update_deal(id, &DealUpdate::default()).unwrap());
    }

    #[test]
    fn test_update_missing_deal_returns_false() {
        let (_dir, db) = test_db();
        let patch = DealUpdate { status: Some("closed".to_string()), ..Default::default() };
        assert!(!db.update_deal(42, &patch).unwrap());
    }

    #[test]
    fn test_delete_deal() {
        let (_dir, db) = test_db();
        let id = db.insert_deal(&sample_deal()).unwrap();

        assert!(db.delete_deal(id).unwrap());
        assert!(db.get_deal(id).unwrap().is_none());
        assert!(!db.delete_deal(id).unwrap());
    }

    #[test]
    fn test_save_analysis_round_trip() {
        let (_dir, db) = test_db();
        let id = db.insert_deal(&sample_deal()).unwrap();

        let saved = db
            .save_analysis(id, 82, r#"["solid source"]"#, r#"{"score": 82}"#)
            .unwrap();
        assert!(saved);

        let deal = db.get_deal(id).unwrap().unwrap();
        assert_eq!(deal.ai_score, Some(82));
        assert_eq!(deal.ai_reasoning.as_deref(), Some(r#"["solid source"]"#));
        assert_eq!(deal.ai_analysis.as_deref(), Some(r#"{"score": 82}"#));
    }

    #[test]
    fn test_scored_rows_only_include_scored_deals() {
        let (_dir, db) = test_db();
        let scored = db.insert_deal(&sample_deal()).unwrap();
        db.insert_deal(&sample_deal()).unwrap();
        db.save_analysis(scored, 61, "[]", "{}").unwrap();

        let rows = db.scored_deal_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, scored);
    }

    #[test]
    fn test_reset_reasoning() {
        let (_dir, db) = test_db();
        let id = db.insert_deal(&sample_deal()).unwrap();
        db.save_analysis(id, 50, "['broken', 'repr']", "{}").unwrap();

        db.reset_reasoning(id).unwrap();
        let deal = db.get_deal(id).unwrap().unwrap();
        assert_eq!(deal.ai_reasoning.as_deref(), Some("[]"));
    }

    #[test]
    fn test_latest_deal() {
        let (_dir, db) = test_db();
        assert!(db.latest_deal().unwrap().is_none());

        db.insert_deal(&sample_deal()).unwrap();
        let second = db.insert_deal(&sample_deal()).unwrap();

        assert_eq!(db.latest_deal().unwrap().unwrap().id, second);
    }
}
