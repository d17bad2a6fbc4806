use anyhow::{ Context, Result };

use crate::database::connection::Database;
use crate::types::{ CommodityCount, DealStatistics, StatusCount };

impl Database {
    /// Aggregate statistics for the stats command
    pub fn get_statistics(&self) -> Result<DealStatistics> {
        let conn = self.conn.lock().unwrap();

        let total_deals: i64 = conn
            .query_row("SELECT COUNT(*) FROM deals", [], |row| row.get(0))
            .context("Failed to count deals")?;

        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM deals GROUP BY status ORDER BY status"
        )?;
        let by_status = stmt
            .query_map([], |row| {
                Ok(StatusCount {
                    status: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let avg_score: Option<f64> = conn.query_row(
            "SELECT AVG(ai_score) FROM deals WHERE ai_score IS NOT NULL",
            [],
            |row| row.get(0)
        )?;
        let avg_score = avg_score.map(|avg| (avg * 100.0).round() / 100.0).unwrap_or(0.0);

        let mut stmt = conn.prepare(
            "SELECT commodity_type, COUNT(*) as count FROM deals
             GROUP BY commodity_type ORDER BY count DESC LIMIT 5"
        )?;
        let top_commodities = stmt
            .query_map([], |row| {
                Ok(CommodityCount {
                    commodity_type: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DealStatistics {
            total_deals: total_deals as u64,
            by_status,
            avg_score,
            top_commodities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewDeal;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn deal(commodity: &str, status: &str) -> NewDeal {
        NewDeal {
            commodity_type: commodity.to_string(),
            source_name: "Desk".to_string(),
            deal_text: "test deal".to_string(),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_database_statistics() {
        let (_dir, db) = test_db();

        let stats = db.get_statistics().unwrap();
        assert_eq!(stats.total_deals, 0);
        assert!(stats.by_status.is_empty());
        assert_eq!(stats.avg_score, 0.0);
        assert!(stats.top_commodities.is_empty());
    }

    #[test]
    fn test_statistics_aggregate_correctly() {
        let (_dir, db) = test_db();

        let gold = db.insert_deal(&deal("Gold", "unassigned")).unwrap();
        db.insert_deal(&deal("Gold", "reviewing")).unwrap();
        db.insert_deal(&deal("Copper", "unassigned")).unwrap();
        db.save_analysis(gold, 80, "[]", "{}").unwrap();

        let stats = db.get_statistics().unwrap();
        assert_eq!(stats.total_deals, 3);

        let unassigned = stats.by_status
            .iter()
            .find(|s| s.status == "unassigned")
            .unwrap();
        assert_eq!(unassigned.count, 2);

        assert_eq!(stats.avg_score, 80.0);
        assert_eq!(stats.top_commodities[0].commodity_type, "Gold");
        assert_eq!(stats.top_commodities[0].count, 2);
    }

    #[test]
    fn test_average_score_rounds_to_two_decimals() {
        let (_dir, db) = test_db();

        let a = db.insert_deal(&deal("Gold", "unassigned")).unwrap();
        let b = db.insert_deal(&deal("Gold", "unassigned")).unwrap();
        let c = db.insert_deal(&deal("Gold", "unassigned")).unwrap();
        db.save_analysis(a, 70, "[]", "{}").unwrap();
        db.save_analysis(b, 71, "[]", "{}").unwrap();
        db.save_analysis(c, 71, "[]", "{}").unwrap();

        // 212 / 3 = 70.666... rounds to 70.67
        let stats = db.get_statistics().unwrap();
        assert_eq!(stats.avg_score, 70.67);
    }
}
