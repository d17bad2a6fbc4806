// Quick sanity check: does the most recent deal carry LME pricing data?
use dealdesk::database::Database;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open_default()?;

    match db.latest_deal()? {
        Some(deal) => {
            println!("✅ Most recent deal:");
            println!("  ID: {}", deal.id);
            println!("  Commodity: {}", deal.commodity_type);
            println!("  Price Type: {}", deal.price_type.as_str());
            println!("  Gross: {}%", display_pct(deal.gross_discount));
            println!("  Commission: {}%", display_pct(deal.commission));
            println!("  Net: {}%", display_pct(deal.net_discount));

            let has_lme_data =
                deal.gross_discount.is_some() ||
                deal.commission.is_some() ||
                deal.net_discount.is_some();

            if has_lme_data {
                println!("\n🎉 LME pricing fields are working!");
            } else {
                println!("\n⚠️ LME pricing fields are empty");
            }
        }
        None => println!("❌ No deals found"),
    }

    Ok(())
}

fn display_pct(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
