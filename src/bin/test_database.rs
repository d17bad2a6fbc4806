// Smoke test for the deals database
use dealdesk::database::Database;
use dealdesk::logger::{ log, LogTag };
use dealdesk::types::{ DealFilter, NewDeal, PriceType };

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "=".repeat(60));
    println!("DATABASE OPERATION TESTS");
    println!("{}", "=".repeat(60));

    dealdesk::paths::ensure_all_directories()?;
    let db = Database::open_default()?;

    // TEST 1: View sources
    println!("\n📋 TEST 1: View all sources");
    println!("{}", "-".repeat(60));
    let sources = db.list_sources()?;
    println!("Found {} sources:", sources.len());
    for source in &sources {
        println!(
            "  ID: {} | Name: {} | Rating: {}/10",
            source.id,
            source.name,
            source.reliability_rating.unwrap_or(0)
        );
    }

    // TEST 2: Add a deal
    println!("\n➕ TEST 2: Add a new deal");
    println!("{}", "-".repeat(60));
    let new_deal = NewDeal {
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
    };

    match db.insert_deal(&new_deal) {
        Ok(id) => log(LogTag::Test, "SUCCESS", &format!("Deal added! ID: {}", id)),
        Err(e) => log(LogTag::Test, "ERROR", &format!("Insert failed: {}", e)),
    }

    // TEST 3: View deals
    println!("\n📋 TEST 3: View all deals");
    println!("{}", "-".repeat(60));
    let deals = db.list_deals(&DealFilter::default())?;
    println!("Found {} deal(s):", deals.len());
    for deal in &deals {
        println!(
            "  ID: {} | {} | Source: {} | Status: {}",
            deal.id,
            deal.commodity_type,
            deal.source_name,
            deal.status
        );
    }

    // TEST 4: Statistics
    println!("\n📊 TEST 4: Statistics");
    println!("{}", "-".repeat(60));
    let stats = db.get_statistics()?;
    println!("Total deals: {}", stats.total_deals);
    println!("Average AI score: {:.2}", stats.avg_score);
    for entry in &stats.by_status {
        println!("  {}: {}", entry.status, entry.count);
    }

    println!("\n{}", "=".repeat(60));
    println!("✅ ALL TESTS COMPLETE!");
    println!("{}", "=".repeat(60));
    Ok(())
}
