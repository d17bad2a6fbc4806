use std::sync::Arc;

use clap::{ Arg, ArgAction, ArgMatches, Command };

use dealdesk::ai::{ DealAnalysis, DealScorer };
use dealdesk::config::Config;
use dealdesk::database::Database;
use dealdesk::logger::{ self, LogTag };
use dealdesk::types::{ Deal, DealFilter, DealUpdate, NewDeal, PriceType };

/// Main entry point for DealDesk
///
/// Subcommand-driven CLI over the deal store plus the AI scoring engine.
/// Running without a subcommand prints a short overview of the tracked
/// deals.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Ensure all directories exist BEFORE logger initialization
    // (Logger needs logs directory to create log files)
    if let Err(e) = dealdesk::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    let matches = build_cli().get_matches();

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("❌ Failed to load config: {}", e));
            std::process::exit(1);
        }
    };
    logger::apply_config_level(&config.general.log_level);

    logger::debug(
        LogTag::System,
        &format!("📂 Data directory: {}", dealdesk::paths::get_base_directory_display())
    );

    let db = Arc::new(Database::new(config.database_path())?);

    match matches.subcommand() {
        Some(("add", sub)) => cmd_add(&db, sub)?,
        Some(("list", sub)) => cmd_list(&db, &config, sub)?,
        Some(("show", sub)) => cmd_show(&db, sub)?,
        Some(("score", sub)) => cmd_score(db.clone(), &config, sub).await?,
        Some(("update", sub)) => cmd_update(&db, sub)?,
        Some(("status", sub)) => cmd_status(&db, sub)?,
        Some(("delete", sub)) => cmd_delete(&db, sub)?,
        Some(("stats", sub)) => cmd_stats(&db, sub)?,
        Some(("sources", sub)) => cmd_sources(&db, sub)?,
        _ => cmd_overview(&db)?,
    }

    logger::flush();
    Ok(())
}

// ===== CLI DEFINITION =====

fn build_cli() -> Command {
    Command::new("dealdesk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Commodity deal tracker with AI-powered scoring")
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging for all modules")
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable verbose logging for all modules")
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Errors and warnings only")
        )
        .arg(debug_tag_flag("debug-deals", "Debug logging for deal storage"))
        .arg(debug_tag_flag("debug-scorer", "Debug logging for the scoring engine"))
        .arg(debug_tag_flag("debug-api", "Debug logging for API calls"))
        .arg(debug_tag_flag("debug-db", "Debug logging for the database layer"))
        .arg(debug_tag_flag("debug-config", "Debug logging for configuration"))
        .subcommand(
            with_deal_args(
                Command::new("add")
                    .about("Record a new deal")
                    .arg(
                        Arg::new("commodity")
                            .long("commodity")
                            .value_name("TYPE")
                            .required(true)
                            .help("Commodity type (gold, copper, wheat, ...)")
                    )
                    .arg(
                        Arg::new("text")
                            .long("text")
                            .value_name("TEXT")
                            .help("Raw deal text as received")
                    )
            )
        )
        .subcommand(
            Command::new("list")
                .about("List tracked deals")
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_name("STATUS")
                        .help("Filter by workflow status")
                )
                .arg(
                    Arg::new("commodity")
                        .long("commodity")
                        .value_name("TYPE")
                        .help("Filter by commodity type")
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32))
                        .help("Maximum rows to return")
                )
                .arg(json_flag())
        )
        .subcommand(
            Command::new("show")
                .about("Show one deal with its stored analysis")
                .arg(deal_id_arg())
                .arg(json_flag())
        )
        .subcommand(
            Command::new("score")
                .about("Score a deal with the AI analyst")
                .arg(deal_id_arg())
                .arg(json_flag())
        )
        .subcommand(
            with_deal_args(
                Command::new("update")
                    .about("Update fields on an existing deal")
                    .arg(deal_id_arg())
                    .arg(
                        Arg::new("commodity")
                            .long("commodity")
                            .value_name("TYPE")
                            .help("Commodity type")
                    )
                    .arg(
                        Arg::new("text").long("text").value_name("TEXT").help("Raw deal text")
                    )
            )
        )
        .subcommand(
            Command::new("status")
                .about("Set the workflow status of a deal")
                .arg(deal_id_arg())
                .arg(
                    Arg::new("status")
                        .value_name("STATUS")
                        .required(true)
                        .help("New status (unassigned, reviewing, negotiating, closed, rejected)")
                )
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a deal permanently")
                .arg(deal_id_arg())
                .arg(
                    Arg::new("confirm")
                        .long("confirm")
                        .action(ArgAction::SetTrue)
                        .help("Confirm deletion (required)")
                )
        )
        .subcommand(
            Command::new("stats").about("Aggregate statistics over the deal book").arg(json_flag())
        )
        .subcommand(
            Command::new("sources")
                .about("List and manage deal sources")
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .action(ArgAction::SetTrue)
                        .help("Load the starter source list")
                )
                .arg(
                    Arg::new("add")
                        .long("add")
                        .value_name("NAME")
                        .help("Add or update a source by name")
                )
                .arg(
                    Arg::new("rating")
                        .long("rating")
                        .value_name("0-10")
                        .value_parser(clap::value_parser!(i64))
                        .help("Reliability rating for --add")
                )
                .arg(
                    Arg::new("notes")
                        .long("notes")
                        .value_name("NOTES")
                        .help("Notes for --add")
                )
        )
}

fn debug_tag_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).global(true).help(help)
}

fn json_flag() -> Arg {
    Arg::new("json").long("json").action(ArgAction::SetTrue).help("Print JSON instead of text")
}

fn deal_id_arg() -> Arg {
    Arg::new("id")
        .value_name("ID")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help("Deal id")
}

/// Pricing mode: the explicit flag wins, otherwise LME discount is
/// inferred from the presence of discount percentages
fn price_type_from(matches: &ArgMatches, gross: Option<f64>, net: Option<f64>) -> Option<PriceType> {
    if let Some(raw) = matches.get_one::<String>("price-type") {
        return PriceType::parse(raw);
    }
    if gross.is_some() || net.is_some() {
        Some(PriceType::LmeDiscount)
    } else {
        None
    }
}

/// Deal fields shared between `add` and `update`
fn with_deal_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("source").long("source").value_name("NAME").help("Source contact or desk"))
        .arg(
            Arg::new("reliability")
                .long("reliability")
                .value_name("0-10")
                .value_parser(clap::value_parser!(i64))
                .help("Source reliability rating")
        )
        .arg(
            Arg::new("price")
                .long("price")
                .value_name("PRICE")
                .value_parser(clap::value_parser!(f64))
                .help("Fixed price")
        )
        .arg(
            Arg::new("currency")
                .long("currency")
                .value_name("CUR")
                .help("Price currency (default USD)")
        )
        .arg(
            Arg::new("quantity")
                .long("quantity")
                .value_name("QTY")
                .value_parser(clap::value_parser!(f64))
                .help("Quantity on offer")
        )
        .arg(Arg::new("unit").long("unit").value_name("UNIT").help("Quantity unit (MT, kg, bbl)"))
        .arg(Arg::new("origin").long("origin").value_name("COUNTRY").help("Origin country"))
        .arg(
            Arg::new("payment")
                .long("payment")
                .value_name("METHOD")
                .help("Payment method (SBLC, LC, DLC, wire)")
        )
        .arg(
            Arg::new("shipping")
                .long("shipping")
                .value_name("TERMS")
                .help("Shipping terms (CIF, FOB, DDP)")
        )
        .arg(Arg::new("notes").long("notes").value_name("NOTES").help("Additional notes"))
        .arg(
            Arg::new("price-type")
                .long("price-type")
                .value_name("TYPE")
                .value_parser(["fixed_price", "lme_discount"])
                .help("Pricing mode (inferred from --gross/--net when omitted)")
        )
        .arg(
            Arg::new("gross")
                .long("gross")
                .value_name("PCT")
                .value_parser(clap::value_parser!(f64))
                .help("LME gross discount percent (switches to LME pricing)")
        )
        .arg(
            Arg::new("commission")
                .long("commission")
                .value_name("PCT")
                .value_parser(clap::value_parser!(f64))
                .help("LME commission percent")
        )
        .arg(
            Arg::new("net")
                .long("net")
                .value_name("PCT")
                .value_parser(clap::value_parser!(f64))
                .help("LME net discount percent")
        )
}

// ===== COMMANDS =====

fn cmd_add(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let gross = matches.get_one::<f64>("gross").copied();
    let commission = matches.get_one::<f64>("commission").copied();
    let net = matches.get_one::<f64>("net").copied();
    let price_type = price_type_from(matches, gross, net);

    let deal = NewDeal {
        commodity_type: matches.get_one::<String>("commodity").cloned().unwrap_or_default(),
        source_name: matches.get_one::<String>("source").cloned().unwrap_or_default(),
        source_reliability: matches.get_one::<i64>("reliability").copied(),
        deal_text: matches.get_one::<String>("text").cloned().unwrap_or_default(),
        price: matches.get_one::<f64>("price").copied(),
        price_currency: matches.get_one::<String>("currency").cloned(),
        quantity: matches.get_one::<f64>("quantity").copied(),
        quantity_unit: matches.get_one::<String>("unit").cloned(),
        origin_country: matches.get_one::<String>("origin").cloned(),
        payment_method: matches.get_one::<String>("payment").cloned(),
        shipping_terms: matches.get_one::<String>("shipping").cloned(),
        additional_notes: matches.get_one::<String>("notes").cloned(),
        date_received: None,
        status: None,
        price_type,
        gross_discount: gross,
        commission,
        net_discount: net,
    };

    let id = db.insert_deal(&deal)?;
    logger::info(LogTag::Deals, &format!("📥 Recorded deal {} ({})", id, deal.commodity_type));
    println!("✅ Deal {} recorded", id);
    Ok(())
}

fn cmd_list(
    db: &Database,
    config: &Config,
    matches: &ArgMatches
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = DealFilter {
        status: matches.get_one::<String>("status").cloned(),
        commodity_type: matches.get_one::<String>("commodity").cloned(),
        limit: matches
            .get_one::<u32>("limit")
            .copied()
            .or(Some(config.general.default_list_limit)),
    };

    let deals = db.list_deals(&filter)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&deals)?);
        return Ok(());
    }

    if deals.is_empty() {
        println!("No deals found. Use 'add' to record one.");
        return Ok(());
    }

    println!("📋 {} deal(s):\n", deals.len());
    for deal in &deals {
        let score = deal.ai_score.map(|s| format!("{:>3}", s)).unwrap_or_else(|| "  -".to_string());
        println!(
            "#{:<5} {:<12} {:<14} {:<20} score {}  {}",
            deal.id,
            deal.status,
            deal.commodity_type,
            deal.source_name,
            score,
            deal.date_received.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn cmd_show(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = *matches.get_one::<i64>("id").unwrap();

    let deal = match db.get_deal(id)? {
        Some(deal) => deal,
        None => {
            println!("❌ Deal {} not found", id);
            std::process::exit(1);
        }
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&deal)?);
        return Ok(());
    }

    print_deal(&deal);

    if let Some(analysis_json) = &deal.ai_analysis {
        match serde_json::from_str::<DealAnalysis>(analysis_json) {
            Ok(analysis) => print_analysis(&analysis),
            Err(e) => println!("\n⚠️  Stored analysis could not be parsed: {}", e),
        }
    } else {
        println!("\n🤖 Not scored yet. Run 'score {}' to analyze.", id);
    }
    Ok(())
}

async fn cmd_score(
    db: Arc<Database>,
    config: &Config,
    matches: &ArgMatches
) -> Result<(), Box<dyn std::error::Error>> {
    let id = *matches.get_one::<i64>("id").unwrap();

    let scorer = DealScorer::from_config(db, config)?;

    println!("🤖 Scoring deal {}... (this can take a minute)", id);
    let outcome = scorer.score_deal(id).await;

    if !outcome.success {
        println!(
            "❌ Scoring failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".to_string())
        );
        std::process::exit(1);
    }

    let analysis = outcome.analysis.expect("successful outcome always carries an analysis");

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }
    Ok(())
}

fn cmd_update(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = *matches.get_one::<i64>("id").unwrap();

    let gross = matches.get_one::<f64>("gross").copied();
    let commission = matches.get_one::<f64>("commission").copied();
    let net = matches.get_one::<f64>("net").copied();

    let patch = DealUpdate {
        commodity_type: matches.get_one::<String>("commodity").cloned(),
        source_name: matches.get_one::<String>("source").cloned(),
        source_reliability: matches.get_one::<i64>("reliability").copied(),
        deal_text: matches.get_one::<String>("text").cloned(),
        price: matches.get_one::<f64>("price").copied(),
        price_currency: matches.get_one::<String>("currency").cloned(),
        quantity: matches.get_one::<f64>("quantity").copied(),
        quantity_unit: matches.get_one::<String>("unit").cloned(),
        origin_country: matches.get_one::<String>("origin").cloned(),
        payment_method: matches.get_one::<String>("payment").cloned(),
        shipping_terms: matches.get_one::<String>("shipping").cloned(),
        additional_notes: matches.get_one::<String>("notes").cloned(),
        status: None,
        price_type: price_type_from(matches, gross, net),
        gross_discount: gross,
        commission,
        net_discount: net,
    };

    if db.update_deal(id, &patch)? {
        println!("✅ Deal {} updated", id);
    } else {
        println!("❌ Deal {} not found or nothing to update", id);
    }
    Ok(())
}

fn cmd_status(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = *matches.get_one::<i64>("id").unwrap();
    let status = matches.get_one::<String>("status").unwrap();

    if db.update_deal_status(id, status)? {
        logger::info(LogTag::Deals, &format!("🔄 Deal {} moved to {}", id, status));
        println!("✅ Deal {} status set to {}", id, status);
    } else {
        println!("❌ Deal {} not found", id);
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_delete(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let id = *matches.get_one::<i64>("id").unwrap();

    if !matches.get_flag("confirm") {
        println!("⚠️  This permanently deletes deal {}. Re-run with --confirm.", id);
        return Ok(());
    }

    if db.delete_deal(id)? {
        logger::info(LogTag::Deals, &format!("🗑️ Deal {} deleted", id));
        println!("✅ Deal {} deleted", id);
    } else {
        println!("❌ Deal {} not found", id);
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_stats(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let stats = db.get_statistics()?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("📊 Deal Statistics");
    println!("   Total deals:      {}", stats.total_deals);
    println!("   Average AI score: {:.2}", stats.avg_score);

    if !stats.by_status.is_empty() {
        println!("\n   By status:");
        for entry in &stats.by_status {
            println!("     {:<14} {}", entry.status, entry.count);
        }
    }

    if !stats.top_commodities.is_empty() {
        println!("\n   Top commodities:");
        for entry in &stats.top_commodities {
            println!("     {:<14} {}", entry.commodity_type, entry.count);
        }
    }
    Ok(())
}

fn cmd_sources(db: &Database, matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    if matches.get_flag("seed") {
        let inserted = db.seed_default_sources()?;
        println!("🌱 Seeded {} default source(s)", inserted);
    }

    if let Some(name) = matches.get_one::<String>("add") {
        let rating = matches.get_one::<i64>("rating").copied();
        let notes = matches.get_one::<String>("notes").map(|s| s.as_str());
        let id = db.upsert_source(name, rating, notes)?;
        println!("✅ Source '{}' saved (id {})", name, id);
    }

    let sources = db.list_sources()?;
    if sources.is_empty() {
        println!("No sources recorded. Use 'sources --seed' to load the starter list.");
        return Ok(());
    }

    println!("👥 {} source(s):\n", sources.len());
    for source in sources {
        let rating = source.reliability_rating
            .map(|r| format!("{}/10", r))
            .unwrap_or_else(|| "unrated".to_string());
        println!("   {:<20} {}", source.name, rating);
        if let Some(notes) = &source.notes {
            println!("      {}", notes);
        }
    }
    Ok(())
}

fn cmd_overview(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let stats = db.get_statistics()?;
    println!("📊 DealDesk - {} deal(s) tracked", stats.total_deals);

    if let Some(deal) = db.latest_deal()? {
        let score = deal.ai_score
            .map(|s| format!("scored {}/100", s))
            .unwrap_or_else(|| "not scored".to_string());
        println!("🕐 Latest: #{} {} from {} ({}, {})", deal.id, deal.commodity_type, deal.source_name, deal.status, score);
    }

    println!("\nRun 'dealdesk --help' for the command list.");
    Ok(())
}

// ===== DISPLAY HELPERS =====

fn print_deal(deal: &Deal) {
    println!("📋 Deal #{} - {}", deal.id, deal.commodity_type);
    println!("   Status:     {}", deal.status);
    let reliability = deal.source_reliability
        .map(|r| format!("{}/10", r))
        .unwrap_or_else(|| "unrated".to_string());
    println!("   Source:     {} ({})", deal.source_name, reliability);
    println!("   Price:      {}", price_display(deal));
    if let Some(quantity) = deal.quantity {
        println!("   Quantity:   {} {}", quantity, deal.quantity_unit.as_deref().unwrap_or(""));
    }
    if let Some(origin) = &deal.origin_country {
        println!("   Origin:     {}", origin);
    }
    if let Some(payment) = &deal.payment_method {
        println!("   Payment:    {}", payment);
    }
    if let Some(shipping) = &deal.shipping_terms {
        println!("   Shipping:   {}", shipping);
    }
    println!("   Received:   {}", deal.date_received.format("%Y-%m-%d %H:%M UTC"));
    if !deal.deal_text.is_empty() {
        println!("\n   {}", deal.deal_text);
    }
    if let Some(notes) = &deal.additional_notes {
        println!("\n   Notes: {}", notes);
    }
}

fn price_display(deal: &Deal) -> String {
    match deal.price_type {
        PriceType::LmeDiscount =>
            format!(
                "LME discount (gross {}%, commission {}%, net {}%)",
                opt_number(deal.gross_discount),
                opt_number(deal.commission),
                opt_number(deal.net_discount)
            ),
        PriceType::FixedPrice =>
            match deal.price {
                Some(price) => format!("{} {}", price, deal.price_currency),
                None => "not specified".to_string(),
            }
    }
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}

fn print_analysis(analysis: &DealAnalysis) {
    println!("\n🤖 Score: {}/100   Risk: {}", analysis.score, analysis.risk_level.as_str());

    println!("\n📝 Executive Summary");
    println!("{}", analysis.executive_summary);

    print_section("📈 Market Analysis", &analysis.market_analysis);
    print_section("🌍 Origin Analysis", &analysis.origin_analysis);
    print_section("🏭 Buyer Profile", &analysis.buyer_profile);
    print_section("💰 Price Analysis", &analysis.price_analysis);
    print_section("🚢 Payment & Logistics", &analysis.payment_logistics);

    print_list("🚩 Red Flags", &analysis.red_flags);
    print_list("❓ Unusual Patterns", &analysis.unusual_patterns);
    print_list("💪 Strengths", &analysis.strengths);
    print_list("👉 Next Steps", &analysis.next_steps);
    print_list("🧠 Reasoning", &analysis.reasoning);

    println!("\n✅ Recommendation: {}", analysis.recommendation);
}

fn print_section(title: &str, body: &str) {
    if !body.is_empty() {
        println!("\n{}", title);
        println!("{}", body);
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}", title);
    for item in items {
        println!("   • {}", item);
    }
}
