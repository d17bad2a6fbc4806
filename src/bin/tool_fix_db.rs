// Repair malformed AI reasoning left behind by earlier builds.
//
// Some historical rows hold a Python-style list repr in ai_reasoning
// instead of JSON. Those are unrecoverable and get reset to an empty
// list; anything that parses as JSON is left alone.
use clap::{ Arg, ArgAction, Command };
use dealdesk::database::Database;
use dealdesk::logger::{ log, LogTag };

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("tool_fix_db")
        .version("1.0")
        .about("Repair malformed AI reasoning data in the deals database")
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Report what would change without writing")
        )
        .get_matches();
    let dry_run = matches.get_flag("dry-run");

    let db = Database::open_default()?;
    let rows = db.scored_deal_rows()?;
    println!("Found {} deals with AI scores", rows.len());

    let mut repaired = 0;
    for row in &rows {
        if let Some(reasoning) = row.ai_reasoning.as_deref().filter(|r| !r.is_empty()) {
            // A leading ' quote is a Python repr, never valid JSON. A
            // leading " is how real JSON string arrays start, so those go
            // through the parse check like everything else.
            if reasoning.starts_with("['") {
                if !dry_run {
                    db.reset_reasoning(row.id)?;
                }
                log(LogTag::Db, "FIX", &format!("Fixed deal {} - cleared corrupted reasoning", row.id));
                repaired += 1;
            } else if serde_json::from_str::<serde_json::Value>(reasoning).is_err() {
                if !dry_run {
                    db.reset_reasoning(row.id)?;
                }
                log(LogTag::Db, "FIX", &format!("Fixed deal {} - cleared invalid reasoning", row.id));
                repaired += 1;
            } else {
                log(LogTag::Db, "OK", &format!("Deal {} - reasoning is valid JSON", row.id));
            }
        }

        if let Some(analysis) = row.ai_analysis.as_deref().filter(|a| !a.is_empty()) {
            if serde_json::from_str::<serde_json::Value>(analysis).is_ok() {
                log(LogTag::Db, "OK", &format!("Deal {} - analysis is valid JSON", row.id));
            } else {
                log(
                    LogTag::Db,
                    "WARNING",
                    &format!("Deal {} - analysis is invalid JSON (keeping as-is)", row.id)
                );
            }
        }
    }

    if dry_run {
        println!("\nDry run complete. {} deal(s) would be repaired.", repaired);
    } else {
        println!("\nDatabase cleanup complete! ({} repaired)", repaired);
    }
    Ok(())
}
