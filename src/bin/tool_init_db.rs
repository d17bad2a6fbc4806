// Create or recreate the deals database
use std::io::{ self, Write };

use clap::{ Arg, ArgAction, Command };
use dealdesk::database::Database;
use dealdesk::paths;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("tool_init_db")
        .version("1.0")
        .about("Create or recreate the DealDesk deals database")
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Recreate an existing database without asking")
        )
        .get_matches();

    println!("{}", "=".repeat(50));
    println!("DATABASE INITIALIZATION");
    println!("{}", "=".repeat(50));

    paths::ensure_all_directories()?;
    let db_path = paths::get_deals_db_path();

    if db_path.exists() {
        println!("⚠️  Database already exists at: {}", db_path.display());

        if !matches.get_flag("force") {
            print!("Do you want to recreate it? (y/n): ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if input.trim().to_lowercase() != "y" {
                println!("❌ Initialization cancelled.");
                return Ok(());
            }
        }

        // Remove the WAL sidecar files along with the database itself
        for file in paths::get_db_with_wal_files(db_path.clone()) {
            if file.exists() {
                std::fs::remove_file(&file)?;
            }
        }
        println!("✅ Old database deleted.");
    }

    println!("\n📦 Creating database at: {}", db_path.display());
    println!("🔨 Creating tables...");
    let db = Database::new(&db_path)?;
    println!("✅ Tables created successfully!");

    let seeded = db.seed_default_sources()?;
    println!("🌱 Seeded {} default source(s)", seeded);

    println!("\n🔍 Verifying tables...");
    let tables = db.table_names()?;
    if tables.is_empty() {
        println!("❌ No tables found! Something went wrong.");
    } else {
        println!("✅ Found {} tables:", tables.len());
        for table in &tables {
            let count = db.table_row_count(table)?;
            println!("   - {} ({} rows)", table, count);
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("✅ DATABASE INITIALIZATION COMPLETE");
    println!("{}", "=".repeat(50));
    println!("\nYour database is ready at: {}", db_path.display());
    println!("\nNext steps:");
    println!("1. Run test_database to exercise the store");
    println!("2. Track deals with the dealdesk CLI");

    Ok(())
}
