use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use moneypal::{initialize_db, is_db_initialized, reset_db};

/// A utility for creating the database tables of MoneyPal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "MONEYPAL_DB_PATH")]
    db_path: String,

    /// Clear existing data and create new tables.
    #[arg(long)]
    force: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    println!("Opening database at {db_path:#?}");
    let connection = Connection::open(db_path)?;

    if args.force {
        println!("Dropping existing tables...");
        reset_db(&connection)?;
    } else if is_db_initialized(&connection)? {
        eprintln!(
            "The database at {db_path:#?} is already initialized. Use --force to clear existing data and create new tables."
        );
        exit(1);
    } else {
        initialize_db(&connection)?;
    }

    println!("Success!");

    Ok(())
}
