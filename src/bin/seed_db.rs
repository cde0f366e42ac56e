use std::{
    error::Error,
    fs::OpenOptions,
    path::{Path, PathBuf},
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker::{
    CategoryService, CreateCategoryData, CreateTransactionData, SQLiteCategoryStore,
    SQLiteTransactionStore, TransactionKind, TransactionService, create_user, initialize_db,
};

/// A utility for creating and populating a database for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    db_path: PathBuf,

    /// Email address of the user that owns the sample data.
    #[arg(long, default_value = "test@example.com")]
    email: String,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

const DEFAULT_CATEGORIES: [&str; 5] = ["Groceries", "Rent", "Eating Out", "Travel", "Wages"];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(args.log_file.as_deref())?;

    let db_path = args.db_path.as_path();

    match db_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if db_path.is_file() {
        eprintln!("File already exists at {db_path:#?}!");
        exit(1);
    }

    tracing::info!("Creating database at {db_path:#?}");
    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let user = create_user(&args.email, &connection)?;
    tracing::info!("Created user {} ({})", user.id, user.email);

    let connection = Arc::new(Mutex::new(connection));
    let categories = SQLiteCategoryStore::new(connection.clone());
    let category_service = CategoryService::new(categories.clone());
    let transaction_service =
        TransactionService::new(SQLiteTransactionStore::new(connection), categories);

    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for title in DEFAULT_CATEGORIES {
        let category = category_service.create(
            CreateCategoryData {
                title: title.to_owned(),
            },
            user.id,
        )?;
        created.push(category);
    }

    let samples = [
        ("Pay day", TransactionKind::Income, 2500.0, "Wages"),
        ("Weekly shop", TransactionKind::Expense, 184.32, "Groceries"),
        ("Rent", TransactionKind::Expense, 650.0, "Rent"),
        ("Pizza", TransactionKind::Expense, 24.5, "Eating Out"),
    ];

    for (title, kind, amount, category_title) in samples {
        let category_id = created
            .iter()
            .find(|category| category.title.as_ref() == category_title)
            .map(|category| category.id);

        transaction_service.create(
            CreateTransactionData {
                title: title.to_owned(),
                kind,
                amount,
                category_id,
            },
            user.id,
        )?;
    }

    let income = transaction_service.find_all_by_type(user.id, TransactionKind::Income)?;
    let expenses = transaction_service.find_all_by_type(user.id, TransactionKind::Expense)?;

    tracing::info!(
        "Created {} categories and {} transactions (income: {income:.2}, expenses: {expenses:.2})",
        category_service.find_all(user.id)?.len(),
        transaction_service.find_all(user.id)?.len(),
    );

    Ok(())
}

/// Log to stdout at the level set by `RUST_LOG` (default `info`), and at the
/// debug level to `log_file` if given.
fn setup_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();

    Ok(())
}
