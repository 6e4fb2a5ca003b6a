use chrono::NaiveDate;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::str::FromStr;

use expense_tracker_lite::config::Settings;
use expense_tracker_lite::database::db::{connection, migrate, queries};
use expense_tracker_lite::database::models::NewExpense;
use expense_tracker_lite::services::reports::GroupBy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    /* ==========Smoke run========== */
    let settings = Settings::from_env()?;
    let pool = connection::get_db_pool(&settings.database_url, settings.db_max_connections).await?;

    println!("Connected. Server time: {}", connection::server_time(&pool).await?);

    migrate::run_migrations(&pool).await?;
    println!("Migrations ran successfully!");

    // ----------------------------------------------------
    // TEST：CREATE EXPENSE
    // ----------------------------------------------------
    println!("\n--- Testing: create_expense ---");
    let spent_at = NaiveDate::from_ymd_opt(2025, 10, 25).expect("valid date");
    let sample = NewExpense {
        amount_cents: 2345,
        currency: "USD".into(),
        amount_base_cents: 2345,
        base_currency: settings.base_currency.clone(),
        category: "smoke-test".into(),
        description: Some("sample lunch".into()),
        spent_at,
    };
    let created = queries::create_expense(&pool, &sample).await?;
    println!("   > Inserted row: {:?}", created);
    assert!(created.id > 0, "Failed to create expense, ID invalid.");
    assert_eq!(created.amount, Decimal::from_str("23.45")?);
    assert_eq!(created.amount_base, created.amount);

    println!("\n--- Testing: get_expense_by_id ---");
    let fetched = queries::get_expense_by_id(&pool, created.id).await?;
    println!("   > Acquired expense: {:?}", fetched);
    assert_eq!(fetched.as_ref(), Some(&created), "fetched expense does not match");

    println!("\n--- Testing: list_expenses ---");
    let listed = queries::list_expenses(&pool, Some("smoke-test")).await?;
    println!("   > Number of smoke-test expenses: {}", listed.len());
    assert!(listed.iter().any(|e| e.id == created.id));
    assert!(listed.iter().all(|e| e.category == "smoke-test"));

    // ----------------------------------------------------
    // TEST：SUMMARIES
    // ----------------------------------------------------
    for group_by in [GroupBy::Category, GroupBy::Date] {
        println!("\n--- Testing: summary by {group_by} ---");
        let rows = group_by.summarize(&pool).await?;
        for row in &rows {
            println!("   > {:<12} {}", row.key, row.total);
        }
        assert!(!rows.is_empty(), "summary by {group_by} is empty");
    }

    // ----------------------------------------------------
    // TEST：DELETE EXPENSE
    // ----------------------------------------------------
    println!("\n--- Testing: delete_expense ---");
    assert!(queries::delete_expense(&pool, created.id).await?);
    assert!(queries::get_expense_by_id(&pool, created.id).await?.is_none());
    assert!(!queries::delete_expense(&pool, created.id).await?);
    println!("   > Deleted expense {}", created.id);

    println!("\nAll smoke checks passed.");
    Ok(())
}
