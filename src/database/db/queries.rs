use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::database::models::{Expense, NewExpense};
use crate::util::from_cents;

/*
This file contains the SQL for the expenses table:
create, read and delete logic plus the two grouped totals.
Money columns hold cents; conversion to Decimal happens in map_expense.
 */

fn map_expense(row: &SqliteRow) -> Result<Expense, sqlx::Error> {
    Ok(Expense {
        id: row.try_get("id")?,
        amount: from_cents(row.try_get("amount_cents")?),
        currency: row.try_get("currency")?,
        amount_base: from_cents(row.try_get("amount_base_cents")?),
        base_currency: row.try_get("base_currency")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        spent_at: row.try_get("spent_at")?,
        created_at: row.try_get("created_at")?,
    })
}

/*==========Expense Queries=========== */

// Create expense, created_at is stamped here
pub async fn create_expense(pool: &Pool<Sqlite>, new: &NewExpense) -> Result<Expense, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO expenses (
            amount_cents, currency, amount_base_cents, base_currency,
            category, description, spent_at, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING
            id, amount_cents, currency, amount_base_cents, base_currency,
            category, description, spent_at, created_at
        "#,
    )
    .bind(new.amount_cents)
    .bind(&new.currency)
    .bind(new.amount_base_cents)
    .bind(&new.base_currency)
    .bind(&new.category)
    .bind(&new.description)
    .bind(new.spent_at)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    map_expense(&row)
}

// List expenses, newest spend first; exact category match when given
pub async fn list_expenses(
    pool: &Pool<Sqlite>,
    category: Option<&str>,
) -> Result<Vec<Expense>, sqlx::Error> {
    let rows = match category {
        Some(category) => {
            sqlx::query(
                r#"
                SELECT
                    id, amount_cents, currency, amount_base_cents, base_currency,
                    category, description, spent_at, created_at
                FROM expenses
                WHERE category = ?
                ORDER BY spent_at DESC, id DESC
                "#,
            )
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT
                    id, amount_cents, currency, amount_base_cents, base_currency,
                    category, description, spent_at, created_at
                FROM expenses
                ORDER BY spent_at DESC, id DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(map_expense).collect()
}

// Get expense by id
pub async fn get_expense_by_id(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT
            id, amount_cents, currency, amount_base_cents, base_currency,
            category, description, spent_at, created_at
        FROM expenses
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .as_ref()
    .map(map_expense)
    .transpose()
}

// Delete expense, false when the id does not exist
pub async fn delete_expense(pool: &Pool<Sqlite>, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/*==========Summary Queries=========== */

// Sum of amount_base_cents per category
pub async fn totals_by_category(pool: &Pool<Sqlite>) -> Result<Vec<(String, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT category, SUM(amount_base_cents) AS total_cents
        FROM expenses
        GROUP BY category
        ORDER BY category
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<(String, i64), sqlx::Error> {
            Ok((r.try_get("category")?, r.try_get("total_cents")?))
        })
        .collect()
}

// Sum of amount_base_cents per spent_at day
pub async fn totals_by_spent_at(pool: &Pool<Sqlite>) -> Result<Vec<(NaiveDate, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT spent_at, SUM(amount_base_cents) AS total_cents
        FROM expenses
        GROUP BY spent_at
        ORDER BY spent_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<(NaiveDate, i64), sqlx::Error> {
            Ok((r.try_get("spent_at")?, r.try_get("total_cents")?))
        })
        .collect()
}
