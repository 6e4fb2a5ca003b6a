// src/backend/handlers.rs
use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{Expense, NewExpense, SummaryRow};
use crate::error::ApiError;
use crate::services::currency_client::RateError;
use crate::services::reports::GroupBy;
use crate::util::{from_cents, normalize_currency, to_cents, today, MAX_AMOUNT_CENTS};

const MAX_CATEGORY_CHARS: usize = 64;

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateExpense {
    pub amount: Decimal,
    pub currency: Option<String>,   // falls back to DEFAULT_CURRENCY
    pub category: String,
    pub description: Option<String>,
    pub spent_at: Option<NaiveDate>, // falls back to today
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateParams {
    #[serde(default, deserialize_with = "flag")]
    pub convert_to_base: Option<bool>,
}

// Query flags take the usual spellings: 1/0, true/false, yes/no, on/off, any case.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(Some(true)),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(Some(false)),
        _ => Err(serde::de::Error::custom(format!("{raw:?} is not a boolean flag"))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub group_by: Option<String>,
}

// Checks everything that does not need the store or the FX API.
fn validate(
    payload: CreateExpense,
    default_currency: &str,
    base_currency: &str,
) -> Result<NewExpense, ApiError> {
    if payload.amount <= Decimal::ZERO {
        return Err(ApiError::validation("amount must be greater than 0"));
    }
    let amount_cents = match to_cents(payload.amount) {
        Some(c) if c <= 0 => return Err(ApiError::validation("amount must be at least 0.01")),
        Some(c) if c <= MAX_AMOUNT_CENTS => c,
        _ => return Err(ApiError::validation("amount is too large")),
    };

    let raw_currency = payload.currency.as_deref().unwrap_or(default_currency);
    let currency = normalize_currency(raw_currency).ok_or_else(|| {
        ApiError::validation(format!("currency {raw_currency:?} must be a 3 to 8 character code"))
    })?;

    if payload.category.trim().is_empty() {
        return Err(ApiError::validation("category is required"));
    }
    if payload.category.chars().count() > MAX_CATEGORY_CHARS {
        return Err(ApiError::validation(format!(
            "category must be at most {MAX_CATEGORY_CHARS} characters"
        )));
    }

    Ok(NewExpense {
        amount_cents,
        currency,
        amount_base_cents: amount_cents,
        base_currency: base_currency.to_string(),
        category: payload.category,
        description: payload.description,
        spent_at: payload.spent_at.unwrap_or_else(today),
    })
}

// amount * rate, rounded half away from zero to cents
fn convert_cents(amount_cents: i64, rate: f64) -> Result<i64, RateError> {
    let rate_dec = Decimal::from_str(&rate.to_string())
        .map_err(|_| RateError::Unavailable(format!("rate {rate} is out of range")))?;

    from_cents(amount_cents)
        .checked_mul(rate_dec)
        .and_then(to_cents)
        .ok_or_else(|| RateError::Unavailable(format!("rate {rate} is out of range")))
}

pub async fn create_expense(
    State(state): State<AppState>,
    Query(params): Query<CreateParams>,
    Json(payload): Json<CreateExpense>,
) -> Result<Json<Expense>, ApiError> {
    let settings = &state.settings;
    let mut new = validate(payload, &settings.default_currency, &settings.base_currency)?;

    if params.convert_to_base.unwrap_or(true) {
        let rate = state.rates.get_rate(&new.currency, &new.base_currency).await?;
        new.amount_base_cents = convert_cents(new.amount_cents, rate)?;
    }

    let expense = queries::create_expense(&state.db, &new).await?;
    info!(
        "created expense {} ({} {} -> {} {})",
        expense.id, expense.amount, expense.currency, expense.amount_base, expense.base_currency
    );

    Ok(Json(expense))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let category = params.category.as_deref().filter(|c| !c.is_empty());
    let expenses = queries::list_expenses(&state.db, category).await?;
    Ok(Json(expenses))
}

pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<SummaryRow>>, ApiError> {
    let group_by = GroupBy::select(params.group_by.as_deref())?;
    let rows = group_by.summarize(&state.db).await?;
    Ok(Json(rows))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, ApiError> {
    queries::get_expense_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !queries::delete_expense(&state.db, id).await? {
        return Err(ApiError::NotFound);
    }
    info!("deleted expense {id}");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(amount: &str) -> CreateExpense {
        CreateExpense {
            amount: Decimal::from_str(amount).unwrap(),
            currency: None,
            category: "food".into(),
            description: None,
            spent_at: None,
        }
    }

    #[test]
    fn validate_applies_defaults() {
        let new = validate(payload("12.5"), "CAD", "USD").unwrap();
        assert_eq!(new.amount_cents, 1250);
        assert_eq!(new.currency, "CAD");
        assert_eq!(new.base_currency, "USD");
        assert_eq!(new.amount_base_cents, 1250);
        assert_eq!(new.spent_at, today());
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert!(matches!(validate(payload("0"), "CAD", "CAD"), Err(ApiError::Validation(_))));
        assert!(matches!(validate(payload("-3"), "CAD", "CAD"), Err(ApiError::Validation(_))));
        assert!(matches!(validate(payload("0.001"), "CAD", "CAD"), Err(ApiError::Validation(_))));
        assert!(matches!(
            validate(payload("10000000000"), "CAD", "CAD"),
            Err(ApiError::Validation(_))
        ));

        let mut p = payload("1");
        p.currency = Some("x".into());
        assert!(matches!(validate(p, "CAD", "CAD"), Err(ApiError::Validation(_))));

        let mut p = payload("1");
        p.category = "   ".into();
        assert!(matches!(validate(p, "CAD", "CAD"), Err(ApiError::Validation(_))));

        let mut p = payload("1");
        p.category = "c".repeat(65);
        assert!(matches!(validate(p, "CAD", "CAD"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn convert_flag_accepts_common_spellings() {
        let parse = |q: &str| {
            let uri: axum::http::Uri = format!("/expenses?{q}").parse().unwrap();
            Query::<CreateParams>::try_from_uri(&uri).map(|Query(p)| p.convert_to_base)
        };

        assert_eq!(parse("").unwrap(), None);
        for v in ["true", "1", "True", "YES", "on"] {
            assert_eq!(parse(&format!("convert_to_base={v}")).unwrap(), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "Off", "F"] {
            assert_eq!(parse(&format!("convert_to_base={v}")).unwrap(), Some(false), "{v}");
        }
        assert!(parse("convert_to_base=maybe").is_err());
    }

    #[test]
    fn conversion_rounds_to_cents() {
        assert_eq!(convert_cents(10000, 1.37).unwrap(), 13700);
        // 23.45 * 1.3333 = 31.265885
        assert_eq!(convert_cents(2345, 1.3333).unwrap(), 3127);
        // 0.05 * 0.5 = 0.025 -> 0.03
        assert_eq!(convert_cents(5, 0.5).unwrap(), 3);
        assert!(convert_cents(100, 1e300).is_err());
    }
}
