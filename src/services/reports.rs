//! Grouped totals over `amount_base`.

use std::fmt;
use std::str::FromStr;

use sqlx::{Pool, Sqlite};
use thiserror::Error;

use crate::database::db::queries;
use crate::database::models::SummaryRow;
use crate::util::{from_cents, iso};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported group_by value: {0}")]
pub struct UnsupportedGrouping(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Category,
    Date,
}

impl GroupBy {
    /// Picks a grouping from a request key. Missing or blank keys mean `Category`.
    pub fn select(key: Option<&str>) -> Result<Self, UnsupportedGrouping> {
        match key.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(k) => k.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Date => "date",
        }
    }

    pub async fn summarize(&self, pool: &Pool<Sqlite>) -> Result<Vec<SummaryRow>, sqlx::Error> {
        let rows: Vec<SummaryRow> = match self {
            Self::Category => queries::totals_by_category(pool)
                .await?
                .into_iter()
                .map(|(category, cents)| SummaryRow { key: category, total: from_cents(cents) })
                .collect(),
            Self::Date => queries::totals_by_spent_at(pool)
                .await?
                .into_iter()
                .map(|(day, cents)| SummaryRow { key: iso(&day), total: from_cents(cents) })
                .collect(),
        };
        Ok(rows)
    }
}

impl FromStr for GroupBy {
    type Err = UnsupportedGrouping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "category" => Ok(Self::Category),
            "date" => Ok(Self::Date),
            other => Err(UnsupportedGrouping(other.to_string())),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
