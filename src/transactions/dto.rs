use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    transactions::{
        repo_types::{DateRange, TransactionFilter, TransactionKind, TransactionPatch},
        services::NewTransaction,
    },
};

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub category_id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl CreateTransactionRequest {
    pub fn into_new(self) -> AppResult<NewTransaction> {
        check_amount(self.amount)?;
        Ok(NewTransaction {
            category_id: self.category_id,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            date: self.date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl UpdateTransactionRequest {
    pub fn into_patch(self) -> AppResult<TransactionPatch> {
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        Ok(TransactionPatch {
            category_id: self.category_id,
            amount: self.amount,
            kind: self.kind,
            description: self.description,
            date: self.date,
        })
    }
}

fn check_amount(amount: f64) -> AppResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(AppError::validation("amount must be greater than 0"))
    }
}

/// `GET /transactions` query. Values are kept as strings so that an empty
/// parameter (`?type=`) reads as absent instead of failing to parse.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListTransactionsQuery {
    pub fn into_filter(self) -> AppResult<TransactionFilter> {
        let kind = present(&self.kind)
            .map(|v| v.parse::<TransactionKind>().map_err(AppError::Validation))
            .transpose()?;
        let category_id = present(&self.category_id)
            .map(|v| {
                Uuid::parse_str(v).map_err(|_| AppError::validation("category_id must be a UUID"))
            })
            .transpose()?;
        Ok(TransactionFilter {
            kind,
            category_id,
            range: date_range(&self.start_date, &self.end_date)?,
            limit: non_negative("limit", &self.limit)?,
            offset: non_negative("offset", &self.offset)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SummaryQuery {
    pub fn into_range(self) -> AppResult<DateRange> {
        date_range(&self.start_date, &self.end_date)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn non_negative(name: &str, value: &Option<String>) -> AppResult<Option<i64>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(AppError::validation(format!("{name} must be a non-negative integer"))),
    }
}

fn date_range(start: &Option<String>, end: &Option<String>) -> AppResult<DateRange> {
    Ok(DateRange {
        start: present(start)
            .map(|v| parse_bound(v, "start_date", false))
            .transpose()?,
        end: present(end)
            .map(|v| parse_bound(v, "end_date", true))
            .transpose()?,
    })
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` covering the whole UTC day.
fn parse_bound(value: &str, name: &str, end_of_day: bool) -> AppResult<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(ts);
    }
    let invalid = || AppError::validation(format!("{name} must be RFC 3339 or YYYY-MM-DD"));
    let day = Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())?;
    let at = if end_of_day {
        day.with_hms_nano(23, 59, 59, 999_999_999).map_err(|_| invalid())?
    } else {
        day.midnight()
    };
    Ok(at.assume_utc())
}
