// src/stats.rs
//! Spending statistics derived from an entry snapshot.
//!
//! Nothing in here touches storage. Callers pass in `EntryStore::all()` (or any
//! slice of entries) and get plain values back.
//!
//! Amounts go through [`parse_amount`]; anything that does not parse counts as
//! zero, but the entry still counts as "a day with an entry" for streaks.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use log;
use serde::Serialize;
use serde_json::Value;

use crate::datekey::{self, month_key_of, parse_date_key, previous_month_key};
use crate::error::{AmountError, DateKeyResult};
use crate::models::Entry;

/// Reads a stored amount. JSON numbers and numeric strings are accepted.
pub fn parse_amount(value: &Value) -> Result<f64, AmountError> {
    let parsed = match value {
        Value::Null => return Err(AmountError::Missing),
        Value::Number(number) => number.as_f64().ok_or(AmountError::NotFinite)?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(AmountError::Missing);
            }
            text.parse::<f64>()
                .map_err(|_| AmountError::NotANumber(text.to_string()))?
        }
        Value::Bool(_) => return Err(AmountError::Unsupported("boolean".to_string())),
        Value::Array(_) => return Err(AmountError::Unsupported("array".to_string())),
        Value::Object(_) => return Err(AmountError::Unsupported("object".to_string())),
    };
    if !parsed.is_finite() {
        return Err(AmountError::NotFinite);
    }
    Ok(parsed)
}

pub fn amount_or_zero(entry: &Entry) -> f64 {
    parse_amount(&entry.amount).unwrap_or_else(|e| {
        log::debug!("Entry {} has an unusable amount ({}); counting it as 0", entry.id, e);
        0.0
    })
}

/// Lexicographic maximum of the valid date keys, as a month key.
/// Falls back to the month containing `today` when there are none.
pub fn latest_month_as_of(entries: &[Entry], today: NaiveDate) -> String {
    entries
        .iter()
        .map(|entry| entry.date.as_str())
        .filter(|date| parse_date_key(date).is_ok())
        .max()
        .and_then(month_key_of)
        .map(str::to_string)
        .unwrap_or_else(|| datekey::month_key(today))
}

pub fn latest_month(entries: &[Entry]) -> String {
    latest_month_as_of(entries, datekey::today())
}

pub fn entries_in_month<'a>(entries: &'a [Entry], month_key: &str) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|entry| month_key_of(&entry.date) == Some(month_key))
        .collect()
}

pub fn monthly_total<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> f64 {
    entries.into_iter().map(amount_or_zero).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodTotal {
    pub name: String,
    pub total: f64,
}

/// Summed amount per food name, in the order each name first appears.
pub fn group_by_food<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<FoodTotal> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<FoodTotal> = Vec::new();
    for entry in entries {
        let amount = amount_or_zero(entry);
        if let Some(&index) = positions.get(entry.food_name.as_str()) {
            totals[index].total += amount;
            continue;
        }
        positions.insert(entry.food_name.as_str(), totals.len());
        totals.push(FoodTotal {
            name: entry.food_name.clone(),
            total: amount,
        });
    }
    totals
}

/// Highest total first; equal totals keep their relative order.
pub fn sorted_by_total(mut totals: Vec<FoodTotal>) -> Vec<FoodTotal> {
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// The food with the largest total. Ties go to whichever appeared first.
pub fn top_item<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Option<FoodTotal> {
    group_by_food(entries)
        .into_iter()
        .fold(None, |best: Option<FoodTotal>, candidate| match best {
            Some(current) if candidate.total <= current.total => Some(current),
            _ => Some(candidate),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub month: String,
    pub previous_month: String,
    pub current_total: f64,
    pub previous_total: f64,
    pub delta: f64,
    /// `None` when the previous month had no spending.
    pub percent_change: Option<f64>,
}

/// Compares `month_key` with the calendar month right before it.
pub fn month_over_month_delta(entries: &[Entry], month_key: &str) -> DateKeyResult<MonthComparison> {
    let previous_month = previous_month_key(month_key)?;
    let current_total = monthly_total(entries_in_month(entries, month_key));
    let previous_total = monthly_total(entries_in_month(entries, &previous_month));
    let delta = current_total - previous_total;
    let percent_change = (previous_total != 0.0).then(|| delta / previous_total * 100.0);
    Ok(MonthComparison {
        month: month_key.to_string(),
        previous_month,
        current_total,
        previous_total,
        delta,
        percent_change,
    })
}

fn entry_days(entries: &[Entry]) -> BTreeSet<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| parse_date_key(&entry.date).ok())
        .collect()
}

/// Entry-free days ending at `today`, walking backward.
///
/// The walk never goes before the earliest recorded day, so an empty journal
/// has a streak of 0 instead of an unbounded one.
pub fn no_junk_streak(entries: &[Entry], today: NaiveDate) -> u32 {
    let days = entry_days(entries);
    let Some(&earliest) = days.first() else {
        return 0;
    };
    let mut streak = 0;
    let mut day = today;
    while day >= earliest && !days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Days with at least one entry, ending at `today`, walking backward.
pub fn junk_streak(entries: &[Entry], today: NaiveDate) -> u32 {
    let days = entry_days(entries);
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest entry-free run between the earliest recorded day and `today`.
pub fn best_no_junk_streak(entries: &[Entry], today: NaiveDate) -> u32 {
    let days = entry_days(entries);
    let Some(&earliest) = days.first() else {
        return 0;
    };
    let mut best: u32 = 0;
    let mut run: u32 = 0;
    let mut day = earliest;
    while day <= today {
        if days.contains(&day) {
            run = 0;
        } else {
            run += 1;
            best = best.max(run);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub no_junk: u32,
    pub junk: u32,
    pub best_no_junk: u32,
}

pub fn streaks(entries: &[Entry], today: NaiveDate) -> Streaks {
    Streaks {
        no_junk: no_junk_streak(entries, today),
        junk: junk_streak(entries, today),
        best_no_junk: best_no_junk_streak(entries, today),
    }
}

/// Entries that carry a photo, optionally limited to one month.
pub fn gallery<'a>(entries: &'a [Entry], month_key: Option<&str>) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|entry| entry.has_image())
        .filter(|entry| {
            month_key.map_or(true, |month| month_key_of(&entry.date) == Some(month))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub count: usize,
    pub total: f64,
}

pub fn day_summary<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> DaySummary {
    entries
        .into_iter()
        .fold(DaySummary { count: 0, total: 0.0 }, |summary, entry| DaySummary {
            count: summary.count + 1,
            total: summary.total + amount_or_zero(entry),
        })
}

/// Everything the stats view shows for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub total: f64,
    pub foods: Vec<FoodTotal>,
    pub top_item: Option<FoodTotal>,
    pub comparison: MonthComparison,
}

pub fn month_report(entries: &[Entry], month_key: &str) -> DateKeyResult<MonthReport> {
    let comparison = month_over_month_delta(entries, month_key)?;
    let in_month = entries_in_month(entries, month_key);
    Ok(MonthReport {
        month: month_key.to_string(),
        total: comparison.current_total,
        foods: sorted_by_total(group_by_food(in_month.iter().copied())),
        top_item: top_item(in_month),
        comparison,
    })
}
