use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::currency::CurrencyError;
use super::{Settings, Transaction};

/// Label used for the top category when there are no transactions.
pub const NO_CATEGORY: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_transactions: usize,
    /// Sum of all amounts, in `currency`.
    pub total_spend: f64,
    pub top_category: String,
    pub currency: String,
}

/// Computes the dashboard figures for `transactions`.
///
/// When two categories share the highest count the one that appears first
/// in `transactions` wins.
pub fn compute(
    transactions: &[Transaction],
    settings: &Settings,
) -> Result<DashboardStats, CurrencyError> {
    let total_base: f64 = transactions.iter().map(|t| t.amount).sum();
    let total_spend = settings.to_display(total_base)?;
    Ok(DashboardStats {
        total_transactions: transactions.len(),
        total_spend,
        top_category: top_category(transactions),
        currency: settings.default_currency.clone(),
    })
}

fn top_category(transactions: &[Transaction]) -> String {
    // (category, count) in first-seen order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for t in transactions {
        match counts.iter_mut().find(|(c, _)| *c == t.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((&t.category, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (category, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((category, n));
        }
    }
    best.map_or_else(|| NO_CATEGORY.to_string(), |(c, _)| c.to_string())
}

/// Monthly budget compared with what has been spent, in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget: f64,
    pub spent: f64,
    /// Negative when over budget.
    pub remaining: f64,
    pub currency: String,
}

impl BudgetStatus {
    pub fn has_budget(&self) -> bool {
        self.budget > 0.0
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining < 0.0
    }

    pub fn overspend(&self) -> f64 {
        if self.is_over_budget() {
            -self.remaining
        } else {
            0.0
        }
    }
}

pub fn budget_status(
    stats: &DashboardStats,
    settings: &Settings,
) -> Result<BudgetStatus, CurrencyError> {
    let budget = settings.to_display(settings.monthly_budget)?;
    Ok(BudgetStatus {
        budget,
        spent: stats.total_spend,
        remaining: budget - stats.total_spend,
        currency: settings.default_currency.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
    pub count: usize,
}

/// Spending over the seven days ending on `end`, amounts in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: f64,
    pub count: usize,
    /// One bucket per day, oldest first.
    pub days: Vec<DailyTotal>,
}

impl WeeklySummary {
    /// Largest daily total, used to scale bar charts.
    pub fn peak(&self) -> f64 {
        self.days.iter().map(|d| d.total).fold(0.0, f64::max)
    }
}

pub const WINDOW_DAYS: i64 = 7;

/// Trailing window `[today - 6 days, today]`, both ends inclusive.
pub fn weekly(transactions: &[Transaction], today: NaiveDate) -> WeeklySummary {
    let start = today - Duration::days(WINDOW_DAYS - 1);
    let mut days: Vec<DailyTotal> = (0..WINDOW_DAYS)
        .map(|offset| DailyTotal {
            date: start + Duration::days(offset),
            total: 0.0,
            count: 0,
        })
        .collect();

    for t in transactions {
        let Ok(date) = NaiveDate::parse_from_str(&t.date, "%Y-%m-%d") else {
            continue;
        };
        if date < start || date > today {
            continue;
        }
        let idx = (date - start).num_days() as usize;
        days[idx].total += t.amount;
        days[idx].count += 1;
    }

    WeeklySummary {
        start,
        end: today,
        total: days.iter().map(|d| d.total).sum(),
        count: days.iter().map(|d| d.count).sum(),
        days,
    }
}
