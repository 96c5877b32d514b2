//! Output hooks called after every change to the transaction list.

use std::io::{self, Write};

use crate::core::{BudgetStatus, DashboardStats, SearchHit, WeeklySummary};

/// Receives data to display. Implementations decide how it looks.
pub trait Renderer {
    /// Shows a transaction listing. `is_search_result` is true when the
    /// descriptions carry search highlighting.
    fn render(&mut self, transactions: &[SearchHit], is_search_result: bool) -> io::Result<()>;
    /// Shows the dashboard figures.
    fn render_stats(&mut self, stats: &DashboardStats) -> io::Result<()>;
}

const BAR_WIDTH: f64 = 30.0;

/// Plain text renderer writing aligned rows.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render_budget(&mut self, status: &BudgetStatus) -> io::Result<()> {
        writeln!(
            self.out,
            "Monthly budget: {} {:.2}",
            status.currency, status.budget
        )?;
        if status.is_over_budget() {
            writeln!(
                self.out,
                "{} {:.2} over budget",
                status.currency,
                status.overspend()
            )
        } else {
            writeln!(
                self.out,
                "{} {:.2} remaining",
                status.currency, status.remaining
            )
        }
    }

    /// Seven rows of `#` bars scaled to the busiest day.
    pub fn render_week(&mut self, week: &WeeklySummary) -> io::Result<()> {
        writeln!(
            self.out,
            "{} to {}: {} transactions, {:.2} total",
            week.start, week.end, week.count, week.total
        )?;
        let peak = week.peak();
        for day in &week.days {
            let len = if peak > 0.0 {
                (day.total / peak * BAR_WIDTH).round() as usize
            } else {
                0
            };
            writeln!(
                self.out,
                "{} {:<width$} {:.2}",
                day.date.format("%a %m-%d"),
                "#".repeat(len),
                day.total,
                width = BAR_WIDTH as usize
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, transactions: &[SearchHit], is_search_result: bool) -> io::Result<()> {
        if transactions.is_empty() {
            return writeln!(self.out, "No transactions.");
        }
        for hit in transactions {
            let t = &hit.transaction;
            let description = if is_search_result {
                &hit.highlighted_description
            } else {
                &hit.original_description
            };
            writeln!(
                self.out,
                "{:<20} {:<10} {:>12.2} {:<14} {}",
                t.id, t.date, t.amount, t.category, description
            )?;
        }
        Ok(())
    }

    fn render_stats(&mut self, stats: &DashboardStats) -> io::Result<()> {
        writeln!(self.out, "Total transactions: {}", stats.total_transactions)?;
        writeln!(
            self.out,
            "Total spend: {} {:.2}",
            stats.currency, stats.total_spend
        )?;
        writeln!(self.out, "Top category: {}", stats.top_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Highlighter, NewTransaction, Store, search_with, stats};
    use chrono::{NaiveDate, Utc};

    fn output<F>(f: F) -> String
    where
        F: FnOnce(&mut TextRenderer<Vec<u8>>) -> io::Result<()>,
    {
        let mut r = TextRenderer::new(Vec::new());
        f(&mut r).unwrap();
        String::from_utf8(r.into_inner()).unwrap()
    }

    fn store() -> Store {
        let mut store = Store::default();
        store.add(
            NewTransaction {
                description: "Morning coffee run".into(),
                amount: 4.5,
                category: "Food".into(),
                date: "2024-03-15".into(),
            },
            Utc::now(),
        );
        store
    }

    #[test]
    fn search_results_show_highlights() {
        let store = store();
        let hits = search_with(store.list(), "coffee", &Highlighter::new("[", "]"));
        let text = output(|r| r.render(&hits, true));
        assert!(text.contains("Morning [coffee] run"));
        let text = output(|r| r.render(&hits, false));
        assert!(text.contains("Morning coffee run"));
    }

    #[test]
    fn empty_listing() {
        assert_eq!(output(|r| r.render(&[], false)), "No transactions.\n");
    }

    #[test]
    fn stats_block() {
        let stats = stats::compute(store().list(), &Default::default()).unwrap();
        let text = output(|r| r.render_stats(&stats));
        assert_eq!(
            text,
            "Total transactions: 1\nTotal spend: UGX 4.50\nTop category: Food\n"
        );
    }

    #[test]
    fn week_has_seven_rows() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let week = stats::weekly(store().list(), today);
        let text = output(|r| r.render_week(&week));
        assert_eq!(text.lines().count(), 8);
        assert!(text.lines().last().unwrap().contains(&"#".repeat(30)));
    }
}
