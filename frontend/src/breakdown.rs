use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::format::Currency;

pub const NO_EXPENSES_MESSAGE: &str = "No expense data available for this month.";

/// Numbered per-category expense listing with a grand total, or the no-data
/// message when there are no expenses.
pub fn render_breakdown(
    expenses: &IndexMap<String, f64>,
    today: NaiveDate,
    currency: &Currency,
) -> String {
    if expenses.is_empty() {
        return NO_EXPENSES_MESSAGE.to_string();
    }

    let mut out = format!(
        "Expense Breakdown Till {}:\n\n",
        today.format("%A, %B %-d, %Y")
    );
    for (index, (category, amount)) in expenses.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}: {}\n",
            index + 1,
            category,
            currency.format(*amount)
        ));
    }

    let total: f64 = expenses.values().sum();
    out.push_str(&format!("\nTotal Expenses: {}", currency.format(total)));
    out
}
