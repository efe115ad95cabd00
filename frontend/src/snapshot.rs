use crate::api::TransactionListing;
use crate::config::BalanceSource;
use crate::error::ApiError;

/// Balance, deposits and expenses shown in the dashboard header.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FinancialSnapshot {
    pub balance: f64,
    pub total_deposits: f64,
    pub total_expenses: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn between(previous: f64, current: f64) -> Option<Trend> {
        if current > previous {
            Some(Trend::Up)
        } else if current < previous {
            Some(Trend::Down)
        } else {
            None
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotView {
    Ready {
        snapshot: FinancialSnapshot,
        trend: Option<Trend>,
    },
    Failed,
}

impl Default for SnapshotView {
    fn default() -> Self {
        SnapshotView::Ready {
            snapshot: FinancialSnapshot::default(),
            trend: None,
        }
    }
}

impl FinancialSnapshot {
    pub fn from_listing(
        listing: &TransactionListing,
        source: BalanceSource,
    ) -> Result<Self, ApiError> {
        let total_expenses: f64 = listing.expenses.values().sum();
        let total_deposits: f64 = listing.deposits.iter().map(|(_, amount)| amount).sum();
        let balance = match source {
            BalanceSource::Computed => total_deposits - total_expenses,
            BalanceSource::Server => listing.balance.ok_or(ApiError::MissingField("balance"))?,
        };

        Ok(Self {
            balance,
            total_deposits,
            total_expenses,
        })
    }
}
