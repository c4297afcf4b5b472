//! # Client Health Scoring Engine
//!
//! A 1-10 payment reliability score per client, as of any date.
//!
//! ## Scoring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Health Score (as of D)                             │
//! │                                                                         │
//! │  invoices ──► belongs to client? ──► issued on or before D? ──┐         │
//! │                                                               │         │
//! │        none left ──► 10 (new clients start perfect)           │         │
//! │                                                               ▼         │
//! │  score = 10                                                             │
//! │                                                                         │
//! │  Overdue (pending at D, due before D), every invoice:                   │
//! │     > 30 days  −4      > 7 days  −2      otherwise  −1                  │
//! │                                                                         │
//! │  Late payers (5 most recent payments on or before D):                   │
//! │     paid more than 1 day after due:  > 7 days late  −1                  │
//! │                                      otherwise      −0.5                │
//! │                                                                         │
//! │  clamp(score, 1, 10)                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scores move in half points, so they are tallied in half-point units and
//! only converted for display.
//!
//! ## Trend
//! Six points: month end of each of the five previous calendar months, then
//! today. A payment made after a point's date does not count at that point.

use std::cmp::Reverse;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::dates::{days_between, end_of_month_before, month_label};
use crate::money::Money;
use crate::types::{ClientLinked, ClientRecord, InvoiceRecord, InvoiceStatus};
use crate::{RECENT_PAYMENTS_WINDOW, TREND_MONTHS};

/// Half points in a full score point.
const HALF_POINTS: i32 = 2;

const MAX_SCORE_HALVES: i32 = 10 * HALF_POINTS;
const MIN_SCORE_HALVES: i32 = HALF_POINTS;

/// Days of grace after the due date before a payment counts as late.
const LATE_PAYMENT_GRACE_DAYS: i64 = 1;

// =============================================================================
// Health Score
// =============================================================================

/// Payment reliability score in `[1, 10]`, in steps of 0.5.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthScore(f64);

/// Display bucket for a health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum HealthRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthScore {
    /// The score of a client with a spotless record.
    pub const PERFECT: HealthScore = HealthScore(10.0);

    fn from_half_points(halves: i32) -> Self {
        let clamped = halves.clamp(MIN_SCORE_HALVES, MAX_SCORE_HALVES);
        HealthScore(clamped as f64 / HALF_POINTS as f64)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// ```rust
    /// use billbook_core::health::{HealthRating, HealthScore};
    ///
    /// assert_eq!(HealthScore::PERFECT.rating(), HealthRating::Excellent);
    /// ```
    pub fn rating(&self) -> HealthRating {
        match self.0 {
            s if s >= 8.0 => HealthRating::Excellent,
            s if s >= 6.0 => HealthRating::Good,
            s if s >= 4.0 => HealthRating::Fair,
            _ => HealthRating::Poor,
        }
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.1}", self.0)
        }
    }
}

impl fmt::Display for HealthRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthRating::Excellent => "excellent",
            HealthRating::Good => "good",
            HealthRating::Fair => "fair",
            HealthRating::Poor => "poor",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Penalties
// =============================================================================

/// Half-point penalty for an invoice `days_overdue` past its due date.
fn overdue_penalty(days_overdue: i64) -> i32 {
    match days_overdue {
        d if d > 30 => 4 * HALF_POINTS,
        d if d > 7 => 2 * HALF_POINTS,
        _ => HALF_POINTS,
    }
}

/// Half-point penalty for a payment `days_late` after the due date.
fn late_payment_penalty(days_late: i64) -> i32 {
    if days_late <= LATE_PAYMENT_GRACE_DAYS {
        0
    } else if days_late > 7 {
        HALF_POINTS
    } else {
        1
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Scores `client` as of `as_of`.
///
/// Invoices issued after `as_of` are ignored entirely. Only `pending`
/// invoices draw the overdue penalty, along with paid invoices whose payment
/// date lies after `as_of`.
pub fn health_score(client: &ClientRecord, invoices: &[InvoiceRecord], as_of: NaiveDate) -> HealthScore {
    let history: Vec<&InvoiceRecord> = invoices
        .iter()
        .filter(|invoice| invoice.belongs_to(client) && invoice.issue_date <= as_of)
        .collect();

    if history.is_empty() {
        return HealthScore::PERFECT;
    }

    let overdue: i32 = history
        .iter()
        .filter(|invoice| invoice.is_unpaid_as_of(as_of) && invoice.due_date < as_of)
        .map(|invoice| overdue_penalty(days_between(as_of, invoice.due_date)))
        .sum();

    let mut payments: Vec<(&InvoiceRecord, NaiveDate)> = history
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Paid)
        .filter_map(|invoice| invoice.payment_date.map(|paid| (*invoice, paid)))
        .filter(|(_, paid)| *paid <= as_of)
        .collect();
    payments.sort_by_key(|(_, paid)| Reverse(*paid));

    let late: i32 = payments
        .iter()
        .take(RECENT_PAYMENTS_WINDOW)
        .map(|(invoice, paid)| late_payment_penalty(days_between(*paid, invoice.due_date)))
        .sum();

    let score = HealthScore::from_half_points(MAX_SCORE_HALVES - overdue - late);
    debug!(
        client = %client.name,
        %as_of,
        invoices = history.len(),
        overdue_halves = overdue,
        late_halves = late,
        score = %score,
        "Health score computed"
    );
    score
}

/// One point of a health trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScorePoint {
    /// Month label (`"Mar"`).
    pub label: String,
    #[ts(as = "String")]
    pub as_of: NaiveDate,
    pub score: HealthScore,
}

/// Score at the end of each of the five previous months, then today.
pub fn health_trend(client: &ClientRecord, invoices: &[InvoiceRecord], today: NaiveDate) -> Vec<ScorePoint> {
    let months_back = TREND_MONTHS.saturating_sub(1) as u32;
    (0..=months_back)
        .rev()
        .map(|back| {
            let as_of = if back == 0 {
                today
            } else {
                end_of_month_before(today, back)
            };
            ScorePoint {
                label: month_label(as_of.month()).to_string(),
                as_of,
                score: health_score(client, invoices, as_of),
            }
        })
        .collect()
}

// =============================================================================
// Client Summary
// =============================================================================

/// Client aggregates recomputed from invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientSummary {
    pub client_id: String,
    pub client_name: String,
    pub total_invoices: u32,
    /// Billed across every invoice that was not cancelled.
    pub total_amount: Money,
    /// Balance still due on outstanding invoices.
    pub outstanding: Money,
}

pub fn client_summary(client: &ClientRecord, invoices: &[InvoiceRecord]) -> ClientSummary {
    let mut summary = ClientSummary {
        client_id: client.id.clone(),
        client_name: client.name.clone(),
        total_invoices: 0,
        total_amount: Money::zero(),
        outstanding: Money::zero(),
    };

    for invoice in invoices.iter().filter(|invoice| invoice.belongs_to(client)) {
        if invoice.status == InvoiceStatus::Cancelled {
            continue;
        }
        summary.total_invoices += 1;
        summary.total_amount += invoice.total();
        if invoice.status.is_outstanding() {
            summary.outstanding += invoice.balance_due();
        }
    }

    summary
}

// =============================================================================
// Unit Tests
// =============================================================================
