//! Campaign analytics: overlap-weighted period totals, six-month trends and
//! the global overview.
//!
//! The computations are pure functions over a slice of campaigns; `manager`
//! is the only place that talks to the store.

use serde::Serialize;

pub mod endpoints;
pub mod manager;
pub mod overview;
pub mod period;
pub mod trends;
pub use endpoints::*;
pub use overview::{Baseline, BaselineStrategy, OverviewStats};
pub use period::{aggregate_period, PeriodStats};
pub use trends::TrendSeries;

/// Click-through rate and cost per click derived from raw totals.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Ratios {
    /// Percentage of impressions that were clicked.
    pub ctr: f64,
    pub cpc: f64,
}

impl Ratios {
    pub fn from_totals(impressions: f64, clicks: f64, budget: f64) -> Ratios {
        Ratios {
            ctr: click_through_rate(impressions, clicks),
            cpc: cost_per_click(budget, clicks),
        }
    }
}

pub fn click_through_rate(impressions: f64, clicks: f64) -> f64 {
    if impressions > 0.0 {
        clicks / impressions * 100.0
    } else {
        0.0
    }
}

pub fn cost_per_click(budget: f64, clicks: f64) -> f64 {
    if clicks > 0.0 {
        budget / clicks
    } else {
        0.0
    }
}

/// Signed percentage change from `previous` to `current`, 0 without a baseline.
pub fn growth(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_fall_back_to_zero() {
        assert_eq!(Ratios::from_totals(0.0, 0.0, 100.0), Ratios { ctr: 0.0, cpc: 0.0 });
        assert_eq!(Ratios::from_totals(0.0, 5.0, 100.0).cpc, 20.0);
        assert_eq!(Ratios::from_totals(200.0, 0.0, 100.0).ctr, 0.0);
    }

    #[test]
    fn growth_is_signed_and_guarded() {
        assert_eq!(growth(125.0, 100.0), 25.0);
        assert_eq!(growth(50.0, 100.0), -50.0);
        assert_eq!(growth(50.0, 0.0), 0.0);
    }

    #[test]
    fn rounding_keeps_requested_places() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.71828, 3), 2.718);
        assert_eq!(round_to(3.0927835, 1), 3.1);
    }
}
