use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::campaign::{Campaign, CampaignFilter, CampaignStatus};
use crate::error::Error;
use crate::format::{format_currency, format_large_number, Locale};

use super::trends::MonthWindow;
use super::{aggregate_period, click_through_rate, cost_per_click, growth, round_to};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub active_campaigns: u64,
    pub total_campaigns: u64,
    pub total_impressions: u64,
    pub total_impressions_formatted: String,
    pub impressions_growth: f64,
    pub total_clicks: u64,
    pub total_clicks_formatted: String,
    pub clicks_growth: f64,
    #[serde(rename = "averageCTR")]
    pub average_ctr: f64,
    pub ctr_growth: f64,
    pub total_budget: f64,
    pub total_budget_formatted: String,
    #[serde(rename = "averageCPC")]
    pub average_cpc: f64,
}

/// Unweighted sums over every campaign, regardless of dates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Totals {
    pub campaigns: u64,
    pub active_campaigns: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub budget: f64,
}

impl Totals {
    pub fn of(campaigns: &[Campaign]) -> Totals {
        campaigns.iter().fold(Totals::default(), |mut totals, campaign| {
            totals.campaigns += 1;
            if campaign.status == CampaignStatus::Active {
                totals.active_campaigns += 1;
            }
            totals.impressions += campaign.impressions;
            totals.clicks += campaign.clicks;
            totals.budget += campaign.budget;
            totals
        })
    }

    pub fn ctr(&self) -> f64 {
        click_through_rate(self.impressions as f64, self.clicks as f64)
    }

    pub fn cpc(&self) -> f64 {
        cost_per_click(self.budget, self.clicks as f64)
    }
}

/// The "previous period" figures growth is measured against.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Baseline {
    pub impressions: f64,
    pub clicks: f64,
    pub ctr: f64,
}

/// How the overview's previous-period baseline is obtained.
///
/// No historical snapshots are kept, so `Synthetic` shrinks the current
/// totals by fixed ratios. Its growth figures are constant by construction
/// and only approximate a real comparison. `PriorMonthEnd` instead estimates
/// the cumulative totals as they stood at the end of the previous calendar
/// month, attributing each campaign linearly over its run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BaselineStrategy {
    Synthetic { volume_ratio: f64, ctr_ratio: f64 },
    PriorMonthEnd,
}

impl Default for BaselineStrategy {
    fn default() -> BaselineStrategy {
        BaselineStrategy::Synthetic {
            volume_ratio: 0.8,
            ctr_ratio: 0.97,
        }
    }
}

impl FromStr for BaselineStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<BaselineStrategy, String> {
        match s.to_ascii_lowercase().as_str() {
            "synthetic" => Ok(BaselineStrategy::default()),
            "prior-month-end" => Ok(BaselineStrategy::PriorMonthEnd),
            other => Err(format!(
                "unknown baseline '{}', expected 'synthetic' or 'prior-month-end'",
                other
            )),
        }
    }
}

impl BaselineStrategy {
    pub fn baseline(
        &self,
        totals: &Totals,
        campaigns: &[Campaign],
        now: DateTime<Utc>,
    ) -> Result<Baseline, Error> {
        match *self {
            BaselineStrategy::Synthetic {
                volume_ratio,
                ctr_ratio,
            } => Ok(Baseline {
                impressions: totals.impressions as f64 * volume_ratio,
                clicks: totals.clicks as f64 * volume_ratio,
                ctr: totals.ctr() * ctr_ratio,
            }),
            BaselineStrategy::PriorMonthEnd => {
                let cutoff = MonthWindow::containing(now)?.back(1)?.end;
                let earliest = match campaigns.iter().map(|c| c.start_date).min() {
                    Some(earliest) if earliest <= cutoff => earliest,
                    _ => return Ok(Baseline::default()),
                };

                let filter = CampaignFilter::overlapping(earliest, cutoff);
                let started: Vec<Campaign> = campaigns
                    .iter()
                    .filter(|campaign| filter.matches(campaign))
                    .cloned()
                    .collect();
                let stats = aggregate_period(earliest, cutoff, &started);

                Ok(Baseline {
                    impressions: stats.impressions as f64,
                    clicks: stats.clicks as f64,
                    ctr: stats.ctr,
                })
            }
        }
    }
}

/// Global KPIs over `campaigns`, with growth measured against `baseline`.
pub fn compute_overview(campaigns: &[Campaign], baseline: &Baseline, locale: Locale) -> OverviewStats {
    let totals = Totals::of(campaigns);
    let ctr = totals.ctr();

    OverviewStats {
        active_campaigns: totals.active_campaigns,
        total_campaigns: totals.campaigns,
        total_impressions: totals.impressions,
        total_impressions_formatted: format_large_number(totals.impressions as f64, locale),
        impressions_growth: round_to(growth(totals.impressions as f64, baseline.impressions), 1),
        total_clicks: totals.clicks,
        total_clicks_formatted: format_large_number(totals.clicks as f64, locale),
        clicks_growth: round_to(growth(totals.clicks as f64, baseline.clicks), 1),
        average_ctr: round_to(ctr, 3),
        ctr_growth: round_to(growth(ctr, baseline.ctr), 1),
        total_budget: totals.budget,
        total_budget_formatted: format_currency(totals.budget, locale, false),
        average_cpc: round_to(totals.cpc(), 2),
    }
}
