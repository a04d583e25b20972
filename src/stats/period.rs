use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::campaign::Campaign;

use super::Ratios;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeriodStats {
    pub impressions: u64,
    pub clicks: u64,
    pub budget: f64,
    pub ctr: f64,
    pub cpc: f64,
}

/// Fraction of the campaign's run that falls inside `[window_start,
/// window_end]`, or `None` when nothing overlaps or the campaign has no
/// positive duration.
pub fn overlap_proportion(
    campaign: &Campaign,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Option<f64> {
    let overlap_start = campaign.start_date.max(window_start);
    let overlap_end = campaign.end_date.min(window_end);
    let overlap = (overlap_end - overlap_start).num_milliseconds().max(0);
    let duration = (campaign.end_date - campaign.start_date).num_milliseconds();

    if overlap <= 0 || duration <= 0 {
        return None;
    }

    Some(overlap as f64 / duration as f64)
}

/// Attributes to the window each campaign's share of impressions, clicks and
/// budget, weighted by how much of its run the window covers.
///
/// Campaigns are expected to already intersect the window; anything that
/// doesn't, or that has a zero or negative duration, contributes nothing.
/// Impressions and clicks are rounded per campaign before summing while the
/// budget keeps its fractional part.
pub fn aggregate_period(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    campaigns: &[Campaign],
) -> PeriodStats {
    let mut impressions = 0u64;
    let mut clicks = 0u64;
    let mut budget = 0.0;

    for campaign in campaigns {
        let proportion = match overlap_proportion(campaign, window_start, window_end) {
            Some(proportion) => proportion,
            None => continue,
        };

        impressions += (campaign.impressions as f64 * proportion).round() as u64;
        clicks += (campaign.clicks as f64 * proportion).round() as u64;
        budget += campaign.budget * proportion;
    }

    debug!(
        %window_start,
        %window_end,
        campaigns = campaigns.len(),
        impressions,
        clicks,
        "aggregated period"
    );

    let Ratios { ctr, cpc } = Ratios::from_totals(impressions as f64, clicks as f64, budget);

    PeriodStats {
        impressions,
        clicks,
        budget,
        ctr,
        cpc,
    }
}
