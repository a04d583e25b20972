use chrono::{DateTime, Utc};
use futures::future::try_join_all;

use crate::campaign::CampaignFilter;
use crate::database::Database;
use crate::error::Error;
use crate::format::Locale;

use super::overview::{compute_overview, Totals};
use super::trends::{build_trend_series, trailing_months, TREND_MONTHS};
use super::{aggregate_period, BaselineStrategy, OverviewStats, PeriodStats, TrendSeries};

#[tracing::instrument(skip(db))]
pub async fn get_period_stats(
    db: &dyn Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<PeriodStats, Error> {
    if end < start {
        return Err(Error::invalid_field("end", "must not be before start"));
    }

    let campaigns = db
        .campaigns()
        .fetch_campaigns(&CampaignFilter::overlapping(start, end))
        .await?;

    Ok(aggregate_period(start, end, &campaigns))
}

#[tracing::instrument(skip(db))]
pub async fn get_trends(
    db: &dyn Database,
    now: DateTime<Utc>,
    locale: Locale,
) -> Result<TrendSeries, Error> {
    let windows = trailing_months(now, TREND_MONTHS)?;

    // try_join_all keeps the input order, so months stay oldest first
    let months = try_join_all(windows.into_iter().map(|window| async move {
        let filter = CampaignFilter::overlapping(window.start, window.end);
        let campaigns = db.campaigns().fetch_campaigns(&filter).await?;

        Ok::<_, Error>((window, aggregate_period(window.start, window.end, &campaigns)))
    }))
    .await?;

    Ok(build_trend_series(&months, locale))
}

#[tracing::instrument(skip(db))]
pub async fn get_overview(
    db: &dyn Database,
    now: DateTime<Utc>,
    strategy: BaselineStrategy,
    locale: Locale,
) -> Result<OverviewStats, Error> {
    let campaigns = db.campaigns().fetch_campaigns(&CampaignFilter::all()).await?;

    let baseline = strategy.baseline(&Totals::of(&campaigns), &campaigns, now)?;

    Ok(compute_overview(&campaigns, &baseline, locale))
}
