use actix_web::get;
use actix_web::web::{Data, Json, Query};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::Database;
use crate::error::Error;
use crate::utils::deserialize_date;

use super::{manager, OverviewStats, PeriodStats, TrendSeries};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeriodQueryBody {
    #[serde(deserialize_with = "deserialize_date")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    pub end: DateTime<Utc>,
}

#[get("/campaigns/stats/overview")]
#[tracing::instrument(skip(db, config))]
pub async fn get_overview_stats(
    db: Data<Box<dyn Database>>,
    config: Data<Config>,
) -> Result<Json<OverviewStats>, Error> {
    let overview = manager::get_overview(&***db, Utc::now(), config.baseline, config.locale).await?;

    Ok(Json(overview))
}

#[get("/campaigns/stats/trends")]
#[tracing::instrument(skip(db, config))]
pub async fn get_trend_stats(
    db: Data<Box<dyn Database>>,
    config: Data<Config>,
) -> Result<Json<TrendSeries>, Error> {
    let trends = manager::get_trends(&***db, Utc::now(), config.locale).await?;

    Ok(Json(trends))
}

#[get("/campaigns/stats/period")]
#[tracing::instrument(skip(db))]
pub async fn get_period_stats(
    db: Data<Box<dyn Database>>,
    query: Query<PeriodQueryBody>,
) -> Result<Json<PeriodStats>, Error> {
    let PeriodQueryBody { start, end } = query.into_inner();

    let stats = manager::get_period_stats(&***db, start, end).await?;

    Ok(Json(stats))
}
