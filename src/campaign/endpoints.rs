use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, patch, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Error;
use crate::stats::Ratios;
use crate::utils::{deserialize_date, deserialize_optional_date};

use super::manager::{self, CampaignList, NewCampaign};
use super::{Campaign, CampaignFilter, CampaignId, CampaignStatus, Page};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignBody {
    pub name: String,
    pub advertiser: String,
    pub budget: f64,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<u64>,
}

impl From<CreateCampaignBody> for NewCampaign {
    fn from(body: CreateCampaignBody) -> NewCampaign {
        NewCampaign {
            name: body.name,
            advertiser: body.advertiser,
            budget: body.budget,
            start_date: body.start_date,
            end_date: body.end_date,
            status: body.status,
            impressions: body.impressions,
            clicks: body.clicks,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub advertiser: String,
    pub budget: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CampaignStatus,
    pub impressions: u64,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            advertiser: campaign.advertiser,
            budget: campaign.budget,
            start_date: campaign.start_date,
            end_date: campaign.end_date,
            status: campaign.status,
            impressions: campaign.impressions,
            clicks: campaign.clicks,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CampaignListBody {
    pub data: Vec<CampaignBody>,
    pub total: u64,
}

impl CampaignListBody {
    pub fn render(list: CampaignList) -> CampaignListBody {
        CampaignListBody {
            data: list.data.into_iter().map(CampaignBody::render).collect(),
            total: list.total,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCampaignsBody {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<CampaignStatus>,
    pub advertiser: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date_to: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date_to: Option<DateTime<Utc>>,
}

impl QueryCampaignsBody {
    pub fn into_parts(self) -> Result<(CampaignFilter, Page), Error> {
        let defaults = Page::default();
        let page = Page::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )?;

        let filter = CampaignFilter {
            status: self.status,
            advertiser: self.advertiser.filter(|advertiser| !advertiser.trim().is_empty()),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            start_date_from: self.start_date_from,
            start_date_to: self.start_date_to,
            end_date_from: self.end_date_from,
            end_date_to: self.end_date_to,
        };

        Ok((filter, page))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateStatusBody {
    pub status: CampaignStatus,
}

#[post("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    body: Json<CreateCampaignBody>,
) -> Result<Json<CampaignBody>, Error> {
    let body = body.into_inner();

    let campaign = manager::create_campaign(&***db, body.into()).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
    query: Query<QueryCampaignsBody>,
) -> Result<Json<CampaignListBody>, Error> {
    let (filter, page) = query.into_inner().into_parts()?;

    let list = manager::get_campaigns(&***db, filter, page).await?;

    Ok(Json(CampaignListBody::render(list)))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();

    let campaign = manager::get_campaign_by_id(&***db, campaign_id).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[patch("/campaigns/{campaign_id}/status")]
#[tracing::instrument(skip(db))]
pub async fn update_campaign_status(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
    body: Json<UpdateStatusBody>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let body = body.into_inner();

    let campaign = manager::update_campaign_status(&***db, campaign_id, body.status).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/campaigns/{campaign_id}/stats")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_stats(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<Ratios>, Error> {
    let campaign_id = params.into_inner();

    let stats = manager::get_campaign_stats(&***db, campaign_id).await?;

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn create_body_accepts_plain_dates() {
        let body: CreateCampaignBody = serde_json::from_str(
            r#"{
                "name": "Spring",
                "advertiser": "Nike",
                "budget": 1500,
                "startDate": "2024-03-01",
                "endDate": "2024-05-31T23:59:59.999Z"
            }"#,
        )
        .unwrap();

        assert_eq!(body.start_date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(body.status, None);
        assert_eq!(body.impressions, None);
    }

    #[test]
    fn query_defaults_to_first_page_of_ten() {
        let (filter, page) = QueryCampaignsBody::default().into_parts().unwrap();

        assert_eq!(filter, CampaignFilter::all());
        assert_eq!(page, Page::new(1, 10).unwrap());
    }

    #[test]
    fn query_rejects_zero_limit() {
        let query = QueryCampaignsBody {
            limit: Some(0),
            ..QueryCampaignsBody::default()
        };

        assert!(matches!(
            query.into_parts().unwrap_err(),
            Error::InvalidField { field: "limit", .. }
        ));
    }

    #[test]
    fn blank_advertiser_is_ignored() {
        let query = QueryCampaignsBody {
            advertiser: Some("  ".to_string()),
            status: Some(CampaignStatus::Paused),
            ..QueryCampaignsBody::default()
        };

        let (filter, _) = query.into_parts().unwrap();

        assert_eq!(filter.advertiser, None);
        assert_eq!(filter.status, Some(CampaignStatus::Paused));
    }
}
