use chrono::{DateTime, SubsecRound, Utc};

use crate::database::Database;
use crate::error::Error;
use crate::stats::Ratios;

use super::{Campaign, CampaignFilter, CampaignId, CampaignStatus, Page};

const MAX_NAME_LENGTH: usize = 100;
const MAX_ADVERTISER_LENGTH: usize = 50;

#[derive(Clone, Debug)]
pub struct NewCampaign {
    pub name: String,
    pub advertiser: String,
    pub budget: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: Option<CampaignStatus>,
    pub impressions: Option<u64>,
    pub clicks: Option<u64>,
}

impl NewCampaign {
    fn validate(&self) -> Result<(), Error> {
        validate_text("name", &self.name, MAX_NAME_LENGTH)?;
        validate_text("advertiser", &self.advertiser, MAX_ADVERTISER_LENGTH)?;

        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(Error::invalid_field(
                "budget",
                "must be a number greater than or equal to 0",
            ));
        }
        if self.end_date <= self.start_date {
            return Err(Error::invalid_field("end_date", "must be after start_date"));
        }

        Ok(())
    }
}

fn validate_text(field: &'static str, value: &str, max_length: usize) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_field(field, "is required"));
    }
    if value.chars().count() > max_length {
        return Err(Error::invalid_field(
            field,
            format!("must not exceed {} characters", max_length),
        ));
    }

    Ok(())
}

#[derive(Clone, Debug)]
pub struct CampaignList {
    pub data: Vec<Campaign>,
    pub total: u64,
}

#[tracing::instrument(skip(db))]
pub async fn create_campaign(db: &dyn Database, new: NewCampaign) -> Result<Campaign, Error> {
    new.validate()?;

    let now = Utc::now().trunc_subsecs(3);
    let campaign = Campaign {
        id: CampaignId::new(),
        name: new.name,
        advertiser: new.advertiser,
        budget: new.budget,
        start_date: new.start_date,
        end_date: new.end_date,
        status: new.status.unwrap_or_default(),
        impressions: new.impressions.unwrap_or(0),
        clicks: new.clicks.unwrap_or(0),
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: &dyn Database,
    filter: CampaignFilter,
    page: Page,
) -> Result<CampaignList, Error> {
    let total = db.campaigns().count_campaigns(&filter).await?;
    let data = db.campaigns().fetch_campaigns_page(&filter, page).await?;

    Ok(CampaignList { data, total })
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignDoesNotExist { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign_status(
    db: &dyn Database,
    campaign_id: CampaignId,
    status: CampaignStatus,
) -> Result<Campaign, Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;
    if campaign.status == status {
        return Err(Error::CampaignAlreadyInStatus {
            campaign_id,
            status,
        });
    }

    db.campaigns()
        .update_campaign_status(campaign, status)
        .await
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_stats(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Ratios, Error> {
    let campaign = get_campaign_by_id(db, campaign_id).await?;

    Ok(Ratios::from_totals(
        campaign.impressions as f64,
        campaign.clicks as f64,
        campaign.budget,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::database::MemoryDatabase;

    fn new_campaign(name: &str) -> NewCampaign {
        NewCampaign {
            name: name.to_string(),
            advertiser: "Nike".to_string(),
            budget: 1000.0,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
            status: None,
            impressions: Some(10_000_000),
            clicks: Some(100),
        }
    }

    #[tokio::test]
    async fn can_create_campaign() {
        let db = MemoryDatabase::new();

        let campaign = create_campaign(&db, new_campaign("Blue Man Group"))
            .await
            .unwrap();

        assert_eq!(campaign.name, "Blue Man Group".to_string());
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.created_at, campaign.modified_at);

        let stored = get_campaign_by_id(&db, campaign.id).await.unwrap();
        assert_eq!(stored.id, campaign.id);
    }

    #[tokio::test]
    async fn create_campaign_defaults_counters_to_zero() {
        let db = MemoryDatabase::new();
        let mut new = new_campaign("Fresh");
        new.impressions = None;
        new.clicks = None;

        let campaign = create_campaign(&db, new).await.unwrap();

        assert_eq!(campaign.impressions, 0);
        assert_eq!(campaign.clicks, 0);
    }

    #[tokio::test]
    async fn create_campaign_rejects_inverted_dates() {
        let db = MemoryDatabase::new();
        let mut new = new_campaign("Backwards");
        new.end_date = new.start_date;

        let result = create_campaign(&db, new).await;

        assert_eq!(
            result.unwrap_err(),
            Error::invalid_field("end_date", "must be after start_date")
        );
    }

    #[tokio::test]
    async fn create_campaign_rejects_bad_fields() {
        let db = MemoryDatabase::new();

        let mut blank = new_campaign("   ");
        blank.name = "   ".to_string();
        assert_eq!(
            create_campaign(&db, blank).await.unwrap_err(),
            Error::invalid_field("name", "is required")
        );

        let mut long = new_campaign("Long");
        long.advertiser = "x".repeat(51);
        assert_eq!(
            create_campaign(&db, long).await.unwrap_err(),
            Error::invalid_field("advertiser", "must not exceed 50 characters")
        );

        let mut negative = new_campaign("Negative");
        negative.budget = -1.0;
        assert!(matches!(
            create_campaign(&db, negative).await.unwrap_err(),
            Error::InvalidField { field: "budget", .. }
        ));
    }

    #[tokio::test]
    async fn get_campaigns_paginates_newest_first_with_total() {
        let db = MemoryDatabase::new();
        for i in 0..3 {
            let mut campaign = create_campaign(&db, new_campaign(&format!("Campaign {}", i)))
                .await
                .unwrap();
            campaign.created_at = Utc.with_ymd_and_hms(2024, 1, 1 + i, 0, 0, 0).unwrap();
            db.campaigns().insert_campaign(&campaign).await.unwrap();
        }

        let filter = CampaignFilter {
            start_date_from: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            ..CampaignFilter::default()
        };
        let list = get_campaigns(&db, filter, Page::new(1, 2).unwrap())
            .await
            .unwrap();

        // each campaign was stored twice, once as created and once backdated
        assert_eq!(list.total, 6);
        assert_eq!(list.data.len(), 2);
        assert!(list.data[0].created_at >= list.data[1].created_at);
    }

    #[tokio::test]
    async fn get_campaign_by_id_returns_error_if_doesnt_exist() {
        let db = MemoryDatabase::new();
        let campaign_id = CampaignId::new();

        let result = get_campaign_by_id(&db, campaign_id).await;

        assert_eq!(
            result.unwrap_err(),
            Error::CampaignDoesNotExist { campaign_id }
        );
    }

    #[tokio::test]
    async fn update_campaign_status_changes_status() {
        let db = MemoryDatabase::new();
        let campaign = create_campaign(&db, new_campaign("Pausable"))
            .await
            .unwrap();

        let updated = update_campaign_status(&db, campaign.id, CampaignStatus::Paused)
            .await
            .unwrap();

        assert_eq!(updated.status, CampaignStatus::Paused);
        let stored = get_campaign_by_id(&db, campaign.id).await.unwrap();
        assert_eq!(stored.status, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn update_campaign_status_rejects_same_status() {
        let db = MemoryDatabase::new();
        let campaign = create_campaign(&db, new_campaign("Steady"))
            .await
            .unwrap();

        let result = update_campaign_status(&db, campaign.id, CampaignStatus::Active).await;

        assert_eq!(
            result.unwrap_err(),
            Error::CampaignAlreadyInStatus {
                campaign_id: campaign.id,
                status: CampaignStatus::Active,
            }
        );
    }

    #[tokio::test]
    async fn stale_status_update_is_detected() {
        let db = MemoryDatabase::new();
        let campaign = create_campaign(&db, new_campaign("Racy")).await.unwrap();
        let mut stale = campaign.clone();
        stale.modified_at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

        let result = db
            .campaigns()
            .update_campaign_status(stale, CampaignStatus::Finished)
            .await;

        assert_eq!(result.unwrap_err(), Error::ConcurrentModificationDetected);
    }

    #[tokio::test]
    async fn campaign_stats_fall_back_to_zero() {
        let db = MemoryDatabase::new();
        let mut new = new_campaign("Quiet");
        new.impressions = Some(0);
        new.clicks = Some(0);
        let campaign = create_campaign(&db, new).await.unwrap();

        let stats = get_campaign_stats(&db, campaign.id).await.unwrap();

        assert_eq!(stats.ctr, 0.0);
        assert_eq!(stats.cpc, 0.0);
    }

    #[tokio::test]
    async fn campaign_stats_compute_ratios() {
        let db = MemoryDatabase::new();
        let campaign = create_campaign(&db, new_campaign("Loud")).await.unwrap();

        let stats = get_campaign_stats(&db, campaign.id).await.unwrap();

        assert!((stats.ctr - 0.001).abs() < 1e-12);
        assert_eq!(stats.cpc, 10.0);
    }
}
