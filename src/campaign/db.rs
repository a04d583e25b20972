use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::MongoCampaignStore;
use crate::error::Error;

use super::{Campaign, CampaignFilter, CampaignId, CampaignStatus, Page};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    async fn fetch_campaigns(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaigns_page(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Vec<Campaign>, Error>;

    async fn count_campaigns(&self, filter: &CampaignFilter) -> Result<u64, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn update_campaign_status(
        &self,
        campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>, Error> {
        let campaigns: Vec<Campaign> = self
            .find(filter.to_document(), None)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_page(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1 })
            .skip(page.skip())
            .limit(i64::try_from(page.limit).unwrap_or(i64::MAX))
            .build();

        let campaigns: Vec<Campaign> = self
            .find(filter.to_document(), options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns(&self, filter: &CampaignFilter) -> Result<u64, Error> {
        let count = self.count_documents(filter.to_document(), None).await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(
        &self,
        mut campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error> {
        let now = Utc::now().trunc_subsecs(3);
        let old_modified_at = bson::DateTime::from_chrono(campaign.modified_at);
        let new_modified_at = bson::DateTime::from_chrono(now);

        let result = self
            .update_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                bson::doc! { "$set": { "status": status.as_str(), "modified_at": new_modified_at } },
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        campaign.modified_at = now;
        campaign.status = status;

        Ok(campaign)
    }
}

/// Store backed by a plain vector, for tests and the `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryCampaignStore {
    campaigns: RwLock<Vec<Campaign>>,
}

impl MemoryCampaignStore {
    pub fn new() -> MemoryCampaignStore {
        MemoryCampaignStore::default()
    }

    pub fn clear(&self) -> Result<(), Error> {
        self.campaigns.write().map_err(poisoned)?.clear();

        Ok(())
    }

    fn select(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>, Error> {
        let campaigns = self.campaigns.read().map_err(poisoned)?;

        Ok(campaigns
            .iter()
            .filter(|campaign| filter.matches(campaign))
            .cloned()
            .collect())
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::ExistentialState("campaign store lock was poisoned".to_string())
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.campaigns
            .write()
            .map_err(poisoned)?
            .push(campaign.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self, filter: &CampaignFilter) -> Result<Vec<Campaign>, Error> {
        self.select(filter)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns_page(
        &self,
        filter: &CampaignFilter,
        page: Page,
    ) -> Result<Vec<Campaign>, Error> {
        let mut campaigns = self.select(filter)?;
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);

        Ok(campaigns.into_iter().skip(skip).take(limit).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn count_campaigns(&self, filter: &CampaignFilter) -> Result<u64, Error> {
        Ok(self.select(filter)?.len() as u64)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaigns = self.campaigns.read().map_err(poisoned)?;

        Ok(campaigns.iter().find(|c| c.id == campaign_id).cloned())
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign_status(
        &self,
        mut campaign: Campaign,
        status: CampaignStatus,
    ) -> Result<Campaign, Error> {
        let mut campaigns = self.campaigns.write().map_err(poisoned)?;
        let stored = campaigns
            .iter_mut()
            .find(|c| c.id == campaign.id && c.modified_at == campaign.modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        campaign.modified_at = Utc::now().trunc_subsecs(3);
        campaign.status = status;
        *stored = campaign.clone();

        Ok(campaign)
    }
}
