use async_trait::async_trait;
use mongodb::{bson, Collection};

use crate::campaign::db::{CampaignStore, MemoryCampaignStore};
use crate::campaign::Campaign;
use crate::error::Error;

pub type MongoCampaignStore = Collection<Campaign>;

const CAMPAIGNS: &str = "campaigns";

#[async_trait]
pub trait Database: Send + Sync {
    fn campaigns(&self) -> &dyn CampaignStore;

    async fn drop(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    campaigns: Collection<Campaign>,
    db: mongodb::Database,
}

impl MongoDatabase {
    pub async fn initialize(db: mongodb::Database) -> Result<MongoDatabase, Error> {
        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        db.run_command(
            bson::doc! {
                "createIndexes": CAMPAIGNS,
                "indexes": [
                    { "key": { "start_date": 1, "end_date": 1 }, "name": "by_period" },
                    { "key": { "status": 1 }, "name": "by_status" },
                    { "key": { "created_at": -1 }, "name": "by_created_at" },
                ]
            },
            None,
        )
        .await?;

        Ok(MongoDatabase {
            campaigns: db.collection(CAMPAIGNS),
            db,
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    async fn drop(&self) -> Result<(), Error> {
        self.db.drop(None).await?;

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDatabase {
    campaigns: MemoryCampaignStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }

    async fn drop(&self) -> Result<(), Error> {
        self.campaigns.clear()
    }
}
