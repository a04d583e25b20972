use chrono::{DateTime, Datelike, Duration, SubsecRound, Utc};
use rand::Rng;
use tracing::info;

use crate::campaign::{Campaign, CampaignId, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::stats::trends::MonthWindow;

const SEED_YEARS: i32 = 3;

const ADVERTISERS: &[&str] = &[
    "google_ads",
    "meta_ads",
    "amazon_ads",
    "apple_search_ads",
    "microsoft_ads",
    "tiktok_ads",
    "snapchat_ads",
    "twitter_ads",
    "linkedin_ads",
    "pinterest_ads",
    "alibaba_ads",
    "ebay_ads",
    "etsy_ads",
    "shopify_partners",
    "rakuten_ads",
    "dv360",
    "the_trade_desk",
    "criteo",
    "outbrain",
    "taboola",
    "unity_ads",
    "ironsource",
    "applovin",
    "vungle",
    "chartboost",
    "nike",
    "adidas",
    "coca_cola",
    "pepsi",
    "samsung",
    "xiaomi",
    "huawei",
    "paypal",
    "visa",
    "mastercard",
    "stripe",
];

/// One campaign per calendar month over the three years ending with the
/// year of `now`. Each runs from the 1st to the last day of its month.
pub fn generate_campaigns<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Result<Vec<Campaign>, Error> {
    let now = now.trunc_subsecs(3);
    let first_year = now.year() - (SEED_YEARS - 1);

    let mut campaigns = Vec::with_capacity(SEED_YEARS as usize * 12);
    let mut index = 1usize;
    for year in first_year..=now.year() {
        let status = match year - first_year {
            0 => CampaignStatus::Finished,
            1 => CampaignStatus::Active,
            _ => CampaignStatus::Paused,
        };

        for month in 1..=12 {
            let window = MonthWindow::new(year, month)?;
            let last_day = window.end + Duration::milliseconds(1) - Duration::days(1);

            campaigns.push(Campaign {
                id: CampaignId::new(),
                name: format!("Campaign {} - {}/{}", index, year, month),
                advertiser: ADVERTISERS[index % ADVERTISERS.len()].to_string(),
                budget: 1000.0 + 250.0 * index as f64,
                start_date: window.start,
                end_date: last_day,
                status,
                impressions: rng.gen_range(0..100_000),
                clicks: rng.gen_range(0..5_000),
                created_at: now,
                modified_at: now,
            });

            index += 1;
        }
    }

    Ok(campaigns)
}

pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.drop().await?;

    let campaigns = generate_campaigns(&mut rand::thread_rng(), Utc::now())?;
    for campaign in &campaigns {
        db.campaigns().insert_campaign(campaign).await?;
    }

    info!("seeded {} campaigns", campaigns.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::campaign::CampaignFilter;
    use crate::database::MemoryDatabase;

    #[test]
    fn generates_a_campaign_per_month() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).unwrap();

        let campaigns = generate_campaigns(&mut StdRng::seed_from_u64(7), now).unwrap();

        assert_eq!(campaigns.len(), 36);

        let first = &campaigns[0];
        assert_eq!(first.name, "Campaign 1 - 2024/1");
        assert_eq!(first.advertiser, "meta_ads");
        assert_eq!(first.budget, 1250.0);
        assert_eq!(first.status, CampaignStatus::Finished);
        assert_eq!(first.start_date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(first.end_date, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());

        let february = &campaigns[1];
        assert_eq!(february.end_date, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());

        assert_eq!(campaigns[12].status, CampaignStatus::Active);
        assert_eq!(campaigns[35].status, CampaignStatus::Paused);
        assert_eq!(campaigns[35].name, "Campaign 36 - 2026/12");
        assert_eq!(campaigns[35].advertiser, "google_ads");

        assert!(campaigns.iter().all(|c| c.impressions < 100_000 && c.clicks < 5_000));
    }

    #[tokio::test]
    async fn seed_replaces_existing_data() {
        let db = MemoryDatabase::new();

        seed(&db).await.unwrap();
        seed(&db).await.unwrap();

        let count = db
            .campaigns()
            .count_campaigns(&CampaignFilter::all())
            .await
            .unwrap();
        assert_eq!(count, 36);
    }
}
