use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};

use crate::error::Error;

use super::{Campaign, CampaignStatus};

/// Selection of campaigns understood by every store. Bounds are inclusive.
///
/// The same filter renders to a MongoDB query with [`to_document`] and can be
/// evaluated directly with [`matches`]; the two must agree.
///
/// [`to_document`]: CampaignFilter::to_document
/// [`matches`]: CampaignFilter::matches
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    /// Case-insensitive substring of the advertiser name.
    pub advertiser: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub start_date_from: Option<DateTime<Utc>>,
    pub start_date_to: Option<DateTime<Utc>>,
    pub end_date_from: Option<DateTime<Utc>>,
    pub end_date_to: Option<DateTime<Utc>>,
}

impl CampaignFilter {
    pub fn all() -> CampaignFilter {
        CampaignFilter::default()
    }

    /// Campaigns whose `[start_date, end_date]` intersects `[start, end]`.
    pub fn overlapping(start: DateTime<Utc>, end: DateTime<Utc>) -> CampaignFilter {
        CampaignFilter {
            start_date_to: Some(end),
            end_date_from: Some(start),
            ..CampaignFilter::default()
        }
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(advertiser) = &self.advertiser {
            filter.insert(
                "advertiser",
                bson::doc! { "$regex": escape_regex(advertiser), "$options": "i" },
            );
        }
        if let Some(range) = range(self.budget_min.map(Bson::from), self.budget_max.map(Bson::from)) {
            filter.insert("budget", range);
        }
        if let Some(range) = range(
            self.start_date_from.map(bson_date),
            self.start_date_to.map(bson_date),
        ) {
            filter.insert("start_date", range);
        }
        if let Some(range) = range(
            self.end_date_from.map(bson_date),
            self.end_date_to.map(bson_date),
        ) {
            filter.insert("end_date", range);
        }

        filter
    }

    pub fn matches(&self, campaign: &Campaign) -> bool {
        fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
            min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
        }

        if let Some(status) = self.status {
            if campaign.status != status {
                return false;
            }
        }
        if let Some(advertiser) = &self.advertiser {
            let haystack = campaign.advertiser.to_lowercase();
            if !haystack.contains(&advertiser.to_lowercase()) {
                return false;
            }
        }

        within(campaign.budget, self.budget_min, self.budget_max)
            && within(campaign.start_date, self.start_date_from, self.start_date_to)
            && within(campaign.end_date, self.end_date_from, self.end_date_to)
    }
}

fn bson_date(date: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_chrono(date))
}

fn range(min: Option<Bson>, max: Option<Bson>) -> Option<Document> {
    if min.is_none() && max.is_none() {
        return None;
    }

    let mut range = Document::new();
    if let Some(min) = min {
        range.insert("$gte", min);
    }
    if let Some(max) = max {
        range.insert("$lte", max);
    }
    Some(range)
}

fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// One-based pagination, newest campaigns first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(page: u64, limit: u64) -> Result<Page, Error> {
        if page < 1 {
            return Err(Error::invalid_field("page", "must be at least 1"));
        }
        if limit < 1 {
            return Err(Error::invalid_field("limit", "must be at least 1"));
        }

        Ok(Page { page, limit })
    }

    pub fn skip(self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Page {
        Page { page: 1, limit: 10 }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::campaign::CampaignId;

    fn campaign(advertiser: &str, budget: f64, start: (i32, u32, u32), end: (i32, u32, u32)) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: CampaignId::new(),
            name: "Spring launch".to_string(),
            advertiser: advertiser.to_string(),
            budget,
            start_date: Utc.with_ymd_and_hms(start.0, start.1, start.2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(end.0, end.1, end.2, 0, 0, 0).unwrap(),
            status: CampaignStatus::Active,
            impressions: 0,
            clicks: 0,
            created_at: now,
            modified_at: now,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = CampaignFilter::all();

        assert!(filter.to_document().is_empty());
        assert!(filter.matches(&campaign("nike", 0.0, (2024, 1, 1), (2024, 2, 1))));
    }

    #[test]
    fn overlapping_renders_range_predicate() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        let filter = CampaignFilter::overlapping(start, end);

        assert_eq!(
            filter.to_document(),
            bson::doc! {
                "start_date": { "$lte": bson::DateTime::from_chrono(end) },
                "end_date": { "$gte": bson::DateTime::from_chrono(start) },
            }
        );
    }

    #[test]
    fn overlapping_matches_partial_intersections_only() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let filter = CampaignFilter::overlapping(start, end);

        assert!(filter.matches(&campaign("a", 1.0, (2024, 1, 15), (2024, 2, 10))));
        assert!(filter.matches(&campaign("a", 1.0, (2024, 1, 1), (2024, 12, 31))));
        assert!(filter.matches(&campaign("a", 1.0, (2024, 2, 29), (2024, 3, 10))));
        assert!(!filter.matches(&campaign("a", 1.0, (2024, 3, 1), (2024, 3, 10))));
        assert!(!filter.matches(&campaign("a", 1.0, (2023, 12, 1), (2024, 1, 31))));
    }

    #[test]
    fn advertiser_and_budget_filters() {
        let filter = CampaignFilter {
            advertiser: Some("META".to_string()),
            budget_min: Some(500.0),
            budget_max: Some(1500.0),
            ..CampaignFilter::default()
        };

        assert!(filter.matches(&campaign("meta_ads", 1000.0, (2024, 1, 1), (2024, 2, 1))));
        assert!(!filter.matches(&campaign("meta_ads", 2000.0, (2024, 1, 1), (2024, 2, 1))));
        assert!(!filter.matches(&campaign("google_ads", 1000.0, (2024, 1, 1), (2024, 2, 1))));
        assert_eq!(
            filter.to_document(),
            bson::doc! {
                "advertiser": { "$regex": "META", "$options": "i" },
                "budget": { "$gte": 500.0, "$lte": 1500.0 },
            }
        );
    }

    #[test]
    fn advertiser_regex_is_escaped() {
        assert_eq!(escape_regex("a.b(c)"), "a\\.b\\(c\\)");
    }

    #[test]
    fn page_validation_and_skip() {
        assert_eq!(Page::new(3, 10).unwrap().skip(), 20);
        assert_eq!(Page::default().skip(), 0);
        assert_eq!(
            Page::new(0, 10).unwrap_err(),
            Error::invalid_field("page", "must be at least 1")
        );
        assert_eq!(
            Page::new(1, 0).unwrap_err(),
            Error::invalid_field("limit", "must be at least 1")
        );
    }
}
