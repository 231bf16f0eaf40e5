//! Quote filtering and the per-day statistics behind the admin screens.
//!
//! Day boundaries follow Bangkok time, where the business operates.

use chrono::{DateTime, Days, Duration, FixedOffset, NaiveTime, Offset, SecondsFormat, TimeZone, Utc};

use crate::db::models::{Quote, QuoteStatus, POSTS, QUOTES};
use crate::db::{Direction, DocumentStore, Query, StoreError};

const SITE_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Windows offered on the analytics screen.
pub const CHART_RANGES: [i64; 3] = [7, 30, 90];
/// Windows offered on the quotes list. `1` covers today and yesterday.
pub const LIST_RANGES: [i64; 3] = [1, 7, 30];
pub const DEFAULT_RANGE: i64 = 7;

pub fn site_offset() -> FixedOffset {
    FixedOffset::east_opt(SITE_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Local midnight `days` days before `now`, as a UTC instant. `None` when the
/// window reaches past the calendar's range.
pub fn start_of_day_days_ago(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    let offset = site_offset();
    let day = now
        .with_timezone(&offset)
        .date_naive()
        .checked_sub_days(Days::new(u64::try_from(days).ok()?))?;
    let utc = day
        .and_time(NaiveTime::MIN)
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(Utc.from_utc_datetime(&utc))
}

/// Timestamp in the form quotes store `createdAt`, so string comparison in
/// the store orders correctly.
fn stored_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(QuoteStatus),
}

impl StatusFilter {
    /// Unknown values show everything.
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(QuoteStatus::parse)
            .map(StatusFilter::Only)
            .unwrap_or(StatusFilter::All)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysFilter {
    All,
    Last(i64),
}

impl DaysFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("all") => DaysFilter::All,
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|days| *days > 0)
                .map(DaysFilter::Last)
                .unwrap_or(DaysFilter::Last(DEFAULT_RANGE)),
            None => DaysFilter::Last(DEFAULT_RANGE),
        }
    }

    pub fn as_param(&self) -> String {
        match self {
            DaysFilter::All => "all".to_string(),
            DaysFilter::Last(days) => days.to_string(),
        }
    }
}

/// Store query for the admin quotes list, newest first.
pub fn quotes_query(status: StatusFilter, days: DaysFilter, now: DateTime<Utc>) -> Query {
    let mut query = Query::new().order_by("createdAt", Direction::Desc);
    if let StatusFilter::Only(status) = status {
        query = query.where_eq("status", status.as_str());
    }
    // A window older than the calendar covers every quote.
    if let DaysFilter::Last(days) = days {
        if let Some(since) = start_of_day_days_ago(now, days) {
            query = query.where_gte("createdAt", stored_timestamp(since));
        }
    }
    query
}

pub async fn list_quotes(
    store: &dyn DocumentStore,
    status: StatusFilter,
    days: DaysFilter,
    now: DateTime<Utc>,
) -> Result<Vec<Quote>, StoreError> {
    store
        .find(QUOTES, &quotes_query(status, days, now))
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    /// `dd/MM`
    pub label: String,
    pub count: usize,
}

/// One bucket per day for the last `days` days, today last. Days without
/// quotes are present with a zero count.
pub fn daily_counts(quotes: &[Quote], days: i64, now: DateTime<Utc>) -> Vec<DayCount> {
    let offset = site_offset();
    let today = now.with_timezone(&offset).date_naive();
    let days = days.max(1);

    let mut buckets: Vec<(chrono::NaiveDate, usize)> = (0..days)
        .rev()
        .map(|back| (today - Duration::days(back), 0))
        .collect();

    for created in quotes.iter().filter_map(|q| q.created_at) {
        let day = created.with_timezone(&offset).date_naive();
        if let Some(bucket) = buckets.iter_mut().find(|(d, _)| *d == day) {
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(day, count)| DayCount {
            label: day.format("%d/%m").to_string(),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub total_quotes: usize,
    pub total_posts: usize,
    pub range: i64,
    pub series: Vec<DayCount>,
}

impl Overview {
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|d| d.count > 0)
    }

    pub fn peak(&self) -> usize {
        self.series.iter().map(|d| d.count).max().unwrap_or(0)
    }
}

pub async fn overview(
    store: &dyn DocumentStore,
    range: i64,
    now: DateTime<Utc>,
) -> Result<Overview, StoreError> {
    let range = if CHART_RANGES.contains(&range) {
        range
    } else {
        DEFAULT_RANGE
    };

    let total_quotes = store.count(QUOTES).await?;
    let total_posts = store.count(POSTS).await?;

    let since = match start_of_day_days_ago(now, range - 1) {
        Some(start) => Query::new().where_gte("createdAt", stored_timestamp(start)),
        None => Query::new(),
    };
    let recent: Vec<Quote> = store
        .find(QUOTES, &since)
        .await?
        .into_iter()
        .map(|doc| doc.decode())
        .collect::<Result<_, _>>()?;

    Ok(Overview {
        total_quotes,
        total_posts,
        range,
        series: daily_counts(&recent, range, now),
    })
}
