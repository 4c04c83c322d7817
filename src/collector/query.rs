//! Search expressions evaluated at the start of every collection cycle.
//!
//! Queries are read lazily: [`CollectQuery::query`] is called each time the
//! collector needs the text, so time-windowed variants always reflect the
//! moment of use rather than the moment of construction.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::CollectorError;

/// Format of the lower bound in `updated:>=` clauses.
const UPDATED_SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A search expression producer.
///
/// The provided `query` implementation reports
/// [`CollectorError::QueryNotImplemented`]; concrete queries override it.
pub trait CollectQuery: Send + Sync {
    /// Returns the current expression text.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::QueryNotImplemented`] unless overridden.
    fn query(&self) -> Result<String, CollectorError> {
        Err(CollectorError::QueryNotImplemented)
    }
}

/// A fixed search expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantQuery {
    text: String,
}

impl ConstantQuery {
    /// Creates a query that always returns `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CollectQuery for ConstantQuery {
    fn query(&self) -> Result<String, CollectorError> {
        Ok(self.text.clone())
    }
}

/// A search expression restricted to items modified within a trailing window.
///
/// # Example
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use pr_collector::collector::RecentlyUpdatedQuery;
///
/// let query = RecentlyUpdatedQuery::new("query", TimeDelta::minutes(1));
/// let now = Utc.with_ymd_and_hms(2010, 10, 8, 11, 43, 0).unwrap();
/// assert_eq!(query.query_at(now), "query updated:>=2010-10-08T11:42:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentlyUpdatedQuery {
    base_query: String,
    window: TimeDelta,
}

impl RecentlyUpdatedQuery {
    /// Creates a query appending `updated:>=<now - window>` to `base_query`.
    #[must_use]
    pub fn new(base_query: impl Into<String>, window: TimeDelta) -> Self {
        Self {
            base_query: base_query.into(),
            window,
        }
    }

    /// Returns the expression as it would read at `now`.
    #[must_use]
    pub fn query_at(&self, now: DateTime<Utc>) -> String {
        let since = now
            .checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        format!(
            "{} updated:>={}",
            self.base_query,
            since.format(UPDATED_SINCE_FORMAT)
        )
    }
}

impl CollectQuery for RecentlyUpdatedQuery {
    fn query(&self) -> Result<String, CollectorError> {
        Ok(self.query_at(Utc::now()))
    }
}

/// Builds one boxed [`ConstantQuery`] per expression.
pub fn constant_queries<I, S>(texts: I) -> Vec<Box<dyn CollectQuery>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    texts
        .into_iter()
        .map(|text| Box::new(ConstantQuery::new(text)) as Box<dyn CollectQuery>)
        .collect()
}
