//! Spending reports and purchase suggestions.

use chrono::{Days, NaiveDate, Utc};
use sqlx::PgPool;

use grocer_core::UserId;

use crate::db::AnalyticsRepository;
use crate::error::{AppError, Result};
use crate::models::{
    CategorySpending, DailySpending, DateRange, MonthlySpending, ProductPopularity,
    SpendingTotals, Suggestion,
};

/// Default number of products in the most-purchased report.
pub const DEFAULT_TOP_PRODUCTS: u32 = 10;
/// Default window for the daily spending report.
pub const DEFAULT_DAILY_WINDOW: u32 = 7;
/// Default number of suggestions.
pub const DEFAULT_SUGGESTIONS: u32 = 5;
/// Default number of days a purchase suppresses a suggestion.
pub const DEFAULT_SUGGESTION_LOOKBACK_DAYS: u32 = 30;

/// Analytics service.
pub struct AnalyticsService<'a> {
    analytics: AnalyticsRepository<'a>,
    suggestion_lookback_days: u32,
}

impl<'a> AnalyticsService<'a> {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            analytics: AnalyticsRepository::new(pool),
            suggestion_lookback_days: DEFAULT_SUGGESTION_LOOKBACK_DAYS,
        }
    }

    /// Override how recent a purchase must be to suppress a suggestion.
    #[must_use]
    pub const fn with_suggestion_lookback_days(mut self, days: u32) -> Self {
        self.suggestion_lookback_days = days;
        self
    }

    /// Completed spending per category within an optional date range.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn spending_by_category(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<CategorySpending>> {
        Ok(self.analytics.spending_by_category(user_id, range).await?)
    }

    /// Completed spending per month, optionally restricted to one year.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn monthly_spending(
        &self,
        user_id: UserId,
        year: Option<i32>,
    ) -> Result<Vec<MonthlySpending>> {
        Ok(self.analytics.monthly_spending(user_id, year).await?)
    }

    /// The user's most bought products by quantity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `limit` is zero.
    pub async fn most_purchased(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ProductPopularity>> {
        let limit = positive_limit(limit)?;
        Ok(self.analytics.most_purchased(user_id, limit).await?)
    }

    /// Spending per day over the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn daily_spending(&self, user_id: UserId, days: u32) -> Result<Vec<DailySpending>> {
        let since = days_ago(Utc::now().date_naive(), days);
        Ok(self.analytics.daily_spending(user_id, since).await?)
    }

    /// Lifetime completed spending, order count and (via
    /// [`SpendingTotals::average_order_value`]) the average order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn total_spending(&self, user_id: UserId) -> Result<SpendingTotals> {
        Ok(self.analytics.total_spending(user_id).await?)
    }

    /// Products from the user's favourite categories not bought recently.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `limit` is zero.
    pub async fn suggested_products(&self, user_id: UserId, limit: u32) -> Result<Vec<Suggestion>> {
        let limit = positive_limit(limit)?;
        let since = days_ago(Utc::now().date_naive(), self.suggestion_lookback_days);
        Ok(self
            .analytics
            .suggested_products(user_id, since, limit)
            .await?)
    }
}

fn positive_limit(limit: u32) -> Result<i64> {
    if limit == 0 {
        return Err(AppError::Validation("limit must be at least 1".to_owned()));
    }
    Ok(i64::from(limit))
}

fn days_ago(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_days_ago() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(days_ago(today, 7), NaiveDate::from_ymd_opt(2026, 2, 26).unwrap());
        assert_eq!(days_ago(today, 0), today);
        assert_eq!(days_ago(NaiveDate::MIN, 1), NaiveDate::MIN);
    }

    #[test]
    fn test_positive_limit() {
        assert!(matches!(positive_limit(0), Err(AppError::Validation(_))));
        assert_eq!(positive_limit(5).unwrap(), 5);
    }
}
