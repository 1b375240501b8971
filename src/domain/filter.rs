use serde::{Deserialize, Serialize};

/// Raw list criteria as submitted by an admin listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponFilter {
    pub filter_search: Option<String>,
    pub filter_type: Option<String>,
    pub filter_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponPredicate {
    /// Every word must appear in the name or the code
    Search(Vec<String>),
    Type(String),
    Status(i64),
}

/// Ordered list of predicates plus paging, turned into SQL by the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CouponQuery {
    predicates: Vec<CouponPredicate>,
    limit: Option<i64>,
    offset: i64,
}

impl CouponQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply admin list criteria. Criteria that are absent or of the wrong
    /// shape leave the query untouched.
    pub fn filter(self, filter: &CouponFilter) -> Self {
        let mut query = self;

        if let Some(ref search) = filter.filter_search {
            query = query.search(search);
        }

        if let Some(ref coupon_type) = filter.filter_type {
            query = query.where_type(coupon_type);
        }

        if let Some(status) = filter.filter_status.as_deref().and_then(parse_numeric) {
            query = query.where_status(status);
        }

        query
    }

    pub fn search(mut self, term: &str) -> Self {
        let words: Vec<String> = term.split_whitespace().map(str::to_string).collect();
        if !words.is_empty() {
            self.predicates.push(CouponPredicate::Search(words));
        }
        self
    }

    pub fn where_type(mut self, coupon_type: &str) -> Self {
        self.predicates.push(CouponPredicate::Type(coupon_type.to_string()));
        self
    }

    pub fn where_status(mut self, status: i64) -> Self {
        self.predicates.push(CouponPredicate::Status(status));
        self
    }

    pub fn is_enabled(self) -> Self {
        self.where_status(1)
    }

    /// 1-based page number
    pub fn paginate(mut self, page: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        self.limit = Some(per_page);
        self.offset = (page.max(1) - 1) * per_page;
        self
    }

    pub fn predicates(&self) -> &[CouponPredicate] {
        &self.predicates
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

// Integer-valued input only; status is stored as 0/1.
fn parse_numeric(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 => Some(n as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_is_noop() {
        let query = CouponQuery::new().filter(&CouponFilter::default());
        assert!(query.predicates().is_empty());
        assert_eq!(query.limit(), None);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_filter_builds_predicates_in_order() {
        let query = CouponQuery::new().filter(&CouponFilter {
            filter_search: Some("summer  SALE".to_string()),
            filter_type: Some("P".to_string()),
            filter_status: Some("1".to_string()),
        });

        assert_eq!(
            query.predicates(),
            &[
                CouponPredicate::Search(vec!["summer".to_string(), "SALE".to_string()]),
                CouponPredicate::Type("P".to_string()),
                CouponPredicate::Status(1),
            ]
        );
    }

    #[test]
    fn test_non_numeric_status_is_ignored() {
        let query = CouponQuery::new().filter(&CouponFilter {
            filter_status: Some("enabled".to_string()),
            ..Default::default()
        });
        assert!(query.predicates().is_empty());

        let query = CouponQuery::new().filter(&CouponFilter {
            filter_status: Some(" 0 ".to_string()),
            ..Default::default()
        });
        assert_eq!(query.predicates(), &[CouponPredicate::Status(0)]);

        let query = CouponQuery::new().filter(&CouponFilter {
            filter_status: Some("1.0".to_string()),
            ..Default::default()
        });
        assert_eq!(query.predicates(), &[CouponPredicate::Status(1)]);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = CouponQuery::new().search("   ");
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn test_paginate() {
        let query = CouponQuery::new().is_enabled().paginate(3, 20);
        assert_eq!(query.predicates(), &[CouponPredicate::Status(1)]);
        assert_eq!(query.limit(), Some(20));
        assert_eq!(query.offset(), 40);

        let query = CouponQuery::new().paginate(0, 0);
        assert_eq!(query.limit(), Some(1));
        assert_eq!(query.offset(), 0);
    }
}
