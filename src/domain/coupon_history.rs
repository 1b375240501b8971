use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One redemption attempt of a coupon against an order.
///
/// Rows are written as pending when an order is placed with a coupon and
/// flipped to `status = true` once the redemption is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponHistory {
    pub id: i64,
    pub coupon_id: i64,
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub code: String,
    pub min_total: Decimal,
    pub amount: Decimal,
    pub date_used: DateTime<Utc>,
    pub status: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCouponHistory {
    pub coupon_id: i64,
    pub order_id: i64,
    pub customer_id: Option<i64>,
    pub code: String,
    pub min_total: Decimal,
    pub amount: Decimal,
    pub status: bool,
}

/// Narrowing applied to a coupon's history rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub status: Option<bool>,
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
}

impl HistoryFilter {
    pub fn enabled() -> Self {
        Self {
            status: Some(true),
            ..Default::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            status: Some(false),
            ..Default::default()
        }
    }

    pub fn customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn order(mut self, order_id: i64) -> Self {
        self.order_id = Some(order_id);
        self
    }
}
