use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod coupon_repository;
pub mod coupon_history_repository;

pub use coupon_repository::SqliteCouponRepository;
pub use coupon_history_repository::SqliteCouponHistoryRepository;

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn create(&self, request: CreateCouponRequest) -> Result<Coupon>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Coupon>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>>;
    async fn list(&self, query: &CouponQuery) -> Result<Vec<Coupon>>;
    /// Number of coupons matching the query's predicates, ignoring paging
    async fn count(&self, query: &CouponQuery) -> Result<i64>;
    async fn update(&self, id: i64, request: UpdateCouponRequest) -> Result<Coupon>;
}

#[async_trait]
pub trait CouponHistoryRepository: Send + Sync {
    async fn create(&self, entry: NewCouponHistory) -> Result<CouponHistory>;
    async fn find(&self, coupon_id: i64, filter: &HistoryFilter) -> Result<Vec<CouponHistory>>;
    async fn count(&self, coupon_id: i64, filter: &HistoryFilter) -> Result<i64>;
    async fn first_pending_for_order(&self, coupon_id: i64, order_id: i64) -> Result<Option<CouponHistory>>;
    /// Mark a history row as a confirmed redemption. Returns false when the
    /// row was already confirmed or does not exist.
    async fn touch_status(&self, id: i64) -> Result<bool>;
}
