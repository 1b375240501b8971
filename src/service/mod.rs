pub mod coupon_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;

pub use coupon_service::CouponService;

pub struct ServiceContext {
    pub coupon_repo: Arc<dyn CouponRepository>,
    pub history_repo: Arc<dyn CouponHistoryRepository>,
    pub coupon_service: Arc<CouponService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let coupon_repo: Arc<dyn CouponRepository> =
            Arc::new(SqliteCouponRepository::new(db_pool.clone()));
        let history_repo: Arc<dyn CouponHistoryRepository> =
            Arc::new(SqliteCouponHistoryRepository::new(db_pool.clone()));

        let coupon_service = Arc::new(CouponService::new(
            coupon_repo.clone(),
            history_repo.clone(),
        ));

        Self {
            coupon_repo,
            history_repo,
            coupon_service,
            db_pool,
        }
    }
}
