use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    domain::{CouponHistory, HistoryFilter, NewCouponHistory},
    error::{AppError, Result},
    repository::{coupon_repository::parse_decimal, CouponHistoryRepository},
};

const HISTORY_COLUMNS: &str = r#"
    coupon_history_id, coupon_id, order_id, customer_id, code,
    min_total, amount, date_used, status
"#;

#[derive(FromRow)]
struct CouponHistoryRow {
    coupon_history_id: i64,
    coupon_id: i64,
    order_id: i64,
    customer_id: Option<i64>,
    code: String,
    min_total: String,
    amount: String,
    date_used: NaiveDateTime,
    status: i32,
}

pub struct SqliteCouponHistoryRepository {
    pool: SqlitePool,
}

impl SqliteCouponHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_history(row: CouponHistoryRow) -> Result<CouponHistory> {
        Ok(CouponHistory {
            id: row.coupon_history_id,
            coupon_id: row.coupon_id,
            order_id: row.order_id,
            customer_id: row.customer_id,
            code: row.code,
            min_total: parse_decimal(&row.min_total)?,
            amount: parse_decimal(&row.amount)?,
            date_used: DateTime::from_naive_utc_and_offset(row.date_used, Utc),
            status: row.status != 0,
        })
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, coupon_id: i64, filter: &HistoryFilter) {
        builder.push(" WHERE coupon_id = ").push_bind(coupon_id);

        match filter.status {
            Some(true) => {
                builder.push(" AND status = 1");
            }
            Some(false) => {
                builder.push(" AND status != 1");
            }
            None => {}
        }

        if let Some(customer_id) = filter.customer_id {
            builder.push(" AND customer_id = ").push_bind(customer_id);
        }

        if let Some(order_id) = filter.order_id {
            builder.push(" AND order_id = ").push_bind(order_id);
        }
    }
}

#[async_trait]
impl CouponHistoryRepository for SqliteCouponHistoryRepository {
    async fn create(&self, entry: NewCouponHistory) -> Result<CouponHistory> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO coupons_history (
                coupon_id, order_id, customer_id, code,
                min_total, amount, date_used, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.coupon_id)
        .bind(entry.order_id)
        .bind(entry.customer_id)
        .bind(&entry.code)
        .bind(entry.min_total.to_string())
        .bind(entry.amount.to_string())
        .bind(now)
        .bind(if entry.status { 1i32 } else { 0i32 })
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        let row = sqlx::query_as::<_, CouponHistoryRow>(&format!(
            "SELECT {} FROM coupons_history WHERE coupon_history_id = ?",
            HISTORY_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Self::row_to_history(row)
    }

    async fn find(&self, coupon_id: i64, filter: &HistoryFilter) -> Result<Vec<CouponHistory>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM coupons_history",
            HISTORY_COLUMNS
        ));
        Self::push_filter(&mut builder, coupon_id, filter);
        builder.push(" ORDER BY coupon_history_id ASC");

        let rows = builder
            .build_query_as::<CouponHistoryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_history).collect()
    }

    async fn count(&self, coupon_id: i64, filter: &HistoryFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM coupons_history");
        Self::push_filter(&mut builder, coupon_id, filter);

        let row = builder
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }

    async fn first_pending_for_order(&self, coupon_id: i64, order_id: i64) -> Result<Option<CouponHistory>> {
        let row = sqlx::query_as::<_, CouponHistoryRow>(&format!(
            r#"
            SELECT {}
            FROM coupons_history
            WHERE coupon_id = ? AND order_id = ? AND status != 1
            ORDER BY coupon_history_id ASC
            LIMIT 1
            "#,
            HISTORY_COLUMNS
        ))
        .bind(coupon_id)
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_history(r)?)),
            None => Ok(None),
        }
    }

    async fn touch_status(&self, id: i64) -> Result<bool> {
        // Conditional so a row is confirmed at most once
        let result = sqlx::query(
            "UPDATE coupons_history SET status = 1 WHERE coupon_history_id = ? AND status != 1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
