use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    domain::{
        join_recurring_every, parse_recurring_every, Coupon, CouponPredicate, CouponQuery,
        CouponType, CreateCouponRequest, RedemptionCap, UpdateCouponRequest, Validity,
    },
    error::{AppError, Result},
    repository::CouponRepository,
};

const COUPON_COLUMNS: &str = r#"
    coupon_id, name, code, type AS coupon_type, discount, min_total,
    redemptions, customer_redemptions, status, order_restriction, validity,
    fixed_date, fixed_from_time, fixed_to_time,
    period_start_date, period_end_date,
    recurring_every, recurring_from_time, recurring_to_time,
    date_added, date_modified
"#;

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct CouponRow {
    coupon_id: i64,
    name: String,
    code: String,
    coupon_type: String,
    discount: String,
    min_total: String,
    redemptions: Option<i64>,
    customer_redemptions: Option<i64>,
    status: i32,
    order_restriction: Option<String>,
    validity: String,
    fixed_date: Option<NaiveDate>,
    fixed_from_time: Option<NaiveTime>,
    fixed_to_time: Option<NaiveTime>,
    period_start_date: Option<NaiveDate>,
    period_end_date: Option<NaiveDate>,
    recurring_every: String,
    recurring_from_time: Option<NaiveTime>,
    recurring_to_time: Option<NaiveTime>,
    date_added: NaiveDateTime,
    date_modified: NaiveDateTime,
}

pub struct SqliteCouponRepository {
    pool: SqlitePool,
}

impl SqliteCouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_coupon(row: CouponRow) -> Result<Coupon> {
        Ok(Coupon {
            id: row.coupon_id,
            name: row.name,
            code: row.code,
            coupon_type: CouponType::from_str(&row.coupon_type).ok_or_else(|| {
                AppError::Database(format!("Invalid coupon type: {}", row.coupon_type))
            })?,
            discount: parse_decimal(&row.discount)?,
            min_total: parse_decimal(&row.min_total)?,
            redemptions: RedemptionCap::from_column(row.redemptions),
            customer_redemptions: RedemptionCap::from_column(row.customer_redemptions),
            status: row.status != 0,
            order_restriction: row.order_restriction,
            validity: Validity::from_str(&row.validity),
            fixed_date: row.fixed_date,
            fixed_from_time: row.fixed_from_time,
            fixed_to_time: row.fixed_to_time,
            period_start_date: row.period_start_date,
            period_end_date: row.period_end_date,
            recurring_every: parse_recurring_every(&row.recurring_every)
                .map_err(|_| {
                    AppError::Database(format!("Invalid recurring_every: {}", row.recurring_every))
                })?,
            recurring_from_time: row.recurring_from_time,
            recurring_to_time: row.recurring_to_time,
            created_at: DateTime::from_naive_utc_and_offset(row.date_added, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.date_modified, Utc),
        })
    }

    fn push_predicates(builder: &mut QueryBuilder<'_, Sqlite>, query: &CouponQuery) {
        for predicate in query.predicates() {
            match predicate {
                CouponPredicate::Search(words) => {
                    for word in words {
                        let pattern = format!("%{}%", escape_like(word));
                        builder
                            .push(" AND (name LIKE ")
                            .push_bind(pattern.clone())
                            .push(" ESCAPE '\\' OR code LIKE ")
                            .push_bind(pattern)
                            .push(" ESCAPE '\\')");
                    }
                }
                CouponPredicate::Type(coupon_type) => {
                    builder.push(" AND type = ").push_bind(coupon_type.clone());
                }
                CouponPredicate::Status(status) => {
                    builder.push(" AND status = ").push_bind(*status);
                }
            }
        }
    }
}

pub(crate) fn parse_decimal(value: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|e| AppError::Database(format!("Invalid decimal '{}': {}", value, e)))
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A write that trips the UNIQUE index on `code` is a conflict, not a storage failure.
fn map_write_error(err: sqlx::Error, code: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(format!(
            "Coupon with code '{}' already exists",
            code.trim()
        )),
        e => AppError::Database(e.to_string()),
    }
}

#[async_trait]
impl CouponRepository for SqliteCouponRepository {
    async fn create(&self, request: CreateCouponRequest) -> Result<Coupon> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO coupons (
                name, code, type, discount, min_total,
                redemptions, customer_redemptions, status, order_restriction, validity,
                fixed_date, fixed_from_time, fixed_to_time,
                period_start_date, period_end_date,
                recurring_every, recurring_from_time, recurring_to_time,
                date_added, date_modified
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.name.trim())
        .bind(request.code.trim())
        .bind(request.coupon_type.as_str())
        .bind(request.discount.to_string())
        .bind(request.min_total.to_string())
        .bind(request.redemptions.to_column())
        .bind(request.customer_redemptions.to_column())
        .bind(if request.status { 1i32 } else { 0i32 })
        .bind(&request.order_restriction)
        .bind(request.validity.as_str())
        .bind(request.fixed_date)
        .bind(request.fixed_from_time)
        .bind(request.fixed_to_time)
        .bind(request.period_start_date)
        .bind(request.period_end_date)
        .bind(join_recurring_every(&request.recurring_every))
        .bind(request.recurring_from_time)
        .bind(request.recurring_to_time)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &request.code))?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created coupon".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {} FROM coupons WHERE coupon_id = ?",
            COUPON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_coupon(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        // `code` is declared COLLATE NOCASE
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {} FROM coupons WHERE code = ?",
            COUPON_COLUMNS
        ))
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_coupon(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &CouponQuery) -> Result<Vec<Coupon>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM coupons WHERE 1 = 1",
            COUPON_COLUMNS
        ));
        Self::push_predicates(&mut builder, query);
        builder.push(" ORDER BY coupon_id ASC");

        if let Some(limit) = query.limit() {
            builder
                .push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(query.offset());
        }

        let rows = builder
            .build_query_as::<CouponRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_coupon).collect()
    }

    async fn count(&self, query: &CouponQuery) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM coupons WHERE 1 = 1");
        Self::push_predicates(&mut builder, query);

        let row = builder
            .build_query_as::<(i64,)>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.0)
    }

    async fn update(&self, id: i64, request: UpdateCouponRequest) -> Result<Coupon> {
        let existing = self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Coupon not found".to_string())
        })?;

        let merged = request.apply_to(CreateCouponRequest::from(&existing));
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE coupons
            SET name = ?, code = ?, type = ?, discount = ?, min_total = ?,
                redemptions = ?, customer_redemptions = ?, status = ?,
                order_restriction = ?, validity = ?,
                fixed_date = ?, fixed_from_time = ?, fixed_to_time = ?,
                period_start_date = ?, period_end_date = ?,
                recurring_every = ?, recurring_from_time = ?, recurring_to_time = ?,
                date_modified = ?
            WHERE coupon_id = ?
            "#,
        )
        .bind(merged.name.trim())
        .bind(merged.code.trim())
        .bind(merged.coupon_type.as_str())
        .bind(merged.discount.to_string())
        .bind(merged.min_total.to_string())
        .bind(merged.redemptions.to_column())
        .bind(merged.customer_redemptions.to_column())
        .bind(if merged.status { 1i32 } else { 0i32 })
        .bind(&merged.order_restriction)
        .bind(merged.validity.as_str())
        .bind(merged.fixed_date)
        .bind(merged.fixed_from_time)
        .bind(merged.fixed_to_time)
        .bind(merged.period_start_date)
        .bind(merged.period_end_date)
        .bind(join_recurring_every(&merged.recurring_every))
        .bind(merged.recurring_from_time)
        .bind(merged.recurring_to_time)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &merged.code))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated coupon".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("PLAIN"), "PLAIN");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("10.50").unwrap().to_string(), "10.50");
        assert!(matches!(parse_decimal("ten"), Err(AppError::Database(_))));
    }
}
