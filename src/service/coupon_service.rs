use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::{
    domain::{
        Coupon, CouponHistory, CouponQuery, CreateCouponRequest, Eligibility, HistoryFilter,
        OrderContext, RedemptionCap, RejectionReason, UpdateCouponRequest, Validity,
    },
    error::{AppError, Result},
    repository::{CouponHistoryRepository, CouponRepository},
};

pub struct CouponService {
    coupon_repo: Arc<dyn CouponRepository>,
    history_repo: Arc<dyn CouponHistoryRepository>,
}

impl CouponService {
    pub fn new(
        coupon_repo: Arc<dyn CouponRepository>,
        history_repo: Arc<dyn CouponHistoryRepository>,
    ) -> Self {
        Self { coupon_repo, history_repo }
    }

    /// List coupons matching a query
    pub async fn list(&self, query: &CouponQuery) -> Result<Vec<Coupon>> {
        self.coupon_repo.list(query).await
    }

    /// Total matches for a query, for paging
    pub async fn count(&self, query: &CouponQuery) -> Result<i64> {
        self.coupon_repo.count(query).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Coupon>> {
        self.coupon_repo.find_by_id(id).await
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        self.coupon_repo.find_by_code(code).await
    }

    /// Create a new coupon
    pub async fn create(&self, request: CreateCouponRequest) -> Result<Coupon> {
        let request = request.normalized();
        request.validate()?;

        if self.coupon_repo.find_by_code(&request.code).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Coupon with code '{}' already exists",
                request.code
            )));
        }

        let coupon = self.coupon_repo.create(request).await?;
        tracing::info!(coupon_id = coupon.id, code = %coupon.code, "Created coupon");
        Ok(coupon)
    }

    /// Update an existing coupon.
    ///
    /// A stored validity outside the known modes is kept as it is unless the
    /// update replaces it, so such coupons can still be renamed or disabled.
    pub async fn update(&self, id: i64, request: UpdateCouponRequest) -> Result<Coupon> {
        let request = request.normalized();
        let existing = self.coupon_repo.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Coupon not found".to_string())
        })?;

        // Validate the coupon as it will look after the update
        let merged = request.clone().apply_to(CreateCouponRequest::from(&existing));
        merged.validate_details()?;
        let keeps_unknown_validity =
            request.validity.is_none() && matches!(existing.validity, Validity::Other(_));
        if !keeps_unknown_validity {
            merged.validate_schedule()?;
        }

        if let Some(ref code) = request.code {
            if let Some(other) = self.coupon_repo.find_by_code(code).await? {
                if other.id != id {
                    return Err(AppError::Conflict(format!(
                        "Coupon with code '{}' already exists",
                        code
                    )));
                }
            }
        }

        let coupon = self.coupon_repo.update(id, request).await?;
        tracing::info!(coupon_id = coupon.id, code = %coupon.code, "Updated coupon");
        Ok(coupon)
    }

    pub async fn history(&self, coupon: &Coupon, filter: &HistoryFilter) -> Result<Vec<CouponHistory>> {
        self.history_repo.find(coupon.id, filter).await
    }

    /// Confirmed redemptions across all customers
    pub async fn count_redemptions(&self, coupon: &Coupon) -> Result<i64> {
        self.history_repo.count(coupon.id, &HistoryFilter::enabled()).await
    }

    pub async fn count_customer_redemptions(&self, coupon: &Coupon, customer_id: i64) -> Result<i64> {
        self.history_repo
            .count(coupon.id, &HistoryFilter::enabled().customer(customer_id))
            .await
    }

    pub async fn has_reached_max_redemption(&self, coupon: &Coupon) -> Result<bool> {
        if coupon.redemptions == RedemptionCap::Unlimited {
            return Ok(false);
        }
        let count = self.count_redemptions(coupon).await?;
        Ok(coupon.redemptions.is_reached(count))
    }

    pub async fn customer_has_max_redemption(&self, coupon: &Coupon, customer_id: i64) -> Result<bool> {
        if coupon.customer_redemptions == RedemptionCap::Unlimited {
            return Ok(false);
        }
        let count = self.count_customer_redemptions(coupon, customer_id).await?;
        Ok(coupon.customer_redemptions.is_reached(count))
    }

    /// Confirm the pending redemption recorded for `order_id`.
    ///
    /// Returns `Ok(false)` when the order has no pending history row for this
    /// coupon, including when it was already redeemed. No row is ever created.
    pub async fn redeem_coupon(&self, coupon: &Coupon, order_id: i64) -> Result<bool> {
        let Some(entry) = self
            .history_repo
            .first_pending_for_order(coupon.id, order_id)
            .await?
        else {
            tracing::warn!(coupon_id = coupon.id, order_id, "No pending coupon redemption for order");
            return Ok(false);
        };

        let redeemed = self.history_repo.touch_status(entry.id).await?;
        if redeemed {
            tracing::info!(
                coupon_id = coupon.id,
                order_id,
                history_id = entry.id,
                "Coupon redeemed"
            );
        }
        Ok(redeemed)
    }

    pub async fn check_eligibility(&self, code: &str, order: &OrderContext) -> Result<Eligibility> {
        self.check_eligibility_at(code, order, Local::now().naive_local()).await
    }

    /// Run every coupon rule for an order at the given local time.
    pub async fn check_eligibility_at(
        &self,
        code: &str,
        order: &OrderContext,
        now: NaiveDateTime,
    ) -> Result<Eligibility> {
        let Some(coupon) = self.coupon_repo.find_by_code(code).await? else {
            return Ok(Self::reject(code, RejectionReason::NotFound));
        };

        if !coupon.status {
            return Ok(Self::reject(code, RejectionReason::Disabled));
        }

        if coupon.is_expired_at(now) {
            return Ok(Self::reject(code, RejectionReason::Expired));
        }

        if coupon.has_restriction(&order.order_type) {
            return Ok(Self::reject(code, RejectionReason::Restricted));
        }

        if order.order_total < coupon.minimum_order_total() {
            return Ok(Self::reject(code, RejectionReason::BelowMinimum));
        }

        if self.has_reached_max_redemption(&coupon).await? {
            return Ok(Self::reject(code, RejectionReason::MaxRedemptions));
        }

        if let Some(customer_id) = order.customer_id {
            if self.customer_has_max_redemption(&coupon, customer_id).await? {
                return Ok(Self::reject(code, RejectionReason::CustomerMaxRedemptions));
            }
        }

        tracing::debug!(coupon_id = coupon.id, code, "Coupon is eligible");
        Ok(Eligibility::Eligible(coupon))
    }

    fn reject(code: &str, reason: RejectionReason) -> Eligibility {
        tracing::debug!(code, ?reason, "Coupon rejected");
        Eligibility::Rejected(reason)
    }
}
