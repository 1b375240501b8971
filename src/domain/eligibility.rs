use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Coupon;

/// The order a coupon is being applied to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderContext {
    pub order_type: String,
    pub order_total: Decimal,
    /// `None` for guest checkouts, which skip the per-customer cap
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejectionReason {
    NotFound,
    Disabled,
    Expired,
    Restricted,
    BelowMinimum,
    MaxRedemptions,
    CustomerMaxRedemptions,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::NotFound => "Coupon code is invalid",
            RejectionReason::Disabled => "Coupon is not enabled",
            RejectionReason::Expired => "Coupon has expired",
            RejectionReason::Restricted => "Coupon is not valid for this order type",
            RejectionReason::BelowMinimum => "Order total is below the coupon minimum",
            RejectionReason::MaxRedemptions => "Coupon has reached its maximum redemptions",
            RejectionReason::CustomerMaxRedemptions => {
                "Coupon has reached its maximum redemptions for this customer"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Eligibility {
    Eligible(Coupon),
    Rejected(RejectionReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible(_))
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            Eligibility::Eligible(_) => None,
            Eligibility::Rejected(reason) => Some(*reason),
        }
    }
}
