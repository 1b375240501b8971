use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Separator used when `recurring_every` is flattened into a single column.
pub const RECURRING_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub coupon_type: CouponType,
    pub discount: Decimal,
    pub min_total: Decimal,
    pub redemptions: RedemptionCap,
    pub customer_redemptions: RedemptionCap,
    pub status: bool,
    pub order_restriction: Option<String>,
    pub validity: Validity,
    pub fixed_date: Option<NaiveDate>,
    pub fixed_from_time: Option<NaiveTime>,
    pub fixed_to_time: Option<NaiveTime>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    pub recurring_every: Vec<Weekday>,
    pub recurring_from_time: Option<NaiveTime>,
    pub recurring_to_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CouponType {
    Percentage,
    #[default]
    Fixed,
}

impl CouponType {
    /// Storage code for the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponType::Percentage => "P",
            CouponType::Fixed => "F",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "P" => Some(CouponType::Percentage),
            "F" => Some(CouponType::Fixed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CouponType::Percentage => "Percentage",
            CouponType::Fixed => "Fixed Amount",
        }
    }
}

/// When a coupon may be used.
///
/// Values read back from storage that match none of the known modes are kept
/// as `Other` so they can be written back untouched. Such coupons never expire,
/// and a request can keep one but never set one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Forever,
    FixedDate,
    Period,
    Recurring,
    Other(String),
}

impl Validity {
    pub fn as_str(&self) -> &str {
        match self {
            Validity::Forever => "forever",
            Validity::FixedDate => "fixed",
            Validity::Period => "period",
            Validity::Recurring => "recurring",
            Validity::Other(value) => value.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "forever" => Validity::Forever,
            "fixed" => Validity::FixedDate,
            "period" => Validity::Period,
            "recurring" => Validity::Recurring,
            other => Validity::Other(other.to_string()),
        }
    }
}

/// Redemption limit. A stored cap of NULL or 0 means the coupon is uncapped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RedemptionCap {
    #[default]
    Unlimited,
    Limited(u32),
}

impl RedemptionCap {
    pub fn from_column(value: Option<i64>) -> Self {
        match value {
            Some(n) if n > 0 => RedemptionCap::Limited(u32::try_from(n).unwrap_or(u32::MAX)),
            _ => RedemptionCap::Unlimited,
        }
    }

    pub fn to_column(&self) -> Option<i64> {
        match self {
            RedemptionCap::Unlimited => None,
            RedemptionCap::Limited(n) => Some(i64::from(*n)),
        }
    }

    /// True once `count` confirmed redemptions have used up the cap.
    pub fn is_reached(&self, count: i64) -> bool {
        match self {
            RedemptionCap::Unlimited => false,
            RedemptionCap::Limited(cap) => i64::from(*cap) <= count,
        }
    }
}

impl Coupon {
    pub fn type_name(&self) -> &'static str {
        self.coupon_type.label()
    }

    pub fn is_fixed(&self) -> bool {
        self.coupon_type == CouponType::Fixed
    }

    /// `10%` for percentage coupons, `1,250.00` for fixed amounts.
    pub fn formatted_discount(&self) -> String {
        match self.coupon_type {
            CouponType::Percentage => {
                let rounded = self
                    .discount
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                format!("{}%", rounded)
            }
            CouponType::Fixed => format_amount(self.discount),
        }
    }

    /// Signed discount as shown on order summaries.
    pub fn discount_with_operand(&self) -> String {
        if self.is_fixed() {
            format!("-{}", self.discount)
        } else {
            format!("-{}%", self.discount)
        }
    }

    pub fn minimum_order_total(&self) -> Decimal {
        self.min_total
    }

    /// True when the coupon only applies to another order type.
    pub fn has_restriction(&self, order_type: &str) -> bool {
        match self.order_restriction.as_deref() {
            Some(restriction) if !restriction.is_empty() => restriction != order_type,
            _ => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Local::now().naive_local())
    }

    /// Expiry check against an explicit local date-time.
    ///
    /// Date and time windows are inclusive at both ends, and a window given
    /// in reverse order is treated as if its bounds were swapped. A validity
    /// mode whose dates or times were never filled in is expired.
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        let today = now.date();
        let time = now.time();

        match &self.validity {
            Validity::Forever => false,
            Validity::FixedDate => match self.fixed_date {
                Some(date) if date == today => {
                    !within(time, self.fixed_from_time, self.fixed_to_time)
                }
                _ => true,
            },
            Validity::Period => {
                !within(today, self.period_start_date, self.period_end_date)
            }
            Validity::Recurring => {
                if !self.recurring_every.contains(&now.weekday()) {
                    return true;
                }
                !within(time, self.recurring_from_time, self.recurring_to_time)
            }
            Validity::Other(_) => false,
        }
    }
}

fn within<T: PartialOrd + Copy>(value: T, from: Option<T>, to: Option<T>) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => {
            let (low, high) = if from <= to { (from, to) } else { (to, from) };
            low <= value && value <= high
        }
        _ => false,
    }
}

/// Two decimals with thousands separators, no currency symbol.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Weekdays a recurring coupon can be scheduled on, Monday first.
pub fn recurring_every_options() -> [Weekday; 7] {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
}

/// Parse the stored `recurring_every` column into an ordered weekday list.
///
/// Only the exact tokens of [`recurring_every_options`] joined by
/// [`RECURRING_SEPARATOR`] are accepted, so `"Monday"`, `"mon"` and
/// `"Mon,Tue"` are errors rather than being rewritten.
pub fn parse_recurring_every(value: &str) -> Result<Vec<Weekday>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(RECURRING_SEPARATOR)
        .map(|token| {
            recurring_every_options()
                .into_iter()
                .find(|day| day.to_string() == token)
                .ok_or_else(|| AppError::Validation(format!("Invalid weekday: '{}'", token)))
        })
        .collect()
}

pub fn join_recurring_every(days: &[Weekday]) -> String {
    days.iter()
        .map(|day| day.to_string())
        .collect::<Vec<_>>()
        .join(RECURRING_SEPARATOR)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateCouponRequest {
    pub name: String,
    pub code: String,
    pub coupon_type: CouponType,
    pub discount: Decimal,
    #[serde(default)]
    pub min_total: Decimal,
    #[serde(default)]
    pub redemptions: RedemptionCap,
    #[serde(default)]
    pub customer_redemptions: RedemptionCap,
    pub status: bool,
    pub order_restriction: Option<String>,
    #[serde(default)]
    pub validity: Validity,
    pub fixed_date: Option<NaiveDate>,
    pub fixed_from_time: Option<NaiveTime>,
    pub fixed_to_time: Option<NaiveTime>,
    pub period_start_date: Option<NaiveDate>,
    pub period_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring_every: Vec<Weekday>,
    pub recurring_from_time: Option<NaiveTime>,
    pub recurring_to_time: Option<NaiveTime>,
}

impl CreateCouponRequest {
    /// Strip surrounding whitespace from the name and the code.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.code = self.code.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_details()?;
        self.validate_schedule()
    }

    /// Checks that do not depend on the validity mode.
    pub fn validate_details(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Coupon name is required".to_string()));
        }
        if self.code.trim().is_empty() {
            return Err(AppError::Validation("Coupon code is required".to_string()));
        }
        if self.discount <= Decimal::ZERO {
            return Err(AppError::Validation("Discount must be greater than zero".to_string()));
        }
        if self.coupon_type == CouponType::Percentage && self.discount > Decimal::ONE_HUNDRED {
            return Err(AppError::Validation(
                "Percentage discount cannot exceed 100".to_string(),
            ));
        }
        if self.min_total < Decimal::ZERO {
            return Err(AppError::Validation("Minimum total cannot be negative".to_string()));
        }

        Ok(())
    }

    /// Checks that the fields required by the validity mode are present.
    pub fn validate_schedule(&self) -> Result<()> {
        match self.validity {
            Validity::FixedDate => {
                if self.fixed_date.is_none()
                    || self.fixed_from_time.is_none()
                    || self.fixed_to_time.is_none()
                {
                    return Err(AppError::Validation(
                        "Fixed date coupons need a date and a time window".to_string(),
                    ));
                }
            }
            Validity::Period => match (self.period_start_date, self.period_end_date) {
                (Some(start), Some(end)) if start <= end => {}
                (Some(_), Some(_)) => {
                    return Err(AppError::Validation(
                        "Period start date must not be after its end date".to_string(),
                    ));
                }
                _ => {
                    return Err(AppError::Validation(
                        "Period coupons need a start and an end date".to_string(),
                    ));
                }
            },
            Validity::Recurring => {
                if self.recurring_every.is_empty() {
                    return Err(AppError::Validation(
                        "Recurring coupons need at least one weekday".to_string(),
                    ));
                }
                if self.recurring_from_time.is_none() || self.recurring_to_time.is_none() {
                    return Err(AppError::Validation(
                        "Recurring coupons need a time window".to_string(),
                    ));
                }
            }
            Validity::Forever => {}
            Validity::Other(ref value) => {
                return Err(AppError::Validation(format!("Unknown validity: {}", value)));
            }
        }

        Ok(())
    }
}

impl From<&Coupon> for CreateCouponRequest {
    fn from(coupon: &Coupon) -> Self {
        Self {
            name: coupon.name.clone(),
            code: coupon.code.clone(),
            coupon_type: coupon.coupon_type,
            discount: coupon.discount,
            min_total: coupon.min_total,
            redemptions: coupon.redemptions,
            customer_redemptions: coupon.customer_redemptions,
            status: coupon.status,
            order_restriction: coupon.order_restriction.clone(),
            validity: coupon.validity.clone(),
            fixed_date: coupon.fixed_date,
            fixed_from_time: coupon.fixed_from_time,
            fixed_to_time: coupon.fixed_to_time,
            period_start_date: coupon.period_start_date,
            period_end_date: coupon.period_end_date,
            recurring_every: coupon.recurring_every.clone(),
            recurring_from_time: coupon.recurring_from_time,
            recurring_to_time: coupon.recurring_to_time,
        }
    }
}

/// Partial update. Nullable columns use a nested `Option` so they can be cleared.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCouponRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub coupon_type: Option<CouponType>,
    pub discount: Option<Decimal>,
    pub min_total: Option<Decimal>,
    pub redemptions: Option<RedemptionCap>,
    pub customer_redemptions: Option<RedemptionCap>,
    pub status: Option<bool>,
    pub order_restriction: Option<Option<String>>,
    pub validity: Option<Validity>,
    pub fixed_date: Option<Option<NaiveDate>>,
    pub fixed_from_time: Option<Option<NaiveTime>>,
    pub fixed_to_time: Option<Option<NaiveTime>>,
    pub period_start_date: Option<Option<NaiveDate>>,
    pub period_end_date: Option<Option<NaiveDate>>,
    pub recurring_every: Option<Vec<Weekday>>,
    pub recurring_from_time: Option<Option<NaiveTime>>,
    pub recurring_to_time: Option<Option<NaiveTime>>,
}

impl UpdateCouponRequest {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| name.trim().to_string());
        self.code = self.code.map(|code| code.trim().to_string());
        self
    }

    /// Overlay the provided fields on top of `base`.
    pub fn apply_to(self, base: CreateCouponRequest) -> CreateCouponRequest {
        CreateCouponRequest {
            name: self.name.unwrap_or(base.name),
            code: self.code.unwrap_or(base.code),
            coupon_type: self.coupon_type.unwrap_or(base.coupon_type),
            discount: self.discount.unwrap_or(base.discount),
            min_total: self.min_total.unwrap_or(base.min_total),
            redemptions: self.redemptions.unwrap_or(base.redemptions),
            customer_redemptions: self.customer_redemptions.unwrap_or(base.customer_redemptions),
            status: self.status.unwrap_or(base.status),
            order_restriction: self.order_restriction.unwrap_or(base.order_restriction),
            validity: self.validity.unwrap_or(base.validity),
            fixed_date: self.fixed_date.unwrap_or(base.fixed_date),
            fixed_from_time: self.fixed_from_time.unwrap_or(base.fixed_from_time),
            fixed_to_time: self.fixed_to_time.unwrap_or(base.fixed_to_time),
            period_start_date: self.period_start_date.unwrap_or(base.period_start_date),
            period_end_date: self.period_end_date.unwrap_or(base.period_end_date),
            recurring_every: self.recurring_every.unwrap_or(base.recurring_every),
            recurring_from_time: self.recurring_from_time.unwrap_or(base.recurring_from_time),
            recurring_to_time: self.recurring_to_time.unwrap_or(base.recurring_to_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coupon(coupon_type: CouponType, discount: Decimal) -> Coupon {
        Coupon {
            id: 1,
            name: "Test".to_string(),
            code: "TEST".to_string(),
            coupon_type,
            discount,
            min_total: Decimal::ZERO,
            redemptions: RedemptionCap::Unlimited,
            customer_redemptions: RedemptionCap::Unlimited,
            status: true,
            order_restriction: None,
            validity: Validity::Forever,
            fixed_date: None,
            fixed_from_time: None,
            fixed_to_time: None,
            period_start_date: None,
            period_end_date: None,
            recurring_every: Vec::new(),
            recurring_from_time: None,
            recurring_to_time: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn hm(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn test_formatted_discount() {
        assert_eq!(coupon(CouponType::Percentage, dec!(10.00)).formatted_discount(), "10%");
        assert_eq!(coupon(CouponType::Percentage, dec!(12.5)).formatted_discount(), "13%");
        assert_eq!(coupon(CouponType::Percentage, dec!(7.49)).formatted_discount(), "7%");
        assert_eq!(coupon(CouponType::Fixed, dec!(5)).formatted_discount(), "5.00");
        assert_eq!(coupon(CouponType::Fixed, dec!(2.505)).formatted_discount(), "2.51");
        assert_eq!(coupon(CouponType::Fixed, dec!(1250.5)).formatted_discount(), "1,250.50");
        assert_eq!(coupon(CouponType::Fixed, dec!(1234567)).formatted_discount(), "1,234,567.00");
    }

    #[test]
    fn test_type_name_and_operand() {
        let pct = coupon(CouponType::Percentage, dec!(15));
        let fixed = coupon(CouponType::Fixed, dec!(4.50));

        assert_eq!(pct.type_name(), "Percentage");
        assert_eq!(fixed.type_name(), "Fixed Amount");
        assert!(!pct.is_fixed());
        assert!(fixed.is_fixed());
        assert_eq!(pct.discount_with_operand(), "-15%");
        assert_eq!(fixed.discount_with_operand(), "-4.50");
    }

    #[test]
    fn test_recurring_every_round_trip() {
        for stored in ["", "Mon", "Mon, Wed, Fri", "Sun, Sat", "Tue, Thu, Sat, Sun"] {
            let days = parse_recurring_every(stored).unwrap();
            assert_eq!(join_recurring_every(&days), stored);
        }

        assert_eq!(parse_recurring_every("").unwrap(), Vec::<Weekday>::new());
        assert_eq!(
            parse_recurring_every("Fri, Mon").unwrap(),
            vec![Weekday::Fri, Weekday::Mon]
        );
        assert_eq!(join_recurring_every(&[]), "");
        assert!(parse_recurring_every("Mon, Funday").is_err());
    }

    #[test]
    fn test_recurring_every_rejects_loose_tokens() {
        for stored in ["Monday", "mon", "MON", "Mon,Tue", "Mon,  Tue", " Mon", "Mon, ", "  "] {
            assert!(
                matches!(parse_recurring_every(stored), Err(AppError::Validation(_))),
                "{:?} should be rejected",
                stored
            );
        }
    }

    #[test]
    fn test_recurring_every_options() {
        let options = recurring_every_options();
        assert_eq!(options.len(), 7);
        assert_eq!(options[0], Weekday::Mon);
        assert_eq!(options[6], Weekday::Sun);
        assert_eq!(
            join_recurring_every(&options),
            "Mon, Tue, Wed, Thu, Fri, Sat, Sun"
        );
    }

    #[test]
    fn test_forever_never_expires() {
        let mut c = coupon(CouponType::Fixed, dec!(5));
        c.period_start_date = NaiveDate::from_ymd_opt(2000, 1, 1);
        c.period_end_date = NaiveDate::from_ymd_opt(2000, 1, 2);
        assert!(!c.is_expired_at(at(1999, 12, 31, 0, 0)));
        assert!(!c.is_expired_at(at(2024, 6, 1, 12, 0)));
        assert!(!c.is_expired());
    }

    #[test]
    fn test_period_expiry() {
        let mut c = coupon(CouponType::Fixed, dec!(5));
        c.validity = Validity::Period;
        c.period_start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        c.period_end_date = NaiveDate::from_ymd_opt(2024, 1, 31);

        assert!(!c.is_expired_at(at(2024, 1, 15, 12, 0)));
        assert!(!c.is_expired_at(at(2024, 1, 1, 0, 0)));
        assert!(!c.is_expired_at(at(2024, 1, 31, 23, 59)));
        assert!(c.is_expired_at(at(2024, 2, 1, 0, 0)));
        assert!(c.is_expired_at(at(2023, 12, 31, 23, 59)));

        c.period_end_date = None;
        assert!(c.is_expired_at(at(2024, 1, 15, 12, 0)));
    }

    #[test]
    fn test_recurring_expiry() {
        let mut c = coupon(CouponType::Percentage, dec!(10));
        c.validity = Validity::Recurring;
        c.recurring_every = vec![Weekday::Mon];
        c.recurring_from_time = hm(9, 0);
        c.recurring_to_time = hm(17, 0);

        // 2024-01-15 is a Monday
        assert!(!c.is_expired_at(at(2024, 1, 15, 10, 0)));
        assert!(c.is_expired_at(at(2024, 1, 15, 20, 0)));
        assert!(c.is_expired_at(at(2024, 1, 16, 10, 0)));
        assert!(!c.is_expired_at(at(2024, 1, 15, 17, 0)));
    }

    #[test]
    fn test_fixed_date_expiry() {
        let mut c = coupon(CouponType::Fixed, dec!(3));
        c.validity = Validity::FixedDate;
        c.fixed_date = NaiveDate::from_ymd_opt(2024, 3, 10);
        c.fixed_from_time = hm(18, 0);
        c.fixed_to_time = hm(22, 0);

        assert!(!c.is_expired_at(at(2024, 3, 10, 19, 30)));
        assert!(c.is_expired_at(at(2024, 3, 10, 12, 0)));
        assert!(c.is_expired_at(at(2024, 3, 11, 19, 30)));
        assert!(c.is_expired_at(at(2024, 3, 9, 19, 30)));

        // reversed window behaves like the ordered one
        c.fixed_from_time = hm(22, 0);
        c.fixed_to_time = hm(18, 0);
        assert!(!c.is_expired_at(at(2024, 3, 10, 19, 30)));
    }

    #[test]
    fn test_unknown_validity_is_not_expired() {
        let mut c = coupon(CouponType::Fixed, dec!(3));
        c.validity = Validity::from_str("seasonal");
        assert_eq!(c.validity, Validity::Other("seasonal".to_string()));
        assert_eq!(c.validity.as_str(), "seasonal");
        assert!(!c.is_expired_at(at(2024, 3, 10, 19, 30)));
    }

    #[test]
    fn test_has_restriction() {
        let mut c = coupon(CouponType::Fixed, dec!(3));
        assert!(!c.has_restriction("delivery"));

        c.order_restriction = Some("collection".to_string());
        assert!(c.has_restriction("delivery"));
        assert!(!c.has_restriction("collection"));

        c.order_restriction = Some("delivery".to_string());
        assert!(!c.has_restriction("delivery"));

        c.order_restriction = Some(String::new());
        assert!(!c.has_restriction("delivery"));
    }

    #[test]
    fn test_redemption_cap() {
        assert_eq!(RedemptionCap::from_column(None), RedemptionCap::Unlimited);
        assert_eq!(RedemptionCap::from_column(Some(0)), RedemptionCap::Unlimited);
        assert_eq!(RedemptionCap::from_column(Some(3)), RedemptionCap::Limited(3));
        assert_eq!(RedemptionCap::Limited(3).to_column(), Some(3));
        assert_eq!(RedemptionCap::Unlimited.to_column(), None);

        assert!(!RedemptionCap::Unlimited.is_reached(1_000));
        assert!(!RedemptionCap::Limited(3).is_reached(2));
        assert!(RedemptionCap::Limited(3).is_reached(3));
        assert!(RedemptionCap::Limited(3).is_reached(4));
    }

    #[test]
    fn test_coupon_type_codes() {
        assert_eq!(CouponType::Percentage.as_str(), "P");
        assert_eq!(CouponType::from_str("F"), Some(CouponType::Fixed));
        assert_eq!(CouponType::from_str("X"), None);
        assert_eq!(Validity::from_str("fixed"), Validity::FixedDate);
        assert_eq!(Validity::Recurring.as_str(), "recurring");
    }

    #[test]
    fn test_validate_request() {
        let valid = CreateCouponRequest {
            name: "Spring".to_string(),
            code: "SPRING".to_string(),
            coupon_type: CouponType::Percentage,
            discount: dec!(20),
            status: true,
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let too_much = CreateCouponRequest { discount: dec!(120), ..valid.clone() };
        assert!(matches!(too_much.validate(), Err(AppError::Validation(_))));

        let no_code = CreateCouponRequest { code: "  ".to_string(), ..valid.clone() };
        assert!(no_code.validate().is_err());

        let backwards = CreateCouponRequest {
            validity: Validity::Period,
            period_start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            period_end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..valid.clone()
        };
        assert!(backwards.validate().is_err());

        let no_days = CreateCouponRequest {
            validity: Validity::Recurring,
            recurring_from_time: hm(9, 0),
            recurring_to_time: hm(17, 0),
            ..valid
        };
        assert!(no_days.validate().is_err());
    }

    #[test]
    fn test_validate_schedule_separately() {
        let seasonal = CreateCouponRequest {
            name: "Harvest".to_string(),
            code: "HARVEST".to_string(),
            discount: dec!(5),
            validity: Validity::Other("seasonal".to_string()),
            ..Default::default()
        };
        assert!(seasonal.validate_details().is_ok());
        assert!(matches!(seasonal.validate_schedule(), Err(AppError::Validation(_))));
        assert!(seasonal.validate().is_err());
    }

    #[test]
    fn test_normalized_trims_name_and_code() {
        let request = CreateCouponRequest {
            name: "  Pad  ".to_string(),
            code: " PAD ".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(request.name, "Pad");
        assert_eq!(request.code, "PAD");

        let update = UpdateCouponRequest {
            code: Some("\tNEW ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(update.code.as_deref(), Some("NEW"));
        assert_eq!(update.name, None);
    }

    #[test]
    fn test_update_apply_to() {
        let base = CreateCouponRequest {
            name: "Spring".to_string(),
            code: "SPRING".to_string(),
            discount: dec!(5),
            order_restriction: Some("delivery".to_string()),
            status: true,
            ..Default::default()
        };

        let merged = UpdateCouponRequest {
            discount: Some(dec!(7.50)),
            order_restriction: Some(None),
            ..Default::default()
        }
        .apply_to(base);

        assert_eq!(merged.name, "Spring");
        assert_eq!(merged.discount, dec!(7.50));
        assert_eq!(merged.order_restriction, None);
        assert!(merged.status);
    }
}
