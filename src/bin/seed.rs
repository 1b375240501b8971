use coupons::{
    domain::{
        CouponType, CreateCouponRequest, NewCouponHistory, RedemptionCap, Validity,
    },
    repository::{
        CouponHistoryRepository, CouponRepository,
        SqliteCouponHistoryRepository, SqliteCouponRepository,
    },
};
use chrono::{Local, NaiveTime, Weekday, Duration};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🌱 Starting database seeding...");

    // Initialize database connection
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:coupons.db?mode=rwc".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let coupon_repo = SqliteCouponRepository::new(db_pool.clone());
    let history_repo = SqliteCouponHistoryRepository::new(db_pool.clone());

    println!("🎟️  Creating coupons...");
    let today = Local::now().date_naive();

    let welcome = coupon_repo.create(CreateCouponRequest {
        name: "Welcome Discount".to_string(),
        code: "WELCOME10".to_string(),
        coupon_type: CouponType::Percentage,
        discount: Decimal::new(10, 0),
        customer_redemptions: RedemptionCap::Limited(1),
        status: true,
        ..Default::default()
    }).await?;

    let five_off = coupon_repo.create(CreateCouponRequest {
        name: "Five Off Thirty".to_string(),
        code: "FIVEOFF".to_string(),
        coupon_type: CouponType::Fixed,
        discount: Decimal::new(500, 2),
        min_total: Decimal::new(3000, 2),
        redemptions: RedemptionCap::Limited(100),
        status: true,
        order_restriction: Some("delivery".to_string()),
        ..Default::default()
    }).await?;

    coupon_repo.create(CreateCouponRequest {
        name: "Weekday Happy Hour".to_string(),
        code: "HAPPYHOUR".to_string(),
        coupon_type: CouponType::Percentage,
        discount: Decimal::new(15, 0),
        status: true,
        validity: Validity::Recurring,
        recurring_every: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        recurring_from_time: NaiveTime::from_hms_opt(15, 0, 0),
        recurring_to_time: NaiveTime::from_hms_opt(18, 0, 0),
        ..Default::default()
    }).await?;

    coupon_repo.create(CreateCouponRequest {
        name: "Launch Month".to_string(),
        code: "LAUNCH".to_string(),
        coupon_type: CouponType::Fixed,
        discount: Decimal::new(250, 2),
        status: true,
        validity: Validity::Period,
        period_start_date: Some(today),
        period_end_date: Some(today + Duration::days(30)),
        ..Default::default()
    }).await?;

    coupon_repo.create(CreateCouponRequest {
        name: "Retired Promo".to_string(),
        code: "OLDPROMO".to_string(),
        coupon_type: CouponType::Fixed,
        discount: Decimal::new(1000, 2),
        status: false,
        ..Default::default()
    }).await?;

    println!("  ✅ Created 5 coupons");

    println!("🧾 Recording redemption history...");
    for (order_id, customer_id, confirmed) in [(1001, Some(1), true), (1002, Some(2), true), (1003, None, false)] {
        history_repo.create(NewCouponHistory {
            coupon_id: five_off.id,
            order_id,
            customer_id,
            code: five_off.code.clone(),
            min_total: five_off.min_total,
            amount: five_off.discount,
            status: confirmed,
        }).await?;
    }

    history_repo.create(NewCouponHistory {
        coupon_id: welcome.id,
        order_id: 1004,
        customer_id: Some(3),
        code: welcome.code.clone(),
        min_total: welcome.min_total,
        amount: Decimal::new(420, 2),
        status: false,
    }).await?;

    println!("  ✅ Recorded 4 history rows (2 pending)");
    println!("🎉 Seeding complete!");

    Ok(())
}
