use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coupons::{
    config::Settings,
    domain::{Coupon, CouponFilter, CouponQuery, Eligibility, OrderContext},
    service::ServiceContext,
};

#[derive(Parser)]
#[command(name = "coupons", about = "Inspect and redeem discount coupons")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List coupons, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
        /// Coupon type code (P or F)
        #[arg(long = "type")]
        coupon_type: Option<String>,
        /// 1 for enabled, 0 for disabled
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        per_page: Option<i64>,
    },
    /// Check whether a code can be applied to an order
    Check {
        code: String,
        #[arg(long, default_value = "delivery")]
        order_type: String,
        #[arg(long, default_value = "0")]
        total: Decimal,
        #[arg(long)]
        customer: Option<i64>,
    },
    /// Confirm the pending redemption of a code for an order
    Redeem {
        code: String,
        #[arg(long)]
        order: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coupons=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let context = ServiceContext::new(db_pool);
    let coupons = &context.coupon_service;

    match cli.command {
        Command::List { search, coupon_type, status, page, per_page } => {
            let filter = CouponFilter {
                filter_search: search,
                filter_type: coupon_type,
                filter_status: status,
            };
            let per_page = per_page.unwrap_or(settings.coupons.per_page);
            let query = CouponQuery::new().filter(&filter).paginate(page, per_page);

            let total = coupons.count(&query).await?;
            for coupon in coupons.list(&query).await? {
                print_coupon(&coupon, coupons.count_redemptions(&coupon).await?);
            }
            println!("{} coupon(s), page {}", total, page.max(1));
        }
        Command::Check { code, order_type, total, customer } => {
            let order = OrderContext {
                order_type,
                order_total: total,
                customer_id: customer,
            };
            match coupons.check_eligibility(&code, &order).await? {
                Eligibility::Eligible(coupon) => {
                    println!(
                        "{} applies: {} ({})",
                        coupon.code,
                        coupon.formatted_discount(),
                        coupon.discount_with_operand()
                    );
                }
                Eligibility::Rejected(reason) => {
                    println!("{} rejected: {}", code, reason.message());
                }
            }
        }
        Command::Redeem { code, order } => {
            let Some(coupon) = coupons.get_by_code(&code).await? else {
                anyhow::bail!("Unknown coupon code: {}", code);
            };
            if coupons.redeem_coupon(&coupon, order).await? {
                println!("Redeemed {} for order {}", coupon.code, order);
            } else {
                println!("Nothing to redeem for {} on order {}", coupon.code, order);
            }
        }
    }

    Ok(())
}

fn print_coupon(coupon: &Coupon, redeemed: i64) {
    println!(
        "#{:<4} {:<12} {:<24} {:<13} {:>10}  {:<9} {:<8} redeemed {}",
        coupon.id,
        coupon.code,
        coupon.name,
        coupon.type_name(),
        coupon.formatted_discount(),
        coupon.validity.as_str(),
        if coupon.status { "enabled" } else { "disabled" },
        redeemed,
    );
}
