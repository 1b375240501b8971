pub mod coupon;
pub mod coupon_history;
pub mod eligibility;
pub mod filter;

pub use coupon::*;
pub use coupon_history::*;
pub use eligibility::*;
pub use filter::*;
