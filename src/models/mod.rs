mod coupon;
mod payment;
mod profile;
mod subscription;

pub use coupon::*;
pub use payment::*;
pub use profile::*;
pub use subscription::*;
