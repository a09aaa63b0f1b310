mod razorpay;

pub use razorpay::*;
