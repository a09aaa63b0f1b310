//! Playoga billing - subscription purchase pipeline for the Playoga video app
//!
//! This library provides the server side of the yearly-subscription checkout:
//! coupon pricing, Razorpay order creation, and cryptographic payment
//! verification followed by subscription activation.

pub mod auth;
pub mod config;
pub mod coupons;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod invoice;
pub mod models;
pub mod payments;
pub mod pricing;
