//! Tests for POST /payments/verify: signature gating, activation,
//! idempotence, and the at-most-once properties around coupon usage.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

const ORDER_ID: &str = "order_Nxje8LkAqzTOWE";
const PAYMENT_ID: &str = "pay_NxjeJ9XWJvshyQ";

fn verify_body(signature: &str, coupon_id: Option<&str>) -> serde_json::Value {
    json!({
        "razorpay_order_id": ORDER_ID,
        "razorpay_payment_id": PAYMENT_ID,
        "razorpay_signature": signature,
        "couponId": coupon_id,
        "baseAmount": 999.0,
        "gstAmount": 44.95,
        "discountAmount": 100.0,
        "totalAmount": 943.95,
    })
}

/// Flip the last hex character of a signature.
fn tamper(signature: &str) -> String {
    let mut chars: Vec<char> = signature.chars().collect();
    let last = chars.last_mut().unwrap();
    *last = if *last == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

#[tokio::test]
async fn missing_auth_returns_401() {
    let app = billing_app(create_test_app_state());

    let response = app
        .oneshot(post_json(
            "/payments/verify",
            None,
            &verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn valid_signature_activates_subscription() {
    let state = create_test_app_state();
    let coupon_id;
    {
        let conn = state.db.get().unwrap();
        coupon_id = create_test_coupon(&conn, &percent_coupon("WELCOME10", 10.0)).id;
    }

    let token = mint_token("user-123", Some("asha@example.com"));
    let app = billing_app(state.clone());

    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), Some(&coupon_id)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let invoice = body["invoiceNumber"].as_str().unwrap();
    let parts: Vec<&str> = invoice.splitn(3, '-').collect();
    assert_eq!(parts[0], "PYG");
    assert_eq!(parts[1].len(), 8, "date segment is YYYYMMDD");
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2], "NXJEJ9XWJVSHYQ", "token derives from the payment id");

    let conn = state.db.get().unwrap();

    // Payment row: immutable, captured, server-derived amounts
    let payment = queries::get_payment_by_gateway_payment_id(&conn, PAYMENT_ID)
        .unwrap()
        .expect("payment row should exist");
    assert_eq!(payment.user_id, "user-123");
    assert_eq!(payment.status, PaymentStatus::Captured);
    assert_eq!(payment.base_amount, 999.0);
    assert_eq!(payment.discount_amount, 100.0);
    assert_eq!(payment.gst_amount, 44.95);
    assert_eq!(payment.total_amount, 943.95);
    assert_eq!(payment.coupon_id.as_deref(), Some(coupon_id.as_str()));
    assert_eq!(payment.invoice_number, invoice);

    // Subscription: active yearly, expiring about a year out
    let subscription = queries::get_subscription(&conn, "user-123")
        .unwrap()
        .expect("subscription should exist");
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.plan_type, PlanType::Yearly);
    assert_eq!(subscription.razorpay_payment_id, PAYMENT_ID);
    let lifetime = subscription.expires_at - subscription.starts_at;
    assert!(
        (364 * ONE_DAY..=367 * ONE_DAY).contains(&lifetime),
        "expected roughly one year, got {} days",
        lifetime / ONE_DAY
    );

    // Coupon usage moved exactly once
    let coupon = queries::get_coupon_by_id(&conn, &coupon_id).unwrap().unwrap();
    assert_eq!(coupon.times_used, 1);
}

#[tokio::test]
async fn no_coupon_records_full_price() {
    let state = create_test_app_state();
    let token = mint_token("user-456", None);
    let app = billing_app(state.clone());

    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &json!({
                "razorpay_order_id": ORDER_ID,
                "razorpay_payment_id": PAYMENT_ID,
                "razorpay_signature": sign_payment(ORDER_ID, PAYMENT_ID),
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let conn = state.db.get().unwrap();
    let payment = queries::get_payment_by_gateway_payment_id(&conn, PAYMENT_ID)
        .unwrap()
        .unwrap();
    assert_eq!(payment.discount_amount, 0.0);
    assert_eq!(payment.gst_amount, 49.95);
    assert_eq!(payment.total_amount, 1048.95);
    assert_eq!(payment.coupon_id, None);
}

#[tokio::test]
async fn tampered_signature_is_rejected_with_no_writes() {
    let state = create_test_app_state();
    let token = mint_token("user-123", None);
    let app = billing_app(state.clone());

    let forged = tamper(&sign_payment(ORDER_ID, PAYMENT_ID));
    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &verify_body(&forged, None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Payment verification failed");

    let conn = state.db.get().unwrap();
    assert_eq!(queries::count_payments(&conn).unwrap(), 0);
    assert_eq!(queries::count_subscriptions(&conn).unwrap(), 0);
}

#[tokio::test]
async fn signature_over_different_order_is_rejected() {
    let state = create_test_app_state();
    let token = mint_token("user-123", None);
    let app = billing_app(state);

    // Valid digest, wrong order id underneath
    let stolen = sign_payment("order_SomeoneElse00", PAYMENT_ID);
    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &verify_body(&stolen, None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_verification_is_a_safe_no_op() {
    let state = create_test_app_state();
    let coupon_id;
    {
        let conn = state.db.get().unwrap();
        coupon_id = create_test_coupon(&conn, &percent_coupon("ONCE", 10.0)).id;
    }

    let token = mint_token("user-123", None);
    let body = verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), Some(&coupon_id));

    let first = billing_app(state.clone())
        .oneshot(post_json("/payments/verify", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first_invoice = body_json(first).await["invoiceNumber"]
        .as_str()
        .unwrap()
        .to_string();

    let second = billing_app(state.clone())
        .oneshot(post_json("/payments/verify", Some(&token), &body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = body_json(second).await;
    assert_eq!(second_body["success"], true);
    assert_eq!(second_body["invoiceNumber"], first_invoice.as_str());

    let conn = state.db.get().unwrap();
    assert_eq!(queries::count_payments(&conn).unwrap(), 1);
    let coupon = queries::get_coupon_by_id(&conn, &coupon_id).unwrap().unwrap();
    assert_eq!(coupon.times_used, 1, "usage must not double-increment");
}

#[tokio::test]
async fn replaying_another_users_payment_is_rejected() {
    let state = create_test_app_state();
    let body = verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), None);

    let owner = mint_token("user-123", None);
    let first = billing_app(state.clone())
        .oneshot(post_json("/payments/verify", Some(&owner), &body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let intruder = mint_token("user-999", None);
    let second = billing_app(state.clone())
        .oneshot(post_json("/payments/verify", Some(&intruder), &body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let conn = state.db.get().unwrap();
    assert_eq!(
        queries::get_subscription(&conn, "user-999").unwrap().is_none(),
        true,
        "the replaying user must not gain a subscription"
    );
}

#[tokio::test]
async fn unknown_coupon_id_falls_back_to_full_price() {
    let state = create_test_app_state();
    let token = mint_token("user-123", None);
    let app = billing_app(state.clone());

    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), Some("no-such-coupon")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let conn = state.db.get().unwrap();
    let payment = queries::get_payment_by_gateway_payment_id(&conn, PAYMENT_ID)
        .unwrap()
        .unwrap();
    assert_eq!(payment.coupon_id, None);
    assert_eq!(payment.total_amount, 1048.95);
}

#[tokio::test]
async fn missing_gateway_config_is_an_internal_error() {
    let app = billing_app(state_without_gateway());
    let token = mint_token("user-123", None);

    let response = app
        .oneshot(post_json(
            "/payments/verify",
            Some(&token),
            &verify_body(&sign_payment(ORDER_ID, PAYMENT_ID), None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Payment gateway not configured");
}
