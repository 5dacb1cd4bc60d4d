///! OTP registry against a real Redis.
///!
///! Needs a reachable server; skipped unless `REDIS_URL` is set.
///!
///! Run with: `REDIS_URL=redis://127.0.0.1/ cargo test --test redis_otp_test -- --ignored`
use std::sync::Arc;
use std::time::Duration;

use suraksha_backend::cache::{RedisCache, keys};
use suraksha_backend::otp::{DEFAULT_OTP_TTL, OtpRegistry, RedisOtpRegistry};

async fn connect(test_name: &str) -> Option<RedisCache> {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        eprintln!("skipping {test_name}: REDIS_URL not set");
        return None;
    };
    match RedisCache::new(&redis_url).await {
        Ok(cache) => Some(cache),
        Err(err) => {
            eprintln!("skipping {test_name}: redis not reachable ({err})");
            None
        }
    }
}

fn registry(cache: RedisCache, ttl: Duration) -> RedisOtpRegistry {
    RedisOtpRegistry::new(cache, Arc::new(mockable::DefaultClock), ttl)
}

fn test_phone(tag: &str) -> String {
    format!("+91{tag}{}", std::process::id())
}

/// Two distinct codes for the same phone, the second one pending.
async fn resend_until_different(otp: &RedisOtpRegistry, phone: &str, first: &str) -> String {
    loop {
        let next = otp.send(phone).await.unwrap();
        if next != first {
            return next;
        }
    }
}

#[tokio::test]
#[ignore = "requires REDIS_URL and local Redis"]
async fn stale_read_cannot_delete_a_resent_code() {
    let Some(cache) = connect("stale_read_cannot_delete_a_resent_code").await else {
        return;
    };
    let otp = registry(cache.clone(), DEFAULT_OTP_TTL);
    let phone = test_phone("1");
    let key = keys::otp(&phone);

    let first = otp.send(&phone).await.unwrap();
    let read_before_resend = cache.get_raw(&key).await.unwrap().unwrap();
    let second = resend_until_different(&otp, &phone, &first).await;

    // A verifier that read the first record loses its delete.
    assert!(
        !cache
            .delete_if_equals(&key, &read_before_resend)
            .await
            .unwrap()
    );
    assert!(!otp.verify(&phone, &first).await.unwrap());
    assert!(otp.verify(&phone, &second).await.unwrap());
    assert!(cache.get_raw(&key).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires REDIS_URL and local Redis"]
async fn verified_code_is_single_use() {
    let Some(cache) = connect("verified_code_is_single_use").await else {
        return;
    };
    let otp = registry(cache, DEFAULT_OTP_TTL);
    let phone = test_phone("2");

    let code = otp.send(&phone).await.unwrap();
    let wrong = if code == "123456" { "654321" } else { "123456" };

    assert!(!otp.verify(&phone, wrong).await.unwrap());
    assert!(otp.verify(&phone, &code).await.unwrap());
    assert!(!otp.verify(&phone, &code).await.unwrap());
}
