use pretty_assertions::assert_eq;

use crate::common::{engine_with_holidays, test_engine, utc};

#[tokio::test]
async fn business_day_maps_to_its_own_local_midnight() {
    // Wed 2 Jul is a business day; midnight BST is 23:00Z the day before
    let adjusted = test_engine().next_business_day(utc(2025, 7, 2, 10, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 7, 1, 23, 0));
}

#[tokio::test]
async fn sunday_moves_to_monday() {
    let adjusted = test_engine().next_business_day(utc(2025, 10, 12, 10, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 10, 12, 23, 0));
}

#[tokio::test]
async fn christmas_moves_past_boxing_day_and_weekend() {
    let adjusted = test_engine().next_business_day(utc(2025, 12, 25, 15, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 12, 29, 0, 0));
}

#[tokio::test]
async fn good_friday_moves_past_easter_monday() {
    let adjusted = test_engine().next_business_day(utc(2025, 4, 18, 8, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 4, 21, 23, 0));
}

#[tokio::test]
async fn late_friday_utc_is_saturday_locally() {
    // 23:30Z Fri 22 Aug is Sat 23 Aug in London; Mon 25 Aug is a bank holiday
    let adjusted = test_engine().next_business_day(utc(2025, 8, 22, 23, 30)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 8, 25, 23, 0));
}

#[tokio::test]
async fn saturday_holiday_lands_on_monday() {
    // The adjuster only looks at the day it lands on, so Sat 11 Oct
    // rolls to Mon 13 Oct without further extension
    let engine = engine_with_holidays([crate::common::date(2025, 10, 11)]);
    let adjusted = engine.next_business_day(utc(2025, 10, 11, 12, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 10, 12, 23, 0));
}

#[tokio::test]
async fn saturday_and_monday_holidays_roll_to_tuesday() {
    let engine = engine_with_holidays([
        crate::common::date(2025, 10, 11),
        crate::common::date(2025, 10, 13),
    ]);
    let adjusted = engine.next_business_day(utc(2025, 10, 11, 12, 0)).await.unwrap();
    assert_eq!(adjusted, utc(2025, 10, 13, 23, 0));
}

#[tokio::test]
async fn adjustment_is_idempotent() {
    let engine = test_engine();
    let once = engine.next_business_day(utc(2025, 12, 25, 15, 0)).await.unwrap();
    let twice = engine.next_business_day(once).await.unwrap();
    assert_eq!(once, twice);
}
