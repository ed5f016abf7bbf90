mod common;

use chrono::Duration;
use common::{saturday, tuesday, TestEngine};
use pretty_assertions::assert_eq;
use slotgrid::domain::models::availability::{SlotPatch, SlotState};
use slotgrid::domain::models::time_block::DayType;
use slotgrid::error::EngineError;

#[tokio::test]
async fn test_absent_date_reads_as_none() {
    let app = TestEngine::new();
    assert!(app.state.availability_repo.get(tuesday()).await.unwrap().is_none());
    assert!(app
        .state
        .availability_repo
        .get_range(tuesday(), 30)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_set_slot_materializes_day_with_derived_day_type() {
    let app = TestEngine::new();

    app.set_slot(saturday(), "we-morning", "east", SlotPatch::booked(1)).await;

    let day = app.state.availability_repo.get(saturday()).await.unwrap().unwrap();
    assert_eq!(day.day_type, DayType::Weekend);
    assert_eq!(
        day.slot("we-morning", "east"),
        Some(&SlotState {
            available: true,
            booked: 1,
            capacity: 3,
        })
    );
}

#[tokio::test]
async fn test_partial_merge_preserves_omitted_fields() {
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::capacity(5)).await;
    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(4)).await;
    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::available(false)).await;

    let slot = app.slot(tuesday(), "wd-morning", "east").await.unwrap();
    assert_eq!(
        slot,
        SlotState {
            available: false,
            booked: 4,
            capacity: 5,
        }
    );
}

#[tokio::test]
async fn test_overbooked_write_is_accepted() {
    // The matrix does not bounds-check blind writes; it only logs them.
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(7)).await;

    let slot = app.slot(tuesday(), "wd-morning", "east").await.unwrap();
    assert_eq!(slot.booked, 7);
    assert_eq!(slot.capacity, 3);
}

#[tokio::test]
async fn test_manual_closure_keeps_existing_bookings() {
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(2)).await;
    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::available(false)).await;

    let slot = app.slot(tuesday(), "wd-morning", "east").await.unwrap();
    assert!(!slot.available);
    assert_eq!(slot.booked, 2);
}

#[tokio::test]
async fn test_past_dates_are_writable() {
    // Rejecting past dates is a caller-side policy, not an engine rule.
    let app = TestEngine::new();
    let last_year = tuesday() - Duration::days(365);

    app.set_slot(last_year, "wd-morning", "east", SlotPatch::available(false)).await;

    let slot = app.slot(last_year, "wd-morning", "east").await.unwrap();
    assert!(!slot.available);
}

#[tokio::test]
async fn test_get_range_honors_bounds() {
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(1)).await;
    app.set_slot(tuesday() + Duration::days(2), "wd-morning", "east", SlotPatch::booked(1)).await;
    app.set_slot(tuesday() + Duration::days(5), "wd-morning", "east", SlotPatch::booked(1)).await;

    let range = app
        .state
        .availability_repo
        .get_range(tuesday(), 5)
        .await
        .unwrap();
    assert_eq!(range.len(), 2);
    assert!(range.contains_key(&tuesday()));
    assert!(range.contains_key(&(tuesday() + Duration::days(2))));
    assert!(!range.contains_key(&(tuesday() + Duration::days(5))));
}

#[tokio::test]
async fn test_stale_version_write_conflicts() {
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(1)).await;
    let stale = app.state.availability_repo.get(tuesday()).await.unwrap().unwrap();

    // Another writer moves the record forward.
    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(2)).await;

    let err = app.state.availability_repo.put(&stale).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)), "got {err:?}");

    // The concurrent write survived.
    let slot = app.slot(tuesday(), "wd-morning", "east").await.unwrap();
    assert_eq!(slot.booked, 2);
}

#[tokio::test]
async fn test_put_bumps_version() {
    let app = TestEngine::new();

    app.set_slot(tuesday(), "wd-morning", "east", SlotPatch::booked(1)).await;
    let current = app.state.availability_repo.get(tuesday()).await.unwrap().unwrap();

    let stored = app.state.availability_repo.put(&current).await.unwrap();
    assert_eq!(stored.version, current.version + 1);
}
