mod common;

use pumpflow_api::models::CalendarBlock;
use pumpflow_api::scheduling::{overlaps, Interval};

fn assert_no_overlaps(blocks: &[CalendarBlock]) {
    for (i, a) in blocks.iter().enumerate() {
        for b in blocks.iter().skip(i + 1) {
            let ia = Interval::new(a.start, a.end).unwrap();
            let ib = Interval::new(b.start, b.end).unwrap();
            assert!(
                !overlaps(&ia, &ib),
                "blocks {} and {} overlap: [{}, {}) vs [{}, {})",
                a.id,
                b.id,
                a.start,
                a.end,
                b.start,
                b.end
            );
        }
    }
}

// Two racing schedule requests for the same interval: exactly one wins.
#[tokio::test]
async fn identical_intervals_have_at_most_one_winner() {
    let state = common::test_state();
    let scheduler = state.services.scheduling.clone();

    let mut tasks = vec![];
    for _ in 0..20 {
        let scheduler = scheduler.clone();
        let pump = common::seed_pump(&state, "ANSI 3x4-13").await;
        tasks.push(tokio::spawn(async move {
            scheduler
                .schedule(
                    pump.id,
                    Some("2024-06-03T00:00:00Z"),
                    Some("2024-06-05T00:00:00Z"),
                )
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(
        successes, 1,
        "exactly one of the racing placements should win; got {}",
        successes
    );
    let calendar = scheduler.calendar().await.unwrap();
    assert_eq!(calendar.len(), 1);
}

// Many concurrent placements over a band of overlapping intervals: the
// surviving set must satisfy the no-overlap invariant regardless of how
// the races resolve.
#[tokio::test]
async fn concurrent_placements_never_commit_overlapping_blocks() {
    let state = common::test_state();
    let scheduler = state.services.scheduling.clone();

    let mut tasks = vec![];
    for day in 1..=24u32 {
        let scheduler = scheduler.clone();
        let pump = common::seed_pump(&state, "ANSI 3x4-13").await;
        // Staggered 2-day intervals: day N to N+2, so neighbours overlap
        let start = format!("2024-06-{:02}T00:00:00Z", day);
        let end = format!("2024-06-{:02}T00:00:00Z", day + 2);
        tasks.push(tokio::spawn(async move {
            scheduler
                .schedule(pump.id, Some(&start), Some(&end))
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    let calendar = scheduler.calendar().await.unwrap();
    assert_eq!(calendar.len(), successes);
    assert!(successes >= 1);
    assert_no_overlaps(&calendar);
}

// Racing schedule and unschedule on disjoint intervals must leave the
// calendar consistent with the set of successful operations.
#[tokio::test]
async fn mixed_schedule_and_unschedule_stay_consistent() {
    let state = common::test_state();
    let scheduler = state.services.scheduling.clone();

    // Seed three committed placements on disjoint days
    let mut committed = vec![];
    for (start, end) in [
        ("2024-07-01T00:00:00Z", "2024-07-03T00:00:00Z"),
        ("2024-07-05T00:00:00Z", "2024-07-07T00:00:00Z"),
        ("2024-07-09T00:00:00Z", "2024-07-11T00:00:00Z"),
    ] {
        let pump = common::seed_pump(&state, "ANSI 3x4-13").await;
        let outcome = scheduler
            .schedule(pump.id, Some(start), Some(end))
            .await
            .unwrap();
        committed.push(outcome);
    }

    // Concurrently unschedule the middle block and schedule a new pump
    // into the freed window plus one unrelated window.
    let unschedule = {
        let scheduler = scheduler.clone();
        let block_id = committed[1].block.id;
        let pump_id = committed[1].pump.id;
        tokio::spawn(async move { scheduler.unschedule(block_id, pump_id).await.is_ok() })
    };
    let fill = {
        let scheduler = scheduler.clone();
        let pump = common::seed_pump(&state, "ANSI 3x4-13").await;
        tokio::spawn(async move {
            scheduler
                .schedule(
                    pump.id,
                    Some("2024-07-05T00:00:00Z"),
                    Some("2024-07-07T00:00:00Z"),
                )
                .await
                .is_ok()
        })
    };
    let unrelated = {
        let scheduler = scheduler.clone();
        let pump = common::seed_pump(&state, "ANSI 3x4-13").await;
        tokio::spawn(async move {
            scheduler
                .schedule(
                    pump.id,
                    Some("2024-07-20T00:00:00Z"),
                    Some("2024-07-22T00:00:00Z"),
                )
                .await
                .is_ok()
        })
    };

    assert!(unschedule.await.unwrap());
    let _fill_won = fill.await.unwrap();
    assert!(unrelated.await.unwrap());

    // Whatever interleaving happened, the invariant holds
    let calendar = scheduler.calendar().await.unwrap();
    assert_no_overlaps(&calendar);
}
