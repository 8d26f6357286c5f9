use std::{convert::Infallible, time::Duration};

use radar::{
    exporter::{cursor, BatchError},
    settings::ExporterSettings,
    store::{enumerate_since, ScanCursor, Store},
};

use crate::common::{self, Harness, SCANNER};

#[tokio::test]
async fn exports_one_submission_per_session() -> anyhow::Result<()> {
    let harness = Harness::new();
    let store = &harness.store;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "A", 11, -70), 100)
        .await;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "B", 22, -60), 105)
        .await;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "A", 11, -80), 110)
        .await;

    let exporter = harness.exporter(common::settings());
    let next = exporter.export_batch(ScanCursor::default()).await?;
    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(110));

    let submissions = harness.sink.submissions();
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.timestamp, 1_005_000);
    assert_eq!(submission.gps.len(), 1);
    assert_eq!(submission.gps[0].timestamp, 1_000_000);
    assert!(submission.wifi.is_empty());

    let cells: Vec<(i64, Option<i64>)> = submission
        .cells
        .iter()
        .map(|cell| (cell.cid, cell.signal))
        .collect();
    assert_eq!(cells, vec![(22, Some(-60)), (11, Some(-70))]);

    // nothing left once the cursor is persisted
    assert_eq!(cursor::load(store.as_ref()).await.modified_ms, 110);
    let remaining = enumerate_since(store.as_ref(), 110, 100, |_| Ok::<_, Infallible>(())).await?;
    assert_eq!(remaining, 0);
    assert_eq!(exporter.export_batch(next.unwrap_or_default()).await?, None);
    Ok(())
}

#[tokio::test]
async fn failed_submission_leaves_cursor_in_place() -> anyhow::Result<()> {
    let harness = Harness::new();
    harness
        .store
        .insert_scan_at(SCANNER, &common::wifi_scan("Z1", "aa:bb", -55), 100)
        .await;
    harness.sink.fail_next(1);

    let exporter = harness.exporter(common::settings());
    let result = exporter.export_batch(ScanCursor::default()).await;
    assert!(matches!(result, Err(BatchError::Export(_))));
    assert!(harness.sink.submissions().is_empty());
    assert_eq!(
        cursor::load(harness.store.as_ref()).await,
        ScanCursor::default()
    );

    let retried = exporter.export_batch(ScanCursor::default()).await?;
    assert_eq!(retried.map(|cursor| cursor.modified_ms), Some(100));
    assert_eq!(harness.sink.submissions().len(), 1);
    Ok(())
}

#[tokio::test]
async fn store_outage_fails_the_batch() {
    let harness = Harness::new();
    harness
        .store
        .insert_scan_at(SCANNER, &common::wifi_scan("Z1", "aa:bb", -55), 100)
        .await;
    harness.store.set_unavailable(true);

    let exporter = harness.exporter(common::settings());
    let result = exporter.export_batch(ScanCursor::default()).await;
    assert!(matches!(result, Err(BatchError::Store(_))));
    assert!(harness.sink.submissions().is_empty());
}

#[tokio::test]
async fn mobile_access_points_are_left_out() -> anyhow::Result<()> {
    let harness = Harness::new();
    let here = "87JF2222+22";
    let there = "87JF22C2+22";

    let at = |mut scan: radar::scan::Scan, loc: &str| {
        scan.began_loc = loc.to_string();
        scan
    };
    let sightings = [
        at(common::wifi_scan("Z1", "hotspot", -40), here),
        at(common::wifi_scan("Z1", "office", -50), here),
        at(common::wifi_scan("Z2", "hotspot", -45), there),
        at(common::wifi_scan("Z2", "cafe", -65), there),
        at(common::wifi_scan("Z3", "hotspot", -42), there),
    ];
    for (modified_ms, scan) in (100..).zip(sightings.iter()) {
        harness.store.insert_scan_at(SCANNER, scan, modified_ms).await;
    }

    let exporter = harness.exporter(common::settings());
    exporter.export_batch(ScanCursor::default()).await?;

    let exported: Vec<Vec<String>> = harness
        .sink
        .submissions()
        .iter()
        .map(|submission| {
            submission
                .wifi
                .iter()
                .map(|wifi| wifi.bssid.clone())
                .collect()
        })
        .collect();
    assert_eq!(
        exported,
        vec![vec!["office".to_string()], vec!["cafe".to_string()]]
    );
    Ok(())
}

#[tokio::test]
async fn sessions_without_start_location_are_skipped() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut lost = common::wifi_scan("Z1", "aa:bb", -55);
    lost.began_loc = String::new();
    harness.store.insert_scan_at(SCANNER, &lost, 100).await;
    harness
        .store
        .insert_scan_at(SCANNER, &common::wifi_scan("Z2", "cc:dd", -60), 101)
        .await;

    let exporter = harness.exporter(common::settings());
    let next = exporter.export_batch(ScanCursor::default()).await?;

    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(101));
    assert_eq!(harness.sink.submissions().len(), 1);
    Ok(())
}

fn cells(harness: &Harness) -> Vec<Vec<(i64, Option<i64>)>> {
    harness
        .sink
        .submissions()
        .iter()
        .map(|submission| {
            submission
                .cells
                .iter()
                .map(|cell| (cell.cid, cell.signal))
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn session_larger_than_batch_limit_is_submitted_once() -> anyhow::Result<()> {
    let harness = Harness::new();
    let store = &harness.store;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "A", 11, -70), 100)
        .await;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "B", 22, -60), 101)
        .await;
    store
        .insert_scan_at(SCANNER, &common::lte_scan("Z1", "A", 11, -50), 102)
        .await;

    let exporter = harness.exporter(ExporterSettings {
        batch_limit: 2,
        ..common::settings()
    });
    let next = exporter.export_batch(ScanCursor::default()).await?;
    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(102));
    assert_eq!(exporter.export_batch(next.unwrap_or_default()).await?, None);

    assert_eq!(cells(&harness), vec![vec![(11, Some(-50)), (22, Some(-60))]]);
    Ok(())
}

#[tokio::test]
async fn batch_boundary_holds_back_the_cut_session() -> anyhow::Result<()> {
    let harness = Harness::new();
    let sightings = [
        common::lte_scan("Z1", "A", 11, -70),
        common::lte_scan("Z1", "B", 22, -60),
        common::lte_scan("Z2", "C", 33, -65),
        common::lte_scan("Z2", "D", 44, -55),
    ];
    for (modified_ms, scan) in (100..).zip(sightings.iter()) {
        harness.store.insert_scan_at(SCANNER, scan, modified_ms).await;
    }

    let exporter = harness.exporter(ExporterSettings {
        batch_limit: 3,
        ..common::settings()
    });
    let next = exporter.export_batch(ScanCursor::default()).await?;
    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(101));
    let next = exporter.export_batch(next.unwrap_or_default()).await?;
    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(103));

    assert_eq!(
        cells(&harness),
        vec![
            vec![(22, Some(-60)), (11, Some(-70))],
            vec![(44, Some(-55)), (33, Some(-65))],
        ]
    );
    Ok(())
}

#[tokio::test]
async fn sessions_with_out_of_range_times_are_skipped() -> anyhow::Result<()> {
    let harness = Harness::new();
    let mut far = common::lte_scan("Z1", "A", 11, -70);
    far.began = i64::MAX / 100;
    harness.store.insert_scan_at(SCANNER, &far, 100).await;
    let mut long = common::lte_scan("Z2", "B", 22, -60);
    long.duration = i64::MAX;
    harness.store.insert_scan_at(SCANNER, &long, 101).await;
    harness
        .store
        .insert_scan_at(SCANNER, &common::lte_scan("Z3", "C", 33, -65), 102)
        .await;

    let exporter = harness.exporter(common::settings());
    let next = exporter.export_batch(ScanCursor::default()).await?;

    assert_eq!(next.map(|cursor| cursor.modified_ms), Some(102));
    assert_eq!(cells(&harness), vec![vec![(33, Some(-65))]]);
    Ok(())
}

#[tokio::test]
async fn run_exports_when_woken() -> anyhow::Result<()> {
    let harness = Harness::new();
    let (trigger, shutdown) = triggered::trigger();
    let exporter = harness.exporter(common::settings());
    let handle = tokio::spawn(exporter.run(shutdown));

    harness
        .store
        .insert_scan(SCANNER, &common::lte_scan("Z1", "A", 11, -70))
        .await?;
    harness.wake.signal();

    let exported = tokio::time::timeout(Duration::from_secs(5), async {
        while harness.sink.submissions().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(exported.is_ok(), "exporter never submitted");

    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle).await???;
    assert!(cursor::load(harness.store.as_ref()).await.modified_ms > 0);
    Ok(())
}
