use std::convert::Infallible;

use radar::{
    contact::{Contact, ContactInfo},
    exporter::cursor,
    store::{enumerate_after, PgStore, ScanCursor, Store},
    track::Track,
};
use sqlx::PgPool;

use crate::common::{self, SCANNER};

#[sqlx::test]
#[ignore = "postgres required"]
async fn scans_are_enumerated_in_modification_order(pool: PgPool) -> anyhow::Result<()> {
    let store = PgStore::new(pool);
    store
        .insert_scan(SCANNER, &common::lte_scan("Z1", "A", 11, -70))
        .await?;
    store
        .insert_scan(SCANNER, &common::wifi_scan("Z1", "aa:bb", -50))
        .await?;

    let mut seen = vec![];
    let count = enumerate_after(&store, ScanCursor::default(), 10, |record| {
        seen.push(record);
        Ok::<_, Infallible>(())
    })
    .await?;

    assert_eq!(count, 2);
    assert!(ScanCursor::of(&seen[0]) < ScanCursor::of(&seen[1]));
    assert_eq!(seen[0].scan, common::lte_scan("Z1", "A", 11, -70));
    assert_eq!(seen[1].source_id, SCANNER);

    let rest = enumerate_after(&store, ScanCursor::of(&seen[0]), 10, |_| {
        Ok::<_, Infallible>(())
    })
    .await?;
    assert_eq!(rest, 1);
    Ok(())
}

#[sqlx::test]
#[ignore = "postgres required"]
async fn export_cursor_survives_restart(pool: PgPool) -> anyhow::Result<()> {
    let store = PgStore::new(pool.clone());
    assert_eq!(cursor::load(&store).await, ScanCursor::default());

    let saved = ScanCursor {
        modified_ms: 110,
        serial: 3,
    };
    cursor::save(&store, saved).await?;

    let reopened = PgStore::new(pool);
    assert_eq!(cursor::load(&reopened).await, saved);
    Ok(())
}

#[sqlx::test]
#[ignore = "postgres required"]
async fn tracks_contacts_and_sightings(pool: PgPool) -> anyhow::Result<()> {
    let store = PgStore::new(pool.clone());

    let track = Track {
        loc: "87JC9W76+2X".to_string(),
        jcount: 2,
        ..Track::default()
    }
    .with_cell();
    store.insert_track(SCANNER, &track).await?;
    let tracks: i64 = sqlx::query_scalar("select count(*) from track where sid = $1")
        .bind(SCANNER)
        .fetch_one(&pool)
        .await?;
    assert_eq!(tracks, 1);

    let mut contact = Contact {
        device_uid: SCANNER.to_string(),
        serial_number: "radar-7".to_string(),
        time: 1_700_000_000,
        info: ContactInfo {
            name: "Ada".to_string(),
            ..ContactInfo::default()
        },
    };
    store.upsert_contact(&contact).await?;
    contact.info.email = "ada@example.com".to_string();
    store.upsert_contact(&contact).await?;
    let email: String = sqlx::query_scalar("select email from contact where sid = $1")
        .bind(SCANNER)
        .fetch_one(&pool)
        .await?;
    assert_eq!(email, "ada@example.com");

    let here = common::wifi_scan("Z1", "aa:bb", -50);
    let mut there = here.clone();
    there.began_loc = "87JC9W00+".to_string();
    store.insert_scan(SCANNER, &here).await?;
    store.insert_scan(SCANNER, &here).await?;
    store.insert_scan(SCANNER, &there).await?;
    let mut locations = store.sighting_locations("aa:bb").await?;
    locations.sort();
    assert_eq!(locations, vec!["87JC9W00+", "87JC9W76+2X"]);
    Ok(())
}
