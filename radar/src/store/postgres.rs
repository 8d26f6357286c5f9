use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use sqlx::{Pool, Postgres};

use super::{ScanCursor, Store};
use crate::{
    contact::Contact,
    error::StoreError,
    scan::{Scan, ScanRecord},
    track::Track,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn insert_scan(&self, source_id: &str, scan: &Scan) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into scan (
                sid, zid, xid, cell, time, duration, distance, bearing,
                began, began_loc, began_loc_hdop, began_loc_time, began_motion_time,
                ended, ended_loc, ended_loc_hdop, ended_loc_time, ended_motion_time,
                rat, mcc, mnc, tac, cid, pci, band, chan, freq,
                bssid, psc, rssi, rsrp, rsrq, rscp, snr, ssid
            ) values (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18,
                $19, $20, $21, $22, $23, $24, $25, $26, $27,
                $28, $29, $30, $31, $32, $33, $34, $35
            )
            "#,
        )
        .bind(source_id)
        .bind(&scan.session_id)
        .bind(&scan.transmitter_id)
        .bind(&scan.cell)
        .bind(scan.time)
        .bind(scan.duration)
        .bind(scan.distance)
        .bind(scan.bearing)
        .bind(scan.began)
        .bind(&scan.began_loc)
        .bind(scan.began_loc_hdop)
        .bind(scan.began_loc_time)
        .bind(scan.began_motion_time)
        .bind(scan.ended)
        .bind(&scan.ended_loc)
        .bind(scan.ended_loc_hdop)
        .bind(scan.ended_loc_time)
        .bind(scan.ended_motion_time)
        .bind(scan.rat)
        .bind(scan.mcc)
        .bind(scan.mnc)
        .bind(scan.tac)
        .bind(scan.cid)
        .bind(scan.pci)
        .bind(scan.band)
        .bind(scan.chan)
        .bind(scan.freq)
        .bind(&scan.bssid)
        .bind(scan.psc)
        .bind(scan.rssi)
        .bind(scan.rsrp)
        .bind(scan.rsrq)
        .bind(scan.rscp)
        .bind(scan.snr)
        .bind(&scan.ssid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_track(&self, source_id: &str, track: &Track) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into track (
                sid, cell, added, loc, time, hdop, journey, jcount,
                motion, motion_time, motion_distance, motion_bearing, motion_velocity,
                temperature, humidity, pressure, usb, charging, heartbeat
            ) values (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(source_id)
        .bind(&track.cell)
        .bind(track.added)
        .bind(&track.loc)
        .bind(track.time)
        .bind(track.hdop)
        .bind(track.journey)
        .bind(track.jcount)
        .bind(track.motion)
        .bind(track.motion_time)
        .bind(track.motion_distance)
        .bind(track.motion_bearing)
        .bind(track.motion_velocity)
        .bind(track.temperature)
        .bind(track.humidity)
        .bind(track.pressure)
        .bind(track.usb)
        .bind(track.charging)
        .bind(track.heartbeat)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_contact(&self, contact: &Contact) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into contact (sid, time, sn, name, affiliation, role, email)
            values ($1, $2, $3, $4, $5, $6, $7)
            on conflict (sid) do update set
            time = EXCLUDED.time,
            sn = EXCLUDED.sn,
            name = EXCLUDED.name,
            affiliation = EXCLUDED.affiliation,
            role = EXCLUDED.role,
            email = EXCLUDED.email,
            db_modified = now()
            "#,
        )
        .bind(&contact.device_uid)
        .bind(contact.time)
        .bind(&contact.serial_number)
        .bind(&contact.info.name)
        .bind(&contact.info.affiliation)
        .bind(&contact.info.role)
        .bind(&contact.info.email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn scans_after(
        &self,
        cursor: ScanCursor,
        limit: usize,
    ) -> BoxStream<'_, Result<ScanRecord, StoreError>> {
        sqlx::query_as::<_, ScanRecord>(
            r#"
            select * from scan
            where (db_modified, db_serial) > ($1, $2)
            order by db_modified, db_serial
            limit $3
            "#,
        )
        .bind(cursor.modified_ms)
        .bind(cursor.serial)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch(&self.pool)
        .map_err(StoreError::from)
        .boxed()
    }

    async fn sighting_locations(&self, transmitter_id: &str) -> Result<Vec<String>, StoreError> {
        let locations = sqlx::query_scalar::<_, String>(
            r#"
            select distinct began_loc from scan
            where xid = $1 and began_loc <> ''
            "#,
        )
        .bind(transmitter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    async fn get_state(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(db_store::state::get_value(&self.pool, key).await?)
    }

    async fn set_state(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        Ok(db_store::state::save_value(&self.pool, key, value).await?)
    }
}
