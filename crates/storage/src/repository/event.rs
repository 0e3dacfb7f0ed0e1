use sqlx::PgPool;

use super::ensure_table;
use crate::dto::NewEvent;
use crate::error::Result;
use crate::models::Event;

pub const EVENTS_TABLE: &str = "events";

pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List events starting within a calendar year
    pub async fn list_by_year(&self, year: i32) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT event_id, event_name, track, event_type, source, start_date, end_date,
                   completed, updated_at
            FROM events
            WHERE EXTRACT(YEAR FROM start_date)::INT = $1
            ORDER BY start_date
            "#,
        )
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// Insert or overwrite events, keyed by (name, start year).
    pub async fn upsert_many(&self, table: &str, source: &str, events: &[NewEvent]) -> Result<u64> {
        ensure_table(table, EVENTS_TABLE)?;

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for event in events {
            let result = sqlx::query(
                r#"
                INSERT INTO events (event_name, track, event_type, source, start_date, end_date,
                                    event_year, completed)
                VALUES ($1, $2, $3, $4, $5, $6, EXTRACT(YEAR FROM $5::DATE)::INT, $7)
                ON CONFLICT (event_name, event_year)
                DO UPDATE SET
                    track = EXCLUDED.track,
                    event_type = EXCLUDED.event_type,
                    source = EXCLUDED.source,
                    start_date = EXCLUDED.start_date,
                    end_date = EXCLUDED.end_date,
                    completed = EXCLUDED.completed,
                    updated_at = NOW()
                "#,
            )
            .bind(&event.name)
            .bind(&event.track)
            .bind(&event.event_type)
            .bind(source)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(i16::from(event.completed))
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}
