use sqlx::PgPool;

use super::ensure_table;
use crate::dto::NewRider;
use crate::error::{Result, StorageError};
use crate::models::Rider;

pub const RIDERS_TABLE: &str = "riders";

/// Repository for rider rows, keyed by (name, race number, class).
pub struct RiderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RiderRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the riders stored for a class, ordered by race number
    pub async fn list_by_class(&self, gp_class: &str) -> Result<Vec<Rider>> {
        let riders = sqlx::query_as::<_, Rider>(
            r#"
            SELECT rider_id, rider_name, hashtag, race_number, team, bike, gp_class,
                   country, place_of_birth, date_of_birth, height_cm, weight_kg, updated_at
            FROM riders
            WHERE gp_class = $1
            ORDER BY race_number, rider_name
            "#,
        )
        .bind(gp_class)
        .fetch_all(self.pool)
        .await?;

        Ok(riders)
    }

    pub async fn find(&self, name: &str, race_number: i16, gp_class: &str) -> Result<Rider> {
        sqlx::query_as::<_, Rider>(
            r#"
            SELECT rider_id, rider_name, hashtag, race_number, team, bike, gp_class,
                   country, place_of_birth, date_of_birth, height_cm, weight_kg, updated_at
            FROM riders
            WHERE rider_name = $1 AND race_number = $2 AND gp_class = $3
            "#,
        )
        .bind(name)
        .bind(race_number)
        .bind(gp_class)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Insert or overwrite a batch of riders in one transaction.
    ///
    /// Returns the number of rows written.
    pub async fn upsert_many(&self, table: &str, gp_class: &str, riders: &[NewRider]) -> Result<u64> {
        ensure_table(table, RIDERS_TABLE)?;

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for rider in riders {
            let result = sqlx::query(
                r#"
                INSERT INTO riders (rider_name, hashtag, race_number, team, bike, gp_class,
                                    country, place_of_birth, date_of_birth, height_cm, weight_kg)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (rider_name, race_number, gp_class)
                DO UPDATE SET
                    hashtag = EXCLUDED.hashtag,
                    team = EXCLUDED.team,
                    bike = EXCLUDED.bike,
                    country = EXCLUDED.country,
                    place_of_birth = EXCLUDED.place_of_birth,
                    date_of_birth = EXCLUDED.date_of_birth,
                    height_cm = EXCLUDED.height_cm,
                    weight_kg = EXCLUDED.weight_kg,
                    updated_at = NOW()
                "#,
            )
            .bind(&rider.name)
            .bind(&rider.hashtag)
            .bind(rider.race_number)
            .bind(&rider.team)
            .bind(&rider.bike)
            .bind(gp_class)
            .bind(&rider.country)
            .bind(&rider.place_of_birth)
            .bind(rider.date_of_birth)
            .bind(rider.height_cm)
            .bind(rider.weight_kg)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}
