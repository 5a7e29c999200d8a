use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Ground, Sport},
    error::{AppError, Result},
    repository::GroundRepository,
};

#[derive(FromRow)]
struct GroundRow {
    id: String,
    name: String,
    owner_id: String,
    open_from: String,
    open_to: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct SportRow {
    name: String,
    price_per_hour_cents: i64,
}

pub struct SqliteGroundRepository {
    pool: SqlitePool,
}

impl SqliteGroundRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_ground(row: GroundRow, sports: Vec<Sport>) -> Result<Ground> {
        Ok(Ground {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            owner_id: Uuid::parse_str(&row.owner_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            open_from: row.open_from,
            open_to: row.open_to,
            sports,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn load_sports(&self, ground_id: &str) -> Result<Vec<Sport>> {
        let rows = sqlx::query_as::<_, SportRow>(
            r#"
            SELECT name, price_per_hour_cents
            FROM ground_sports
            WHERE ground_id = ?
            ORDER BY name
            "#,
        )
        .bind(ground_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|r| Sport {
                name: r.name,
                price_per_hour_cents: r.price_per_hour_cents,
            })
            .collect())
    }
}

#[async_trait]
impl GroundRepository for SqliteGroundRepository {
    async fn create(&self, ground: Ground) -> Result<Ground> {
        let id_str = ground.id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO grounds (id, name, owner_id, open_from, open_to, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&ground.name)
        .bind(ground.owner_id.to_string())
        .bind(&ground.open_from)
        .bind(&ground.open_to)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        for sport in &ground.sports {
            sqlx::query(
                r#"
                INSERT INTO ground_sports (ground_id, name, price_per_hour_cents)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&id_str)
            .bind(&sport.name)
            .bind(sport.price_per_hour_cents)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(ground.id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created ground".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ground>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, GroundRow>(
            r#"
            SELECT id, name, owner_id, open_from, open_to, created_at, updated_at
            FROM grounds
            WHERE id = ?
            "#,
        )
        .bind(&id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => {
                let sports = self.load_sports(&id_str).await?;
                Ok(Some(Self::row_to_ground(r, sports)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Ground>> {
        let rows = sqlx::query_as::<_, GroundRow>(
            r#"
            SELECT id, name, owner_id, open_from, open_to, created_at, updated_at
            FROM grounds
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut grounds = Vec::with_capacity(rows.len());
        for row in rows {
            let sports = self.load_sports(&row.id).await?;
            grounds.push(Self::row_to_ground(row, sports)?);
        }
        Ok(grounds)
    }
}
