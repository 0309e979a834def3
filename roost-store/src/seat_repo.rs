use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_inventory::{normalize_seat_number, Seat, SeatError, SeatRepository, SeatResult};
use roost_shared::{PageParams, Paginated};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

/// Postgres-backed seat inventory.
///
/// Uniqueness of live seat numbers is enforced by the `seats_number_unique`
/// partial index rather than a pre-check, so concurrent creates cannot slip
/// past each other.
pub struct PgSeatStore {
    pool: PgPool,
}

impl PgSeatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    id: Uuid,
    seat_number: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: row.id,
            seat_number: row.seat_number,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}

fn map_seat_error(err: sqlx::Error, seat_number: &str) -> SeatError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some("seats_number_unique") {
            return SeatError::DuplicateSeatNumber(seat_number.to_string());
        }
    }
    SeatError::Storage(err.into())
}

#[async_trait]
impl SeatRepository for PgSeatStore {
    async fn get(&self, id: Uuid) -> SeatResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, created_at, deleted_at FROM seats WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SeatError::Storage(e.into()))?;
        Ok(row.map(Seat::from))
    }

    async fn list(&self, search: Option<&str>, page: PageParams) -> SeatResult<Paginated<Seat>> {
        let pattern = search.map(|s| format!("%{}%", s.to_uppercase()));

        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM seats WHERE deleted_at IS NULL");
        if let Some(pattern) = &pattern {
            count_query.push(" AND seat_number LIKE ").push_bind(pattern);
        }
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SeatError::Storage(e.into()))?
            .get(0);

        let mut list_query = QueryBuilder::new(
            "SELECT id, seat_number, created_at, deleted_at FROM seats WHERE deleted_at IS NULL",
        );
        if let Some(pattern) = &pattern {
            list_query.push(" AND seat_number LIKE ").push_bind(pattern);
        }
        list_query
            .push(" ORDER BY seat_number LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<SeatRow> = list_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SeatError::Storage(e.into()))?;

        Ok(Paginated::new(
            rows.into_iter().map(Seat::from).collect(),
            total as u64,
            page,
        ))
    }

    async fn list_all(&self) -> SeatResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, created_at, deleted_at FROM seats \
             WHERE deleted_at IS NULL ORDER BY seat_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SeatError::Storage(e.into()))?;
        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn create(&self, seat_number: &str) -> SeatResult<Seat> {
        let seat_number = normalize_seat_number(seat_number)?;

        let row = sqlx::query_as::<_, SeatRow>(
            "INSERT INTO seats (id, seat_number) VALUES ($1, $2) \
             RETURNING id, seat_number, created_at, deleted_at",
        )
        .bind(Uuid::new_v4())
        .bind(&seat_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_seat_error(e, &seat_number))?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, seat_number: &str) -> SeatResult<Seat> {
        let seat_number = normalize_seat_number(seat_number)?;

        let row = sqlx::query_as::<_, SeatRow>(
            "UPDATE seats SET seat_number = $2 WHERE id = $1 \
             RETURNING id, seat_number, created_at, deleted_at",
        )
        .bind(id)
        .bind(&seat_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_seat_error(e, &seat_number))?;
        row.map(Seat::from).ok_or(SeatError::NotFound)
    }

    async fn soft_delete(&self, id: Uuid) -> SeatResult<Seat> {
        let row = sqlx::query_as::<_, SeatRow>(
            "UPDATE seats SET deleted_at = COALESCE(deleted_at, now()) WHERE id = $1 \
             RETURNING id, seat_number, created_at, deleted_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SeatError::Storage(e.into()))?;
        row.map(Seat::from).ok_or(SeatError::NotFound)
    }

    async fn count_active(&self) -> SeatResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SeatError::Storage(e.into()))?;
        Ok(total as u64)
    }
}
