use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use roost_booking::{Booking, BookingFilter, BookingLedger, BookingStatus, DayStats, LedgerError, LedgerResult};
use roost_shared::{PageParams, Paginated};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

/// Postgres-backed booking ledger.
///
/// The two partial unique indexes (`bookings_active_seat_per_day`,
/// `bookings_active_employee_per_day`) make `insert` atomic against both
/// uniqueness invariants; the compare-and-set in `transition` is a single
/// conditional UPDATE, so a racing writer simply matches zero rows.
pub struct PgBookingLedger {
    pool: PgPool,
}

impl PgBookingLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str =
    "id, employee_id, seat_id, booking_date, status, check_in_time, created_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    employee_id: Uuid,
    seat_id: Uuid,
    booking_date: NaiveDate,
    status: String,
    check_in_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = LedgerError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|e| LedgerError::Storage(anyhow::anyhow!(e)))?;
        Ok(Booking {
            id: row.id,
            employee_id: row.employee_id,
            seat_id: row.seat_id,
            booking_date: row.booking_date,
            status,
            check_in_time: row.check_in_time,
            created_at: row.created_at,
        })
    }
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::Storage(err.into())
}

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn get(&self, id: Uuid) -> LedgerResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_active(&self, seat_id: Uuid, date: NaiveDate) -> LedgerResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE seat_id = $1 AND booking_date = $2 AND status IN ('confirmed', 'checked_in')"
        ))
        .bind(seat_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Booking::try_from).transpose()
    }

    async fn find_active_for_employee(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE employee_id = $1 AND booking_date = $2 AND status IN ('confirmed', 'checked_in')"
        ))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Booking::try_from).transpose()
    }

    async fn insert(
        &self,
        employee_id: Uuid,
        seat_id: Uuid,
        date: NaiveDate,
    ) -> LedgerResult<Booking> {
        let result = sqlx::query_as::<_, BookingRow>(&format!(
            "INSERT INTO bookings (id, employee_id, seat_id, booking_date, status) \
             VALUES ($1, $2, $3, $4, 'confirmed') \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(seat_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(err) => {
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.is_unique_violation() {
                        return Err(match db_err.constraint() {
                            Some("bookings_active_employee_per_day") => {
                                LedgerError::EmployeeAlreadyBooked { employee_id, date }
                            }
                            _ => LedgerError::SeatTaken { seat_id, date },
                        });
                    }
                }
                Err(storage(err))
            }
        }
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        to: BookingStatus,
        check_in_time: Option<DateTime<Utc>>,
    ) -> LedgerResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings \
             SET status = $3, \
                 check_in_time = CASE WHEN $3 = 'checked_in' THEN $4 ELSE check_in_time END \
             WHERE id = $1 AND status = $2 \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(to.as_str())
        .bind(check_in_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        if let Some(row) = row {
            return row.try_into();
        }

        // Zero rows matched: either the booking is gone or another writer
        // got there first. Report which.
        let actual: Option<String> = sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        match actual {
            None => Err(LedgerError::NotFound),
            Some(actual) => Err(LedgerError::Stale {
                expected,
                actual: actual
                    .parse()
                    .map_err(|e: String| LedgerError::Storage(anyhow::anyhow!(e)))?,
            }),
        }
    }

    async fn list_for_date(&self, date: NaiveDate) -> LedgerResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_date = $1"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_for_employee(
        &self,
        employee_id: Uuid,
        filter: &BookingFilter,
        page: PageParams,
    ) -> LedgerResult<Paginated<Booking>> {
        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM bookings WHERE employee_id = ");
        count_query.push_bind(employee_id);
        if let Some(status) = filter.status {
            count_query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(date) = filter.date {
            count_query.push(" AND booking_date = ").push_bind(date);
        }
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?
            .get(0);

        let mut list_query = QueryBuilder::new(format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE employee_id = "
        ));
        list_query.push_bind(employee_id);
        if let Some(status) = filter.status {
            list_query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(date) = filter.date {
            list_query.push(" AND booking_date = ").push_bind(date);
        }
        list_query
            .push(" ORDER BY booking_date DESC, created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<BookingRow> = list_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        let items: Vec<Booking> = rows
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Paginated::new(items, total as u64, page))
    }

    async fn find_stale(&self, today: NaiveDate) -> LedgerResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE status = 'confirmed' AND booking_date < $1"
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn stats_for_date(&self, date: NaiveDate) -> LedgerResult<DayStats> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM bookings \
             WHERE booking_date = $1 AND status IN ('confirmed', 'checked_in') \
             GROUP BY status",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let mut stats = DayStats::default();
        for (status, count) in rows {
            let count = count as u64;
            match status.as_str() {
                "confirmed" => stats.confirmed = count,
                "checked_in" => stats.checked_in = count,
                _ => {}
            }
            stats.total += count;
        }
        Ok(stats)
    }
}
