use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_core::identity::{
    Employee, EmployeeCounts, EmployeeError, EmployeeFilter, EmployeeRepository, EmployeeResult,
    EmployeeRole, EmployeeStatus, EmployeeUpdate, NewEmployee,
};
use roost_shared::{PageParams, Paginated};
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

/// Postgres-backed employee directory.
pub struct PgEmployeeDirectory {
    pool: PgPool,
}

impl PgEmployeeDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EMPLOYEE_COLUMNS: &str = "id, badge, name, email, role, status, created_at";

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    badge: String,
    name: String,
    email: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn role_from_str(role: &str) -> EmployeeResult<EmployeeRole> {
    match role {
        "employee" => Ok(EmployeeRole::Employee),
        "admin" => Ok(EmployeeRole::Admin),
        other => Err(EmployeeError::Storage(anyhow::anyhow!(
            "unknown employee role: {other}"
        ))),
    }
}

fn role_to_str(role: EmployeeRole) -> &'static str {
    match role {
        EmployeeRole::Employee => "employee",
        EmployeeRole::Admin => "admin",
    }
}

fn status_from_str(status: &str) -> EmployeeResult<EmployeeStatus> {
    match status {
        "active" => Ok(EmployeeStatus::Active),
        "inactive" => Ok(EmployeeStatus::Inactive),
        other => Err(EmployeeError::Storage(anyhow::anyhow!(
            "unknown employee status: {other}"
        ))),
    }
}

fn status_to_str(status: EmployeeStatus) -> &'static str {
    match status {
        EmployeeStatus::Active => "active",
        EmployeeStatus::Inactive => "inactive",
    }
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = EmployeeError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            badge: row.badge,
            name: row.name,
            email: row.email,
            role: role_from_str(&row.role)?,
            status: status_from_str(&row.status)?,
            created_at: row.created_at,
        })
    }
}

fn storage(err: sqlx::Error) -> EmployeeError {
    EmployeeError::Storage(err.into())
}

fn push_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &EmployeeFilter) {
    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role_to_str(role));
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status_to_str(status));
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        query
            .push(" AND (badge ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl EmployeeRepository for PgEmployeeDirectory {
    async fn get(&self, id: Uuid) -> EmployeeResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Employee::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageParams,
    ) -> EmployeeResult<Paginated<Employee>> {
        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM employees WHERE TRUE");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?
            .get(0);

        let mut list_query = QueryBuilder::new(format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE TRUE"
        ));
        push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<EmployeeRow> = list_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        let items: Vec<Employee> = rows
            .into_iter()
            .map(Employee::try_from)
            .collect::<Result<_, _>>()?;

        Ok(Paginated::new(items, total as u64, page))
    }

    async fn create(&self, new: NewEmployee) -> EmployeeResult<Employee> {
        let badge = new.badge.trim().to_string();
        if badge.is_empty() {
            return Err(EmployeeError::EmptyBadge);
        }

        let result = sqlx::query_as::<_, EmployeeRow>(&format!(
            "INSERT INTO employees (id, badge, name, email, role, status) \
             VALUES ($1, $2, $3, $4, $5, 'active') \
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&badge)
        .bind(&new.name)
        .bind(&new.email)
        .bind(role_to_str(new.role))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            Err(err) => {
                if let sqlx::Error::Database(db_err) = &err {
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some("employees_badge_unique")
                    {
                        return Err(EmployeeError::DuplicateBadge(badge));
                    }
                }
                Err(storage(err))
            }
        }
    }

    async fn update(&self, id: Uuid, update: EmployeeUpdate) -> EmployeeResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "UPDATE employees SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 role = COALESCE($4, role), \
                 status = COALESCE($5, status) \
             WHERE id = $1 \
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.role.map(role_to_str))
        .bind(update.status.map(status_to_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Employee::try_from)
            .transpose()?
            .ok_or(EmployeeError::NotFound)
    }

    async fn deactivate(&self, id: Uuid) -> EmployeeResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "UPDATE employees SET status = 'inactive' WHERE id = $1 \
             RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Employee::try_from)
            .transpose()?
            .ok_or(EmployeeError::NotFound)
    }

    async fn count_by_status(&self) -> EmployeeResult<EmployeeCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM employees GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(storage)?;

        let mut counts = EmployeeCounts {
            active: 0,
            inactive: 0,
        };
        for (status, count) in rows {
            match status.as_str() {
                "active" => counts.active = count as u64,
                "inactive" => counts.inactive = count as u64,
                _ => {}
            }
        }
        Ok(counts)
    }
}
