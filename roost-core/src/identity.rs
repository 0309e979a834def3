use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roost_shared::{PageParams, Paginated};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Directory entry for an employee who can hold bookings.
///
/// The booking core trusts the identity attached to each request; this
/// directory exists for administration (invites, deactivation, dashboard
/// counts), not for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    /// Company badge number, unique among all employees.
    pub badge: String,
    pub name: String,
    pub email: String,
    pub role: EmployeeRole,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Employee,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub badge: String,
    pub name: String,
    pub email: String,
    pub role: EmployeeRole,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<EmployeeRole>,
    pub status: Option<EmployeeStatus>,
}

/// Filter for directory listings.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    /// Case-insensitive substring match against badge, name and email.
    pub search: Option<String>,
    pub role: Option<EmployeeRole>,
    pub status: Option<EmployeeStatus>,
}

/// Active/inactive headcount for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmployeeCounts {
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum EmployeeError {
    #[error("employee not found")]
    NotFound,

    #[error("badge {0} is already registered")]
    DuplicateBadge(String),

    #[error("badge must not be empty")]
    EmptyBadge,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type EmployeeResult<T> = Result<T, EmployeeError>;

/// Data access seam for the employee directory.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> EmployeeResult<Option<Employee>>;

    /// Newest first, like every other directory listing.
    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageParams,
    ) -> EmployeeResult<Paginated<Employee>>;

    async fn create(&self, new: NewEmployee) -> EmployeeResult<Employee>;

    async fn update(&self, id: Uuid, update: EmployeeUpdate) -> EmployeeResult<Employee>;

    /// Soft delete: flips status to inactive, booking history stays intact.
    async fn deactivate(&self, id: Uuid) -> EmployeeResult<Employee>;

    async fn count_by_status(&self) -> EmployeeResult<EmployeeCounts>;
}

/// In-memory directory used by tests and single-node deployments.
pub struct MemoryEmployeeDirectory {
    employees: Mutex<HashMap<Uuid, Employee>>,
}

impl MemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self {
            employees: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryEmployeeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(employee: &Employee, filter: &EmployeeFilter) -> bool {
    if let Some(role) = filter.role {
        if employee.role != role {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if employee.status != status {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        let hit = employee.badge.to_lowercase().contains(&needle)
            || employee.name.to_lowercase().contains(&needle)
            || employee.email.to_lowercase().contains(&needle);
        if !hit {
            return false;
        }
    }
    true
}

#[async_trait]
impl EmployeeRepository for MemoryEmployeeDirectory {
    async fn get(&self, id: Uuid) -> EmployeeResult<Option<Employee>> {
        Ok(self.employees.lock().await.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &EmployeeFilter,
        page: PageParams,
    ) -> EmployeeResult<Paginated<Employee>> {
        let employees = self.employees.lock().await;
        let mut matched: Vec<Employee> = employees
            .values()
            .filter(|e| matches(e, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Paginated::new(items, total, page))
    }

    async fn create(&self, new: NewEmployee) -> EmployeeResult<Employee> {
        let badge = new.badge.trim().to_string();
        if badge.is_empty() {
            return Err(EmployeeError::EmptyBadge);
        }

        let mut employees = self.employees.lock().await;
        if employees.values().any(|e| e.badge == badge) {
            return Err(EmployeeError::DuplicateBadge(badge));
        }

        let employee = Employee {
            id: Uuid::new_v4(),
            badge,
            name: new.name,
            email: new.email,
            role: new.role,
            status: EmployeeStatus::Active,
            created_at: Utc::now(),
        };
        employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: Uuid, update: EmployeeUpdate) -> EmployeeResult<Employee> {
        let mut employees = self.employees.lock().await;
        let employee = employees.get_mut(&id).ok_or(EmployeeError::NotFound)?;
        if let Some(name) = update.name {
            employee.name = name;
        }
        if let Some(email) = update.email {
            employee.email = email;
        }
        if let Some(role) = update.role {
            employee.role = role;
        }
        if let Some(status) = update.status {
            employee.status = status;
        }
        Ok(employee.clone())
    }

    async fn deactivate(&self, id: Uuid) -> EmployeeResult<Employee> {
        let mut employees = self.employees.lock().await;
        let employee = employees.get_mut(&id).ok_or(EmployeeError::NotFound)?;
        employee.status = EmployeeStatus::Inactive;
        Ok(employee.clone())
    }

    async fn count_by_status(&self) -> EmployeeResult<EmployeeCounts> {
        let employees = self.employees.lock().await;
        let active = employees
            .values()
            .filter(|e| e.status == EmployeeStatus::Active)
            .count() as u64;
        Ok(EmployeeCounts {
            active,
            inactive: employees.len() as u64 - active,
        })
    }
}
