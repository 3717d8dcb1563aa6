//! In-memory department directory and its HTTP routes.
//!
//! This is the remote side of the department lookup: it serves
//! `GET /api/departments/{id}` (404 when unknown) and `POST /api/departments`.
//! The `department-service` binary runs it standalone.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::departments::types::{Department, NewDepartment};
use crate::http::response::ApiError;

/// Thread-safe department store with sequential ids starting at 1.
#[derive(Debug)]
pub struct DepartmentDirectory {
    departments: DashMap<u64, Department>,
    next_id: AtomicU64,
}

impl Default for DepartmentDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl DepartmentDirectory {
    pub fn new() -> Self {
        Self {
            departments: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store a new department and return it with its assigned id.
    pub fn create(&self, new: NewDepartment) -> Department {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let department = Department {
            id,
            name: new.name,
            address: new.address,
            code: new.code,
        };
        self.departments.insert(id, department.clone());
        tracing::info!(department_id = id, name = %department.name, "Department created");
        department
    }

    pub fn get(&self, id: u64) -> Option<Department> {
        self.departments.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }
}

/// Routes for the department service.
pub fn router(directory: Arc<DepartmentDirectory>) -> Router {
    Router::new()
        .route("/api/departments", post(create_department))
        .route("/api/departments/{id}", get(get_department))
        .with_state(directory)
}

async fn create_department(
    State(directory): State<Arc<DepartmentDirectory>>,
    Json(new): Json<NewDepartment>,
) -> Result<Json<Department>, ApiError> {
    if new.name.trim().is_empty() {
        return Err(ApiError::bad_request("department name is required"));
    }
    Ok(Json(directory.create(new)))
}

async fn get_department(
    State(directory): State<Arc<DepartmentDirectory>>,
    Path(id): Path<u64>,
) -> Result<Json<Department>, ApiError> {
    directory
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("department {} not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_sequential_ids() {
        let directory = DepartmentDirectory::new();
        let eng = directory.create(NewDepartment {
            name: "Engineering".into(),
            address: None,
            code: Some("ENG-001".into()),
        });
        let ops = directory.create(NewDepartment {
            name: "Operations".into(),
            address: Some("Building 2".into()),
            code: None,
        });

        assert_eq!(eng.id, 1);
        assert_eq!(ops.id, 2);
        assert_eq!(directory.get(1), Some(eng));
        assert_eq!(directory.get(3), None);
        assert_eq!(directory.len(), 2);
    }
}
