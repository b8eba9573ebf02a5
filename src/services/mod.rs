//! Domain services. Each service owns its table access and its
//! authorization rules; handlers stay thin.

pub mod assignment_service;
pub mod auth_service;
pub mod classroom_service;
pub mod error;
pub mod pagination;
pub mod profile_service;
pub mod reference_service;
pub mod school_service;

use sqlx::PgPool;

pub use error::ServiceError;
pub use pagination::{PageInfo, PageParams};

use assignment_service::AssignmentService;
use auth_service::AuthService;
use classroom_service::ClassroomService;
use profile_service::ProfileService;
use reference_service::ReferenceService;
use school_service::SchoolService;

/// Shared handler state: one pool, one service instance per resource.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthService,
    pub classrooms: ClassroomService,
    pub assignments: AssignmentService,
    pub schools: SchoolService,
    pub profiles: ProfileService,
    pub references: ReferenceService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            auth: AuthService::new(pool.clone()),
            classrooms: ClassroomService::new(pool.clone()),
            assignments: AssignmentService::new(pool.clone()),
            schools: SchoolService::new(pool.clone()),
            profiles: ProfileService::new(pool.clone()),
            references: ReferenceService::new(pool.clone()),
            pool,
        }
    }
}
