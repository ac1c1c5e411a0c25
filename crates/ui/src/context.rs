use std::sync::Arc;

use chrono::{DateTime, Utc};
use pd_core::model::{SchoolId, TeacherId};
use services::{
    AppServices, AssessmentService, DashboardService, PdAssignmentService, PdCatalogService,
    SchoolOnboardingService, TeacherRosterService,
};

use crate::platform::{DesktopLinkOpener, LinkOpenerRef};
use crate::routes::RouteScope;

/// The signed-in principal. School admins and teachers carry the record
/// their dashboard is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    SchoolAdmin(SchoolId),
    Teacher(TeacherId),
}

impl Role {
    #[must_use]
    pub fn scope(self) -> RouteScope {
        match self {
            Role::Admin => RouteScope::Admin,
            Role::SchoolAdmin(_) => RouteScope::SchoolAdmin,
            Role::Teacher(_) => RouteScope::Teacher,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Platform Admin",
            Role::SchoolAdmin(_) => "School Admin",
            Role::Teacher(_) => "Teacher",
        }
    }
}

pub trait UiApp: Send + Sync {
    fn role(&self) -> Role;
    fn services(&self) -> AppServices;

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(DesktopLinkOpener)
    }
}

#[derive(Clone)]
pub struct AppContext {
    role: Role,
    services: AppServices,
    links: LinkOpenerRef,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            role: app.role(),
            services: app.services(),
            links: app.link_opener(),
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The school a school admin manages.
    #[must_use]
    pub fn school_id(&self) -> Option<SchoolId> {
        match self.role {
            Role::SchoolAdmin(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn teacher_id(&self) -> Option<TeacherId> {
        match self.role {
            Role::Teacher(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.services.clock().now()
    }

    #[must_use]
    pub fn schools(&self) -> Arc<SchoolOnboardingService> {
        self.services.schools()
    }

    #[must_use]
    pub fn roster(&self) -> Arc<TeacherRosterService> {
        self.services.roster()
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<PdCatalogService> {
        self.services.catalog()
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<PdAssignmentService> {
        self.services.assignments()
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        self.services.dashboard()
    }

    #[must_use]
    pub fn assessment(&self) -> Arc<AssessmentService> {
        self.services.assessment()
    }

    pub fn open_link(&self, url: &str) {
        self.links.open_url(url);
    }
}

// Provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
