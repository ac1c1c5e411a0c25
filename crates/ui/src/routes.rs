use std::fmt;
use std::str::FromStr;

use dioxus::prelude::*;
use dioxus_router::Routable;

use pd_core::model::{AttemptId, SchoolId, Section};

use crate::context::Role;
use crate::views::{
    AdminHome, AdminModules, AdminSchoolDetail, AdminSchools, AssessmentSection, Home, NotFound,
    SchoolAdminHome, SchoolAssignments, SchoolTeachers, Shell, TeacherHome, TeacherLearning,
};

#[derive(Clone, Routable, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/")] Home {},

        #[nest("/admin/dashboard")]
            #[route("/")] AdminHome {},
            #[route("/schools")] AdminSchools {},
            #[route("/schools/:id")] AdminSchoolDetail { id: SchoolId },
            #[route("/modules")] AdminModules {},
        #[end_nest]

        #[nest("/school-admin/dashboard")]
            #[route("/")] SchoolAdminHome {},
            #[route("/teachers")] SchoolTeachers {},
            #[route("/assignments")] SchoolAssignments {},
        #[end_nest]

        #[nest("/teacher/dashboard")]
            #[route("/")] TeacherHome {},
            #[route("/learning")] TeacherLearning {},
            #[route("/learning/:id/:section")] AssessmentSection { id: AttemptId, section: SectionSlug },
        #[end_nest]
    #[end_layout]

    #[route("/:..segments")] NotFound { segments: Vec<String> },
}

/// Which dashboard a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteScope {
    Admin,
    SchoolAdmin,
    Teacher,
}

impl Route {
    #[must_use]
    pub fn scope(&self) -> Option<RouteScope> {
        match self {
            Route::AdminHome {}
            | Route::AdminSchools {}
            | Route::AdminSchoolDetail { .. }
            | Route::AdminModules {} => Some(RouteScope::Admin),
            Route::SchoolAdminHome {} | Route::SchoolTeachers {} | Route::SchoolAssignments {} => {
                Some(RouteScope::SchoolAdmin)
            }
            Route::TeacherHome {} | Route::TeacherLearning {} | Route::AssessmentSection { .. } => {
                Some(RouteScope::Teacher)
            }
            Route::Home {} | Route::NotFound { .. } => None,
        }
    }

    /// The dashboard home for `role`.
    #[must_use]
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin => Route::AdminHome {},
            Role::SchoolAdmin(_) => Route::SchoolAdminHome {},
            Role::Teacher(_) => Route::TeacherHome {},
        }
    }

    /// Where `role` should be sent instead of `self`, if anywhere.
    ///
    /// `Home` always resolves to the role's dashboard; routes scoped to a
    /// different role are not reachable.
    #[must_use]
    pub fn redirect_for(&self, role: Role) -> Option<Route> {
        match self.scope() {
            None if matches!(self, Route::Home {}) => Some(Self::home_for(role)),
            None => None,
            Some(scope) if scope == role.scope() => None,
            Some(_) => Some(Self::home_for(role)),
        }
    }
}

//
// ─── ASSESSMENT SECTIONS ───────────────────────────────────────────────────────
//

/// Last path segment of an assessment route. The review step comes after
/// the four answer sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionSlug {
    Section(Section),
    Submit,
}

impl SectionSlug {
    pub const SUBMIT: &'static str = "submit";

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SectionSlug::Section(section) => section.slug(),
            SectionSlug::Submit => Self::SUBMIT,
        }
    }

    #[must_use]
    pub fn section(self) -> Option<Section> {
        match self {
            SectionSlug::Section(section) => Some(section),
            SectionSlug::Submit => None,
        }
    }
}

impl From<Section> for SectionSlug {
    fn from(section: Section) -> Self {
        SectionSlug::Section(section)
    }
}

impl fmt::Display for SectionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSectionSlug(pub String);

impl fmt::Display for UnknownSectionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown assessment section: {}", self.0)
    }
}

impl std::error::Error for UnknownSectionSlug {}

impl FromStr for SectionSlug {
    type Err = UnknownSectionSlug;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::SUBMIT {
            return Ok(SectionSlug::Submit);
        }
        Section::from_slug(s)
            .map(SectionSlug::Section)
            .ok_or_else(|| UnknownSectionSlug(s.to_owned()))
    }
}

/// An assessment step as a path, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRoute {
    pub attempt: AttemptId,
    pub slug: SectionSlug,
}

impl SectionRoute {
    const PREFIX: &'static str = "/teacher/dashboard/learning/";

    #[must_use]
    pub fn new(attempt: AttemptId, slug: impl Into<SectionSlug>) -> Self {
        Self {
            attempt,
            slug: slug.into(),
        }
    }

    #[must_use]
    pub fn submit(attempt: AttemptId) -> Self {
        Self {
            attempt,
            slug: SectionSlug::Submit,
        }
    }

    /// Parses `/teacher/dashboard/learning/:id/:section`. A trailing slash is
    /// accepted; anything else returns `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let rest = path.strip_prefix(Self::PREFIX)?.trim_end_matches('/');
        let (id, slug) = rest.split_once('/')?;
        if slug.contains('/') {
            return None;
        }
        Some(Self {
            attempt: id.parse().ok()?,
            slug: slug.parse().ok()?,
        })
    }

    #[must_use]
    pub fn path(&self) -> String {
        format!("{}{}/{}", Self::PREFIX, self.attempt, self.slug)
    }

    #[must_use]
    pub fn route(self) -> Route {
        Route::AssessmentSection {
            id: self.attempt,
            section: self.slug,
        }
    }
}
