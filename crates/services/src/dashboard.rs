use std::sync::Arc;

use pd_core::Clock;
use pd_core::model::{
    AssignmentStatus, AttemptStatus, ModuleStatus, PdAssignment, School, SchoolId, SchoolStatus,
    Teacher, TeacherId, TeacherStatus,
};
use storage::repository::{
    AssignmentRepository, AttemptRepository, ModuleRepository, SchoolRepository,
    TeacherRepository,
};

use crate::error::DashboardError;
use crate::roster::{RosterCapacity, capacity_of, count_in};

/// Platform-wide counts for the admin home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminOverview {
    pub pending_schools: usize,
    pub approved_schools: usize,
    pub rejected_schools: usize,
    pub teachers: u64,
    pub published_modules: usize,
    pub draft_modules: usize,
}

/// Assignment counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssignmentTally {
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl AssignmentTally {
    fn add(&mut self, assignment: &PdAssignment, now: chrono::DateTime<chrono::Utc>) {
        match assignment.status() {
            AssignmentStatus::Assigned => self.assigned += 1,
            AssignmentStatus::InProgress => self.in_progress += 1,
            AssignmentStatus::Completed => self.completed += 1,
        }
        if assignment.is_overdue(now) {
            self.overdue += 1;
        }
    }

    #[must_use]
    pub fn open(&self) -> usize {
        self.assigned + self.in_progress
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.open() + self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolOverview {
    pub school: School,
    pub capacity: RosterCapacity,
    pub active_teachers: usize,
    pub invited_teachers: usize,
    pub assignments: AssignmentTally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherOverview {
    pub teacher: Teacher,
    pub assignments: AssignmentTally,
    /// `None` until the teacher starts the competency assessment.
    pub assessment: Option<AttemptStatus>,
}

/// Read-only aggregates for the three role dashboards.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    schools: Arc<dyn SchoolRepository>,
    teachers: Arc<dyn TeacherRepository>,
    modules: Arc<dyn ModuleRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        clock: Clock,
        schools: Arc<dyn SchoolRepository>,
        teachers: Arc<dyn TeacherRepository>,
        modules: Arc<dyn ModuleRepository>,
        assignments: Arc<dyn AssignmentRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            schools,
            teachers,
            modules,
            assignments,
            attempts,
        }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Storage` if repository access fails.
    pub async fn admin_overview(&self) -> Result<AdminOverview, DashboardError> {
        let schools = self.schools.list_schools().await?;
        let modules = self.modules.list_modules().await?;
        let count_schools = |status| schools.iter().filter(|s| s.status() == status).count();
        let count_modules = |status| modules.iter().filter(|m| m.status() == status).count();
        Ok(AdminOverview {
            pending_schools: count_schools(SchoolStatus::Pending),
            approved_schools: count_schools(SchoolStatus::Approved),
            rejected_schools: count_schools(SchoolStatus::Rejected),
            teachers: self.teachers.count_teachers().await?,
            published_modules: count_modules(ModuleStatus::Published),
            draft_modules: count_modules(ModuleStatus::Draft),
        })
    }

    /// # Errors
    ///
    /// Returns `SchoolNotFound` for unknown schools.
    pub async fn school_overview(&self, school_id: SchoolId) -> Result<SchoolOverview, DashboardError> {
        let school = self
            .schools
            .get_school(school_id)
            .await?
            .ok_or(DashboardError::SchoolNotFound(school_id))?;
        let roster = self.teachers.list_teachers(school_id).await?;

        let now = self.clock.now();
        let mut assignments = AssignmentTally::default();
        for teacher in &roster {
            for assignment in self.assignments.list_for_teacher(teacher.id()).await? {
                assignments.add(&assignment, now);
            }
        }

        Ok(SchoolOverview {
            capacity: capacity_of(&school, &roster),
            active_teachers: count_in(&roster, TeacherStatus::Active),
            invited_teachers: count_in(&roster, TeacherStatus::Invited),
            assignments,
            school,
        })
    }

    /// # Errors
    ///
    /// Returns `TeacherNotFound` for unknown teachers.
    pub async fn teacher_overview(
        &self,
        teacher_id: TeacherId,
    ) -> Result<TeacherOverview, DashboardError> {
        let teacher = self
            .teachers
            .get_teacher(teacher_id)
            .await?
            .ok_or(DashboardError::TeacherNotFound(teacher_id))?;

        let now = self.clock.now();
        let mut assignments = AssignmentTally::default();
        for assignment in self.assignments.list_for_teacher(teacher_id).await? {
            assignments.add(&assignment, now);
        }
        let assessment = self
            .attempts
            .latest_attempt_for_teacher(teacher_id)
            .await?
            .map(|attempt| attempt.status());

        Ok(TeacherOverview {
            teacher,
            assignments,
            assessment,
        })
    }
}
