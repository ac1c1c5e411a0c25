use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use pd_core::Clock;
use pd_core::model::{AssignmentId, ModuleId, PdAssignment, TeacherId, TeacherStatus};
use storage::repository::{AssignmentRepository, ModuleRepository, TeacherRepository};

use crate::error::AssignmentServiceError;
use crate::fault::FaultInjector;

/// Outcome of assigning one module to a group of teachers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignOutcome {
    pub created: Vec<PdAssignment>,
    /// Teachers who already hold an open assignment for the module.
    pub skipped: Vec<TeacherId>,
}

/// Assigns published PD modules to teachers and tracks their progress.
#[derive(Clone)]
pub struct PdAssignmentService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    teachers: Arc<dyn TeacherRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    faults: FaultInjector,
}

impl PdAssignmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        modules: Arc<dyn ModuleRepository>,
        teachers: Arc<dyn TeacherRepository>,
        assignments: Arc<dyn AssignmentRepository>,
    ) -> Self {
        Self {
            clock,
            modules,
            teachers,
            assignments,
            faults: FaultInjector::never(),
        }
    }

    #[must_use]
    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    /// Assigns `module_id` to every teacher in `teacher_ids`.
    ///
    /// All teachers are checked before anything is written.
    ///
    /// # Errors
    ///
    /// - `ModuleNotFound` or `ModuleNotPublished` for the module.
    /// - `TeacherNotFound` or `TeacherInactive` for any listed teacher.
    /// - `Assignment(DueBeforeAssigned)` for a due date in the past.
    #[instrument(skip(self, teacher_ids), fields(teachers = teacher_ids.len()))]
    pub async fn assign(
        &self,
        module_id: ModuleId,
        teacher_ids: &[TeacherId],
        due_at: Option<DateTime<Utc>>,
    ) -> Result<AssignOutcome, AssignmentServiceError> {
        let module = self
            .modules
            .get_module(module_id)
            .await?
            .ok_or(AssignmentServiceError::ModuleNotFound(module_id))?;
        if !module.is_published() {
            return Err(AssignmentServiceError::ModuleNotPublished(module_id));
        }

        let now = self.clock.now();
        let existing = self.assignments.list_for_module(module_id).await?;
        let mut outcome = AssignOutcome::default();
        let mut pending = Vec::new();
        for &teacher_id in teacher_ids {
            let teacher = self
                .teachers
                .get_teacher(teacher_id)
                .await?
                .ok_or(AssignmentServiceError::TeacherNotFound(teacher_id))?;
            if teacher.status() == TeacherStatus::Inactive {
                return Err(AssignmentServiceError::TeacherInactive(teacher_id));
            }
            let already_open = existing
                .iter()
                .any(|a| a.teacher_id() == teacher_id && a.status().is_open());
            if already_open || pending.iter().any(|a: &PdAssignment| a.teacher_id() == teacher_id) {
                outcome.skipped.push(teacher_id);
                continue;
            }
            pending.push(PdAssignment::new(
                AssignmentId::new(0),
                module_id,
                teacher_id,
                now,
                due_at,
            )?);
        }

        if !pending.is_empty() {
            self.faults.run("assign module").await?;
        }
        for assignment in pending {
            let id = self.assignments.insert_assignment(&assignment).await?;
            outcome.created.push(assignment.with_id(id));
        }
        tracing::info!(
            module = %module_id,
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            "module assigned"
        );
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if repository access fails.
    pub async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PdAssignment>, AssignmentServiceError> {
        Ok(self.assignments.list_for_teacher(teacher_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if repository access fails.
    pub async fn list_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<PdAssignment>, AssignmentServiceError> {
        Ok(self.assignments.list_for_module(module_id).await?)
    }

    /// Assignments past their due date and not yet completed.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if repository access fails.
    pub async fn overdue_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PdAssignment>, AssignmentServiceError> {
        let now = self.clock.now();
        let mut assignments = self.list_for_teacher(teacher_id).await?;
        assignments.retain(|a| a.is_overdue(now));
        Ok(assignments)
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Assignment(AlreadyStarted | AlreadyCompleted)`.
    pub async fn start(&self, id: AssignmentId) -> Result<PdAssignment, AssignmentServiceError> {
        let mut assignment = self.get(id).await?;
        assignment.start()?;
        self.faults.run("start assignment").await?;
        self.assignments.update_assignment(&assignment).await?;
        Ok(assignment)
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Assignment(AlreadyCompleted)`.
    pub async fn complete(&self, id: AssignmentId) -> Result<PdAssignment, AssignmentServiceError> {
        let mut assignment = self.get(id).await?;
        assignment.complete(self.clock.now())?;
        self.faults.run("complete assignment").await?;
        self.assignments.update_assignment(&assignment).await?;
        tracing::info!(assignment = %id, "assignment completed");
        Ok(assignment)
    }

    async fn get(&self, id: AssignmentId) -> Result<PdAssignment, AssignmentServiceError> {
        self.assignments
            .get_assignment(id)
            .await?
            .ok_or(AssignmentServiceError::NotFound)
    }
}
