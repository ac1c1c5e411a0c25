use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AssignmentId, ModuleId, TeacherId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("due date precedes the assignment date")]
    DueBeforeAssigned,

    #[error("assignment is already completed")]
    AlreadyCompleted,

    #[error("assignment is already in progress")]
    AlreadyStarted,

    #[error("completion time precedes the assignment date")]
    InvalidCompletionTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
}

impl AssignmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::InProgress => "in_progress",
            AssignmentStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "assigned" => Some(AssignmentStatus::Assigned),
            "in_progress" => Some(AssignmentStatus::InProgress),
            "completed" => Some(AssignmentStatus::Completed),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self != AssignmentStatus::Completed
    }
}

/// A PD module assigned to one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdAssignment {
    id: AssignmentId,
    module_id: ModuleId,
    teacher_id: TeacherId,
    assigned_at: DateTime<Utc>,
    due_at: Option<DateTime<Utc>>,
    status: AssignmentStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl PdAssignment {
    /// # Errors
    ///
    /// Returns `AssignmentError::DueBeforeAssigned` if `due_at` precedes `assigned_at`.
    pub fn new(
        id: AssignmentId,
        module_id: ModuleId,
        teacher_id: TeacherId,
        assigned_at: DateTime<Utc>,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AssignmentError> {
        if due_at.is_some_and(|due| due < assigned_at) {
            return Err(AssignmentError::DueBeforeAssigned);
        }
        Ok(Self {
            id,
            module_id,
            teacher_id,
            assigned_at,
            due_at,
            status: AssignmentStatus::Assigned,
            completed_at: None,
        })
    }

    /// Rehydrate an assignment from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError` when the stored timestamps are inconsistent.
    pub fn from_persisted(
        id: AssignmentId,
        module_id: ModuleId,
        teacher_id: TeacherId,
        assigned_at: DateTime<Utc>,
        due_at: Option<DateTime<Utc>>,
        status: AssignmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AssignmentError> {
        let mut assignment = Self::new(id, module_id, teacher_id, assigned_at, due_at)?;
        if completed_at.is_some_and(|at| at < assigned_at) {
            return Err(AssignmentError::InvalidCompletionTime);
        }
        assignment.status = status;
        assignment.completed_at = completed_at;
        Ok(assignment)
    }

    #[must_use]
    pub fn with_id(mut self, id: AssignmentId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> AssignmentId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn teacher_id(&self) -> TeacherId {
        self.teacher_id
    }

    #[must_use]
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    #[must_use]
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    #[must_use]
    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// # Errors
    ///
    /// Returns `AlreadyStarted` or `AlreadyCompleted`.
    pub fn start(&mut self) -> Result<(), AssignmentError> {
        match self.status {
            AssignmentStatus::Assigned => {
                self.status = AssignmentStatus::InProgress;
                Ok(())
            }
            AssignmentStatus::InProgress => Err(AssignmentError::AlreadyStarted),
            AssignmentStatus::Completed => Err(AssignmentError::AlreadyCompleted),
        }
    }

    /// Completes the assignment. Completing twice is an error.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` or `InvalidCompletionTime`.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), AssignmentError> {
        if self.status == AssignmentStatus::Completed {
            return Err(AssignmentError::AlreadyCompleted);
        }
        if now < self.assigned_at {
            return Err(AssignmentError::InvalidCompletionTime);
        }
        self.status = AssignmentStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.due_at.is_some_and(|due| now > due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn assignment(due_in_days: Option<i64>) -> Result<PdAssignment, AssignmentError> {
        let now = fixed_now();
        PdAssignment::new(
            AssignmentId::new(1),
            ModuleId::new(2),
            TeacherId::new(3),
            now,
            due_in_days.map(|d| now + Duration::days(d)),
        )
    }

    #[test]
    fn due_date_cannot_precede_assignment() {
        assert_eq!(
            assignment(Some(-1)).unwrap_err(),
            AssignmentError::DueBeforeAssigned
        );
    }

    #[test]
    fn complete_twice_fails() {
        let mut a = assignment(None).unwrap();
        a.start().unwrap();
        a.complete(fixed_now()).unwrap();
        assert_eq!(
            a.complete(fixed_now()).unwrap_err(),
            AssignmentError::AlreadyCompleted
        );
        assert_eq!(a.start().unwrap_err(), AssignmentError::AlreadyCompleted);
    }

    #[test]
    fn overdue_only_while_open() {
        let mut a = assignment(Some(7)).unwrap();
        let late = fixed_now() + Duration::days(8);
        assert!(!a.is_overdue(fixed_now()));
        assert!(a.is_overdue(late));
        a.complete(late).unwrap();
        assert!(!a.is_overdue(late));
    }
}
