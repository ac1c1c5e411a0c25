use std::sync::Arc;

use tracing::instrument;

use pd_core::Clock;
use pd_core::filter::TeacherFilter;
use pd_core::model::{
    School, SchoolId, SchoolStatus, Teacher, TeacherDraft, TeacherId, TeacherStatus,
};
use storage::repository::{SchoolRepository, StorageError, TeacherRepository};

use crate::error::RosterError;
use crate::fault::FaultInjector;

/// Enrolled teachers against the school's onboarding limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterCapacity {
    pub enrolled: u32,
    /// `None` until the school is approved.
    pub limit: Option<u32>,
}

impl RosterCapacity {
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.limit
            .map_or(0, |limit| limit.saturating_sub(self.enrolled))
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}

/// School-admin workflow for managing the teacher roster.
#[derive(Clone)]
pub struct TeacherRosterService {
    clock: Clock,
    schools: Arc<dyn SchoolRepository>,
    teachers: Arc<dyn TeacherRepository>,
    faults: FaultInjector,
}

impl TeacherRosterService {
    #[must_use]
    pub fn new(
        clock: Clock,
        schools: Arc<dyn SchoolRepository>,
        teachers: Arc<dyn TeacherRepository>,
    ) -> Self {
        Self {
            clock,
            schools,
            teachers,
            faults: FaultInjector::never(),
        }
    }

    #[must_use]
    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    async fn school(&self, id: SchoolId) -> Result<School, RosterError> {
        self.schools
            .get_school(id)
            .await?
            .ok_or(RosterError::SchoolNotFound(id))
    }

    async fn teacher(&self, id: TeacherId) -> Result<Teacher, RosterError> {
        self.teachers
            .get_teacher(id)
            .await?
            .ok_or(RosterError::TeacherNotFound(id))
    }

    /// Teachers of a school matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `SchoolNotFound` for unknown schools.
    pub async fn list(
        &self,
        school_id: SchoolId,
        filter: &TeacherFilter,
    ) -> Result<Vec<Teacher>, RosterError> {
        self.school(school_id).await?;
        let teachers = self.teachers.list_teachers(school_id).await?;
        Ok(filter.apply(&teachers).into_iter().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns `SchoolNotFound` for unknown schools.
    pub async fn capacity(&self, school_id: SchoolId) -> Result<RosterCapacity, RosterError> {
        let school = self.school(school_id).await?;
        let roster = self.teachers.list_teachers(school_id).await?;
        Ok(capacity_of(&school, &roster))
    }

    /// Adds a teacher to an approved school with room left.
    ///
    /// # Errors
    ///
    /// - `SchoolNotApproved` unless the school is approved.
    /// - `LimitReached` when the onboarding limit is used up.
    /// - `DuplicateEmail` when the email is already on this roster.
    /// - `Teacher` for invalid drafts.
    #[instrument(skip(self, draft))]
    pub async fn invite(
        &self,
        school_id: SchoolId,
        draft: TeacherDraft,
    ) -> Result<Teacher, RosterError> {
        let school = self.school(school_id).await?;
        if school.status() != SchoolStatus::Approved {
            return Err(RosterError::SchoolNotApproved);
        }
        let teacher = Teacher::invite(TeacherId::new(0), school_id, draft, self.clock.now())?;

        let roster = self.teachers.list_teachers(school_id).await?;
        if roster.iter().any(|t| t.email() == teacher.email()) {
            return Err(RosterError::DuplicateEmail(teacher.email().to_owned()));
        }
        ensure_capacity(&school, &roster)?;

        self.faults.run("invite teacher").await?;
        let limit = capacity_of(&school, &roster).limit.unwrap_or(0);
        let id = match self.teachers.insert_teacher_within_limit(&teacher, limit).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(RosterError::LimitReached { limit }),
            Err(StorageError::Conflict) => {
                return Err(RosterError::DuplicateEmail(teacher.email().to_owned()));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::info!(school = %school_id, teacher = %id, "teacher invited");
        Ok(teacher.with_id(id))
    }

    /// Marks a teacher active. Reactivating an inactive teacher needs a free slot.
    ///
    /// # Errors
    ///
    /// Returns `TeacherNotFound`, `LimitReached` or `Teacher(AlreadyInStatus)`.
    pub async fn activate(&self, teacher_id: TeacherId) -> Result<Teacher, RosterError> {
        let mut teacher = self.teacher(teacher_id).await?;
        let reclaims_slot = !teacher.status().counts_toward_limit();
        let school = self.school(teacher.school_id()).await?;
        if reclaims_slot {
            let roster = self.teachers.list_teachers(teacher.school_id()).await?;
            ensure_capacity(&school, &roster)?;
        }
        teacher.activate()?;
        self.faults.run("activate teacher").await?;
        if reclaims_slot {
            let limit = school.onboarding_limit().map_or(0, |l| l.value());
            if !self.teachers.update_teacher_within_limit(&teacher, limit).await? {
                return Err(RosterError::LimitReached { limit });
            }
        } else {
            self.teachers.update_teacher(&teacher).await?;
        }
        Ok(teacher)
    }

    /// # Errors
    ///
    /// Returns `TeacherNotFound` or `Teacher(AlreadyInStatus)`.
    pub async fn deactivate(&self, teacher_id: TeacherId) -> Result<Teacher, RosterError> {
        let mut teacher = self.teacher(teacher_id).await?;
        teacher.deactivate()?;
        self.faults.run("deactivate teacher").await?;
        self.teachers.update_teacher(&teacher).await?;
        tracing::info!(teacher = %teacher_id, "teacher deactivated");
        Ok(teacher)
    }
}

pub(crate) fn capacity_of(school: &School, roster: &[Teacher]) -> RosterCapacity {
    let enrolled = roster
        .iter()
        .filter(|t| t.status().counts_toward_limit())
        .count();
    RosterCapacity {
        enrolled: u32::try_from(enrolled).unwrap_or(u32::MAX),
        limit: school.onboarding_limit().map(|l| l.value()),
    }
}

fn ensure_capacity(school: &School, roster: &[Teacher]) -> Result<(), RosterError> {
    let capacity = capacity_of(school, roster);
    if school.has_capacity(capacity.enrolled) {
        Ok(())
    } else {
        Err(RosterError::LimitReached {
            limit: capacity.limit.unwrap_or(0),
        })
    }
}

/// Teachers in `status`, for dashboard counts.
pub(crate) fn count_in(roster: &[Teacher], status: TeacherStatus) -> usize {
    roster.iter().filter(|t| t.status() == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::{OnboardingLimit, SchoolDraft};
    use pd_core::time::{fixed_clock, fixed_now};
    use storage::repository::Storage;

    async fn setup(limit: Option<u32>) -> (TeacherRosterService, SchoolId) {
        let storage = Storage::in_memory();
        let mut school = School::register(
            SchoolId::new(0),
            SchoolDraft {
                name: "Riverside".into(),
                city: "Accra".into(),
                contact_email: "head@riverside.gh".into(),
            },
            fixed_now(),
        )
        .unwrap();
        if let Some(limit) = limit {
            school.approve(OnboardingLimit::new(limit).unwrap()).unwrap();
        }
        let school_id = storage.schools.insert_school(&school).await.unwrap();
        let service = TeacherRosterService::new(
            fixed_clock(),
            Arc::clone(&storage.schools),
            Arc::clone(&storage.teachers),
        );
        (service, school_id)
    }

    fn draft(name: &str, email: &str, subject: &str) -> TeacherDraft {
        TeacherDraft {
            name: name.into(),
            email: email.into(),
            subject: Some(subject.into()),
        }
    }

    #[tokio::test]
    async fn pending_school_cannot_invite() {
        let (service, school_id) = setup(None).await;
        let err = service
            .invite(school_id, draft("Ama", "ama@riverside.gh", "Math"))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::SchoolNotApproved));
    }

    #[tokio::test]
    async fn invites_stop_at_the_onboarding_limit() {
        let (service, school_id) = setup(Some(2)).await;
        service
            .invite(school_id, draft("Ama", "ama@riverside.gh", "Math"))
            .await
            .unwrap();
        let kofi = service
            .invite(school_id, draft("Kofi", "kofi@riverside.gh", "Physics"))
            .await
            .unwrap();

        let err = service
            .invite(school_id, draft("Esi", "esi@riverside.gh", "Art"))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::LimitReached { limit: 2 }));

        service.deactivate(kofi.id()).await.unwrap();
        let capacity = service.capacity(school_id).await.unwrap();
        assert_eq!(capacity, RosterCapacity { enrolled: 1, limit: Some(2) });
        assert_eq!(capacity.remaining(), 1);

        service
            .invite(school_id, draft("Esi", "esi@riverside.gh", "Art"))
            .await
            .unwrap();
        let err = service.activate(kofi.id()).await.unwrap_err();
        assert!(matches!(err, RosterError::LimitReached { .. }));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let (service, school_id) = setup(Some(5)).await;
        service
            .invite(school_id, draft("Ama", "ama@riverside.gh", "Math"))
            .await
            .unwrap();
        let err = service
            .invite(school_id, draft("Ama Two", "AMA@riverside.gh", "Math"))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateEmail(ref e) if e == "ama@riverside.gh"));
    }

    #[tokio::test]
    async fn list_applies_filter() {
        let (service, school_id) = setup(Some(5)).await;
        let ama = service
            .invite(school_id, draft("Ama", "ama@riverside.gh", "Math"))
            .await
            .unwrap();
        service
            .invite(school_id, draft("Kofi", "kofi@riverside.gh", "Physics"))
            .await
            .unwrap();
        service.activate(ama.id()).await.unwrap();

        let filter = TeacherFilter {
            status: Some(TeacherStatus::Active),
            ..TeacherFilter::default()
        };
        let active = service.list(school_id, &filter).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name(), "Ama");

        let err = service
            .list(SchoolId::new(404), &TeacherFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::SchoolNotFound(_)));
    }
}
