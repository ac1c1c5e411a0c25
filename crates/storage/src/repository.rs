use async_trait::async_trait;
use pd_core::model::{
    AssignmentId, Attempt, AttemptId, ModuleId, PdAssignment, PdModule, RawQuestion, School,
    SchoolId, SchoolStatus, Teacher, TeacherId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Insert a newly registered school and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the school cannot be stored.
    async fn insert_school(&self, school: &School) -> Result<SchoolId, StorageError>;

    /// Persist changes to an existing school.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the school does not exist.
    async fn update_school(&self, school: &School) -> Result<(), StorageError>;

    /// Persist `school` only while the stored row is still in `expected`.
    /// Returns `false` when another writer moved the status first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the school does not exist.
    async fn update_school_if_status(
        &self,
        school: &School,
        expected: SchoolStatus,
    ) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_school(&self, id: SchoolId) -> Result<Option<School>, StorageError>;

    /// All schools ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_schools(&self) -> Result<Vec<School>, StorageError>;
}

#[async_trait]
pub trait TeacherRepository: Send + Sync {
    /// Insert a teacher and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already on the school's roster.
    async fn insert_teacher(&self, teacher: &Teacher) -> Result<TeacherId, StorageError>;

    /// Insert a teacher unless the school already has `limit` teachers that
    /// count toward its onboarding limit. Returns `None` when the roster is full.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is already on the school's roster.
    async fn insert_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<Option<TeacherId>, StorageError>;

    /// Persist `teacher` only while the rest of its school's counted roster
    /// stays below `limit`. Returns `false` when there is no room.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the teacher does not exist.
    async fn update_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the teacher does not exist.
    async fn update_teacher(&self, teacher: &Teacher) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StorageError>;

    /// Roster of one school ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_teachers(&self, school_id: SchoolId) -> Result<Vec<Teacher>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_teachers(&self) -> Result<u64, StorageError>;
}

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn insert_module(&self, module: &PdModule) -> Result<ModuleId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the module does not exist.
    async fn update_module(&self, module: &PdModule) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_module(&self, id: ModuleId) -> Result<Option<PdModule>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_modules(&self) -> Result<Vec<PdModule>, StorageError>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the assignment cannot be stored.
    async fn insert_assignment(
        &self,
        assignment: &PdAssignment,
    ) -> Result<AssignmentId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the assignment does not exist.
    async fn update_assignment(&self, assignment: &PdAssignment) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<PdAssignment>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PdAssignment>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_module(&self, module_id: ModuleId)
    -> Result<Vec<PdAssignment>, StorageError>;
}

/// The competency question bank, stored in delivery order and un-interpreted.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Replace the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be stored.
    async fn replace_questions(&self, questions: &[RawQuestion]) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self) -> Result<Vec<RawQuestion>, StorageError>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist or update an attempt, including its answers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, StorageError>;

    /// Most recently started attempt for a teacher.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn latest_attempt_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Tables {
    next_id: u64,
    schools: HashMap<SchoolId, School>,
    teachers: HashMap<TeacherId, Teacher>,
    modules: HashMap<ModuleId, PdModule>,
    assignments: HashMap<AssignmentId, PdAssignment>,
    questions: Vec<RawQuestion>,
    attempts: HashMap<AttemptId, Attempt>,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn sorted_by_key<T: Clone, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(|item| key(item));
    out
}

/// Teachers of `school_id` that count toward its onboarding limit, skipping `except`.
fn counted_on_roster(t: &Tables, school_id: SchoolId, except: Option<TeacherId>) -> u64 {
    t.teachers
        .values()
        .filter(|x| x.school_id() == school_id && Some(x.id()) != except)
        .filter(|x| x.status().counts_toward_limit())
        .count() as u64
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, StorageError> {
        let mut guard = self
            .tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl SchoolRepository for InMemoryRepository {
    async fn insert_school(&self, school: &School) -> Result<SchoolId, StorageError> {
        self.with_tables(|t| {
            let id = SchoolId::new(t.allocate());
            t.schools.insert(id, school.clone().with_id(id));
            id
        })
    }

    async fn update_school(&self, school: &School) -> Result<(), StorageError> {
        self.with_tables(|t| match t.schools.get_mut(&school.id()) {
            Some(slot) => {
                *slot = school.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        })?
    }

    async fn update_school_if_status(
        &self,
        school: &School,
        expected: SchoolStatus,
    ) -> Result<bool, StorageError> {
        self.with_tables(|t| match t.schools.get_mut(&school.id()) {
            Some(slot) if slot.status() == expected => {
                *slot = school.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StorageError::NotFound),
        })?
    }

    async fn get_school(&self, id: SchoolId) -> Result<Option<School>, StorageError> {
        self.with_tables(|t| t.schools.get(&id).cloned())
    }

    async fn list_schools(&self) -> Result<Vec<School>, StorageError> {
        self.with_tables(|t| sorted_by_key(t.schools.values().cloned(), School::id))
    }
}

#[async_trait]
impl TeacherRepository for InMemoryRepository {
    async fn insert_teacher(&self, teacher: &Teacher) -> Result<TeacherId, StorageError> {
        self.with_tables(|t| {
            let duplicate = t
                .teachers
                .values()
                .any(|x| x.school_id() == teacher.school_id() && x.email() == teacher.email());
            if duplicate {
                return Err(StorageError::Conflict);
            }
            let id = TeacherId::new(t.allocate());
            t.teachers.insert(id, teacher.clone().with_id(id));
            Ok(id)
        })?
    }

    async fn insert_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<Option<TeacherId>, StorageError> {
        self.with_tables(|t| {
            let duplicate = t
                .teachers
                .values()
                .any(|x| x.school_id() == teacher.school_id() && x.email() == teacher.email());
            if duplicate {
                return Err(StorageError::Conflict);
            }
            if counted_on_roster(t, teacher.school_id(), None) >= u64::from(limit) {
                return Ok(None);
            }
            let id = TeacherId::new(t.allocate());
            t.teachers.insert(id, teacher.clone().with_id(id));
            Ok(Some(id))
        })?
    }

    async fn update_teacher_within_limit(
        &self,
        teacher: &Teacher,
        limit: u32,
    ) -> Result<bool, StorageError> {
        self.with_tables(|t| {
            if !t.teachers.contains_key(&teacher.id()) {
                return Err(StorageError::NotFound);
            }
            if counted_on_roster(t, teacher.school_id(), Some(teacher.id())) >= u64::from(limit) {
                return Ok(false);
            }
            t.teachers.insert(teacher.id(), teacher.clone());
            Ok(true)
        })?
    }

    async fn update_teacher(&self, teacher: &Teacher) -> Result<(), StorageError> {
        self.with_tables(|t| match t.teachers.get_mut(&teacher.id()) {
            Some(slot) => {
                *slot = teacher.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        })?
    }

    async fn get_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StorageError> {
        self.with_tables(|t| t.teachers.get(&id).cloned())
    }

    async fn list_teachers(&self, school_id: SchoolId) -> Result<Vec<Teacher>, StorageError> {
        self.with_tables(|t| {
            sorted_by_key(
                t.teachers
                    .values()
                    .filter(|x| x.school_id() == school_id)
                    .cloned(),
                Teacher::id,
            )
        })
    }

    async fn count_teachers(&self) -> Result<u64, StorageError> {
        self.with_tables(|t| t.teachers.len() as u64)
    }
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn insert_module(&self, module: &PdModule) -> Result<ModuleId, StorageError> {
        self.with_tables(|t| {
            let id = ModuleId::new(t.allocate());
            t.modules.insert(id, module.clone().with_id(id));
            id
        })
    }

    async fn update_module(&self, module: &PdModule) -> Result<(), StorageError> {
        self.with_tables(|t| match t.modules.get_mut(&module.id()) {
            Some(slot) => {
                *slot = module.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        })?
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<PdModule>, StorageError> {
        self.with_tables(|t| t.modules.get(&id).cloned())
    }

    async fn list_modules(&self) -> Result<Vec<PdModule>, StorageError> {
        self.with_tables(|t| sorted_by_key(t.modules.values().cloned(), PdModule::id))
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn insert_assignment(
        &self,
        assignment: &PdAssignment,
    ) -> Result<AssignmentId, StorageError> {
        self.with_tables(|t| {
            let id = AssignmentId::new(t.allocate());
            t.assignments.insert(id, assignment.clone().with_id(id));
            id
        })
    }

    async fn update_assignment(&self, assignment: &PdAssignment) -> Result<(), StorageError> {
        self.with_tables(|t| match t.assignments.get_mut(&assignment.id()) {
            Some(slot) => {
                *slot = assignment.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        })?
    }

    async fn get_assignment(
        &self,
        id: AssignmentId,
    ) -> Result<Option<PdAssignment>, StorageError> {
        self.with_tables(|t| t.assignments.get(&id).cloned())
    }

    async fn list_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<PdAssignment>, StorageError> {
        self.with_tables(|t| {
            sorted_by_key(
                t.assignments
                    .values()
                    .filter(|a| a.teacher_id() == teacher_id)
                    .cloned(),
                PdAssignment::id,
            )
        })
    }

    async fn list_for_module(
        &self,
        module_id: ModuleId,
    ) -> Result<Vec<PdAssignment>, StorageError> {
        self.with_tables(|t| {
            sorted_by_key(
                t.assignments
                    .values()
                    .filter(|a| a.module_id() == module_id)
                    .cloned(),
                PdAssignment::id,
            )
        })
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn replace_questions(&self, questions: &[RawQuestion]) -> Result<(), StorageError> {
        self.with_tables(|t| t.questions = questions.to_vec())
    }

    async fn list_questions(&self) -> Result<Vec<RawQuestion>, StorageError> {
        self.with_tables(|t| t.questions.clone())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn upsert_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        self.with_tables(|t| {
            t.attempts.insert(attempt.id(), attempt.clone());
        })
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<Attempt>, StorageError> {
        self.with_tables(|t| t.attempts.get(&id).cloned())
    }

    async fn latest_attempt_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<Attempt>, StorageError> {
        self.with_tables(|t| {
            t.attempts
                .values()
                .filter(|a| a.teacher_id() == teacher_id)
                .max_by_key(|a| a.started_at())
                .cloned()
        })
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates every repository behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub schools: Arc<dyn SchoolRepository>,
    pub teachers: Arc<dyn TeacherRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub questions: Arc<dyn QuestionBankRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    pub(crate) fn from_repository<R>(repo: R) -> Self
    where
        R: SchoolRepository
            + TeacherRepository
            + ModuleRepository
            + AssignmentRepository
            + QuestionBankRepository
            + AttemptRepository
            + Clone
            + 'static,
    {
        Self {
            schools: Arc::new(repo.clone()),
            teachers: Arc::new(repo.clone()),
            modules: Arc::new(repo.clone()),
            assignments: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            attempts: Arc::new(repo),
        }
    }
}
