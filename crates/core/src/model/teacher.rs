use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{SchoolId, TeacherId};
use crate::model::school::validate_email;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TeacherError {
    #[error("teacher name cannot be empty")]
    EmptyName,

    #[error("teacher email is not valid: {0}")]
    InvalidEmail(String),

    #[error("teacher is already {0:?}")]
    AlreadyInStatus(TeacherStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherStatus {
    Invited,
    Active,
    Inactive,
}

impl TeacherStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TeacherStatus::Invited => "invited",
            TeacherStatus::Active => "active",
            TeacherStatus::Inactive => "inactive",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "invited" => Some(TeacherStatus::Invited),
            "active" => Some(TeacherStatus::Active),
            "inactive" => Some(TeacherStatus::Inactive),
            _ => None,
        }
    }

    /// Whether a teacher in this status occupies an onboarding slot.
    #[must_use]
    pub fn counts_toward_limit(self) -> bool {
        !matches!(self, TeacherStatus::Inactive)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
}

/// A teacher on a school's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    id: TeacherId,
    school_id: SchoolId,
    name: String,
    email: String,
    subject: Option<String>,
    status: TeacherStatus,
    joined_at: DateTime<Utc>,
}

impl Teacher {
    /// Creates an invited teacher.
    ///
    /// # Errors
    ///
    /// Returns `TeacherError::EmptyName` or `TeacherError::InvalidEmail`.
    pub fn invite(
        id: TeacherId,
        school_id: SchoolId,
        draft: TeacherDraft,
        joined_at: DateTime<Utc>,
    ) -> Result<Self, TeacherError> {
        let name = draft.name.trim().to_owned();
        if name.is_empty() {
            return Err(TeacherError::EmptyName);
        }
        let email = validate_email(&draft.email).map_err(TeacherError::InvalidEmail)?;
        let subject = draft
            .subject
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id,
            school_id,
            name,
            email,
            subject,
            status: TeacherStatus::Invited,
            joined_at,
        })
    }

    /// Rehydrate a teacher from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `TeacherError` when stored fields fail validation.
    pub fn from_persisted(
        id: TeacherId,
        school_id: SchoolId,
        draft: TeacherDraft,
        status: TeacherStatus,
        joined_at: DateTime<Utc>,
    ) -> Result<Self, TeacherError> {
        let mut teacher = Self::invite(id, school_id, draft, joined_at)?;
        teacher.status = status;
        Ok(teacher)
    }

    #[must_use]
    pub fn with_id(mut self, id: TeacherId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> TeacherId {
        self.id
    }

    #[must_use]
    pub fn school_id(&self) -> SchoolId {
        self.school_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> TeacherStatus {
        self.status
    }

    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// # Errors
    ///
    /// Returns `TeacherError::AlreadyInStatus` if already active.
    pub fn activate(&mut self) -> Result<(), TeacherError> {
        if self.status == TeacherStatus::Active {
            return Err(TeacherError::AlreadyInStatus(self.status));
        }
        self.status = TeacherStatus::Active;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `TeacherError::AlreadyInStatus` if already inactive.
    pub fn deactivate(&mut self) -> Result<(), TeacherError> {
        if self.status == TeacherStatus::Inactive {
            return Err(TeacherError::AlreadyInStatus(self.status));
        }
        self.status = TeacherStatus::Inactive;
        Ok(())
    }
}
