use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use thiserror::Error;

use crate::model::ids::SchoolId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchoolError {
    #[error("school name cannot be empty")]
    EmptyName,

    #[error("contact email is not valid: {0}")]
    InvalidEmail(String),

    #[error("onboarding limit must be a positive number")]
    InvalidOnboardingLimit,

    #[error("school has already been processed ({status:?})")]
    AlreadyProcessed { status: SchoolStatus },

    #[error("school is not approved")]
    NotApproved,

    #[error("onboarding limit can only be increased (current {current}, requested {requested})")]
    LimitNotIncreased { current: u32, requested: u32 },

    #[error("rejection reason cannot be empty")]
    EmptyRejectionReason,
}

//
// ─── STATUS / LIMIT ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolStatus {
    Pending,
    Approved,
    Rejected,
}

impl SchoolStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SchoolStatus::Pending => "pending",
            SchoolStatus::Approved => "approved",
            SchoolStatus::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(SchoolStatus::Pending),
            "approved" => Some(SchoolStatus::Approved),
            "rejected" => Some(SchoolStatus::Rejected),
            _ => None,
        }
    }
}

/// Maximum number of teachers a school may enroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnboardingLimit(NonZeroU32);

impl OnboardingLimit {
    /// # Errors
    ///
    /// Returns `SchoolError::InvalidOnboardingLimit` for zero.
    pub fn new(value: u32) -> Result<Self, SchoolError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(SchoolError::InvalidOnboardingLimit)
    }

    #[must_use]
    pub fn value(self) -> u32 {
        self.0.get()
    }
}

//
// ─── SCHOOL ────────────────────────────────────────────────────────────────────
//

/// Fields a school submits when registering for the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolDraft {
    pub name: String,
    pub city: String,
    pub contact_email: String,
}

/// A school registered on the platform, pending or processed by a platform admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    id: SchoolId,
    name: String,
    city: String,
    contact_email: String,
    status: SchoolStatus,
    onboarding_limit: Option<OnboardingLimit>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
}

pub(crate) fn validate_email(raw: &str) -> Result<String, String> {
    let email = raw.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(email.to_owned());
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(email.to_owned());
    }
    Ok(email.to_ascii_lowercase())
}

impl School {
    /// Creates a newly registered (pending) school.
    ///
    /// # Errors
    ///
    /// Returns `SchoolError::EmptyName` or `SchoolError::InvalidEmail`.
    pub fn register(
        id: SchoolId,
        draft: SchoolDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SchoolError> {
        let name = draft.name.trim().to_owned();
        if name.is_empty() {
            return Err(SchoolError::EmptyName);
        }
        let contact_email =
            validate_email(&draft.contact_email).map_err(SchoolError::InvalidEmail)?;

        Ok(Self {
            id,
            name,
            city: draft.city.trim().to_owned(),
            contact_email,
            status: SchoolStatus::Pending,
            onboarding_limit: None,
            rejection_reason: None,
            created_at,
        })
    }

    /// Rehydrate a school from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SchoolError` when the stored fields violate school invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: SchoolId,
        name: String,
        city: String,
        contact_email: String,
        status: SchoolStatus,
        onboarding_limit: Option<u32>,
        rejection_reason: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SchoolError> {
        let mut school = Self::register(
            id,
            SchoolDraft {
                name,
                city,
                contact_email,
            },
            created_at,
        )?;
        school.status = status;
        school.onboarding_limit = onboarding_limit.map(OnboardingLimit::new).transpose()?;
        school.rejection_reason = rejection_reason;
        if status == SchoolStatus::Approved && school.onboarding_limit.is_none() {
            return Err(SchoolError::InvalidOnboardingLimit);
        }
        Ok(school)
    }

    #[must_use]
    pub fn with_id(mut self, id: SchoolId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> SchoolId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    #[must_use]
    pub fn status(&self) -> SchoolStatus {
        self.status
    }

    #[must_use]
    pub fn onboarding_limit(&self) -> Option<OnboardingLimit> {
        self.onboarding_limit
    }

    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == SchoolStatus::Pending
    }

    /// Approves a pending school with the given onboarding limit.
    ///
    /// # Errors
    ///
    /// Returns `SchoolError::AlreadyProcessed` if the school is no longer pending.
    pub fn approve(&mut self, limit: OnboardingLimit) -> Result<(), SchoolError> {
        if !self.is_pending() {
            return Err(SchoolError::AlreadyProcessed {
                status: self.status,
            });
        }
        self.status = SchoolStatus::Approved;
        self.onboarding_limit = Some(limit);
        Ok(())
    }

    /// Rejects a pending school.
    ///
    /// # Errors
    ///
    /// Returns `SchoolError::AlreadyProcessed` if the school is no longer pending,
    /// or `SchoolError::EmptyRejectionReason` for a blank reason.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), SchoolError> {
        if !self.is_pending() {
            return Err(SchoolError::AlreadyProcessed {
                status: self.status,
            });
        }
        let reason = reason.into().trim().to_owned();
        if reason.is_empty() {
            return Err(SchoolError::EmptyRejectionReason);
        }
        self.status = SchoolStatus::Rejected;
        self.rejection_reason = Some(reason);
        Ok(())
    }

    /// Raises the onboarding limit of an approved school. Lowering is not allowed.
    ///
    /// # Errors
    ///
    /// Returns `SchoolError::NotApproved` or `SchoolError::LimitNotIncreased`.
    pub fn raise_onboarding_limit(&mut self, limit: OnboardingLimit) -> Result<(), SchoolError> {
        let current = match (self.status, self.onboarding_limit) {
            (SchoolStatus::Approved, Some(current)) => current,
            _ => return Err(SchoolError::NotApproved),
        };
        if limit <= current {
            return Err(SchoolError::LimitNotIncreased {
                current: current.value(),
                requested: limit.value(),
            });
        }
        self.onboarding_limit = Some(limit);
        Ok(())
    }

    /// Whether one more teacher fits under the onboarding limit.
    #[must_use]
    pub fn has_capacity(&self, enrolled: u32) -> bool {
        self.onboarding_limit
            .is_some_and(|limit| enrolled < limit.value())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
