use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::ModuleId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module competency cannot be empty")]
    EmptyCompetency,

    #[error("module duration must be > 0 minutes")]
    InvalidDuration,

    #[error("material title cannot be empty")]
    EmptyMaterialTitle,

    #[error("material url is not valid: {0}")]
    InvalidMaterialUrl(String),

    #[error("module needs at least one material before publishing")]
    NoMaterials,

    #[error("cannot move module from {from:?} to {to:?}")]
    InvalidTransition {
        from: ModuleStatus,
        to: ModuleStatus,
    },

    #[error("archived modules cannot be edited")]
    Archived,
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Draft,
    Published,
    Archived,
}

impl ModuleStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleStatus::Draft => "draft",
            ModuleStatus::Published => "published",
            ModuleStatus::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(ModuleStatus::Draft),
            "published" => Some(ModuleStatus::Published),
            "archived" => Some(ModuleStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Video,
    Document,
    Link,
}

//
// ─── MATERIAL ──────────────────────────────────────────────────────────────────
//

/// A learning resource attached to a PD module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    title: String,
    kind: MaterialKind,
    url: Url,
}

impl Material {
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyMaterialTitle` or `ModuleError::InvalidMaterialUrl`.
    pub fn new(
        title: impl Into<String>,
        kind: MaterialKind,
        url: impl AsRef<str>,
    ) -> Result<Self, ModuleError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ModuleError::EmptyMaterialTitle);
        }
        let raw = url.as_ref().trim();
        let url = Url::parse(raw).map_err(|_| ModuleError::InvalidMaterialUrl(raw.to_owned()))?;
        Ok(Self { title, kind, url })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// Editable fields of a PD module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub title: String,
    pub description: String,
    pub competency: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
}

struct ValidDraft {
    title: String,
    description: String,
    competency: String,
    difficulty: Difficulty,
    duration_minutes: u32,
}

fn validate_draft(draft: ModuleDraft) -> Result<ValidDraft, ModuleError> {
    let title = draft.title.trim().to_owned();
    if title.is_empty() {
        return Err(ModuleError::EmptyTitle);
    }
    let competency = draft.competency.trim().to_owned();
    if competency.is_empty() {
        return Err(ModuleError::EmptyCompetency);
    }
    if draft.duration_minutes == 0 {
        return Err(ModuleError::InvalidDuration);
    }
    Ok(ValidDraft {
        title,
        description: draft.description.trim().to_owned(),
        competency,
        difficulty: draft.difficulty,
        duration_minutes: draft.duration_minutes,
    })
}

/// A professional-development module in the platform catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdModule {
    id: ModuleId,
    title: String,
    description: String,
    competency: String,
    difficulty: Difficulty,
    duration_minutes: u32,
    status: ModuleStatus,
    materials: Vec<Material>,
    created_at: DateTime<Utc>,
}

impl PdModule {
    /// Creates a draft module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` if the title or competency is blank or the duration is zero.
    pub fn new(
        id: ModuleId,
        draft: ModuleDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ModuleError> {
        let valid = validate_draft(draft)?;
        Ok(Self {
            id,
            title: valid.title,
            description: valid.description,
            competency: valid.competency,
            difficulty: valid.difficulty,
            duration_minutes: valid.duration_minutes,
            status: ModuleStatus::Draft,
            materials: Vec::new(),
            created_at,
        })
    }

    /// Rehydrate a module from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` when stored fields fail validation.
    pub fn from_persisted(
        id: ModuleId,
        draft: ModuleDraft,
        status: ModuleStatus,
        materials: Vec<Material>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ModuleError> {
        let mut module = Self::new(id, draft, created_at)?;
        module.status = status;
        module.materials = materials;
        Ok(module)
    }

    #[must_use]
    pub fn with_id(mut self, id: ModuleId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn competency(&self) -> &str {
        &self.competency
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ModuleStatus::Published
    }

    #[must_use]
    pub fn to_draft(&self) -> ModuleDraft {
        ModuleDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            competency: self.competency.clone(),
            difficulty: self.difficulty,
            duration_minutes: self.duration_minutes,
        }
    }

    /// Replaces the editable fields.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::Archived` for archived modules, or a validation error.
    pub fn update(&mut self, draft: ModuleDraft) -> Result<(), ModuleError> {
        if self.status == ModuleStatus::Archived {
            return Err(ModuleError::Archived);
        }
        let valid = validate_draft(draft)?;
        self.title = valid.title;
        self.description = valid.description;
        self.competency = valid.competency;
        self.difficulty = valid.difficulty;
        self.duration_minutes = valid.duration_minutes;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ModuleError::Archived` for archived modules.
    pub fn add_material(&mut self, material: Material) -> Result<(), ModuleError> {
        if self.status == ModuleStatus::Archived {
            return Err(ModuleError::Archived);
        }
        self.materials.push(material);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ModuleError::InvalidTransition` unless the module is a draft, or
    /// `ModuleError::NoMaterials` when nothing is attached yet.
    pub fn publish(&mut self) -> Result<(), ModuleError> {
        if self.status != ModuleStatus::Draft {
            return Err(ModuleError::InvalidTransition {
                from: self.status,
                to: ModuleStatus::Published,
            });
        }
        if self.materials.is_empty() {
            return Err(ModuleError::NoMaterials);
        }
        self.status = ModuleStatus::Published;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ModuleError::InvalidTransition` if already archived.
    pub fn archive(&mut self) -> Result<(), ModuleError> {
        if self.status == ModuleStatus::Archived {
            return Err(ModuleError::InvalidTransition {
                from: self.status,
                to: ModuleStatus::Archived,
            });
        }
        self.status = ModuleStatus::Archived;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> ModuleDraft {
        ModuleDraft {
            title: "Formative Assessment Basics".into(),
            description: "Checking for understanding".into(),
            competency: "Assessment".into(),
            difficulty: Difficulty::Beginner,
            duration_minutes: 45,
        }
    }

    #[test]
    fn new_validates_fields() {
        let mut bad = draft();
        bad.duration_minutes = 0;
        assert_eq!(
            PdModule::new(ModuleId::new(1), bad, fixed_now()).unwrap_err(),
            ModuleError::InvalidDuration
        );

        let mut bad = draft();
        bad.competency = "  ".into();
        assert_eq!(
            PdModule::new(ModuleId::new(1), bad, fixed_now()).unwrap_err(),
            ModuleError::EmptyCompetency
        );
    }

    #[test]
    fn material_rejects_bad_url() {
        let err = Material::new("Intro", MaterialKind::Link, "not a url").unwrap_err();
        assert!(matches!(err, ModuleError::InvalidMaterialUrl(_)));
    }

    #[test]
    fn publish_requires_material() {
        let mut module = PdModule::new(ModuleId::new(1), draft(), fixed_now()).unwrap();
        assert_eq!(module.publish().unwrap_err(), ModuleError::NoMaterials);

        let material = Material::new(
            "Intro video",
            MaterialKind::Video,
            "https://cdn.example.org/intro.mp4",
        )
        .unwrap();
        module.add_material(material).unwrap();
        module.publish().unwrap();
        assert!(module.is_published());
        assert!(matches!(
            module.publish().unwrap_err(),
            ModuleError::InvalidTransition { .. }
        ));
    }

    #[test]
    fn archived_module_is_frozen() {
        let mut module = PdModule::new(ModuleId::new(1), draft(), fixed_now()).unwrap();
        module.archive().unwrap();
        assert_eq!(module.update(draft()).unwrap_err(), ModuleError::Archived);
        assert!(module.archive().is_err());
    }
}
