use pd_core::model::{
    Difficulty, Material, MaterialKind, ModuleDraft, ModuleId, ModuleStatus, PdModule,
};

use crate::vm::markdown_vm::{excerpt, markdown_to_html};

const EXCERPT_CHARS: usize = 140;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialVm {
    pub title: String,
    pub kind_label: &'static str,
    pub url: String,
}

impl From<&Material> for MaterialVm {
    fn from(material: &Material) -> Self {
        Self {
            title: material.title().to_owned(),
            kind_label: match material.kind() {
                MaterialKind::Video => "Video",
                MaterialKind::Document => "Document",
                MaterialKind::Link => "Link",
            },
            url: material.url().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleCardVm {
    pub id: ModuleId,
    pub title: String,
    pub competency: String,
    pub difficulty_label: &'static str,
    pub duration_label: String,
    pub status_label: &'static str,
    pub excerpt: String,
    pub description_html: String,
    pub materials: Vec<MaterialVm>,
    pub can_publish: bool,
    pub can_archive: bool,
}

impl From<&PdModule> for ModuleCardVm {
    fn from(module: &PdModule) -> Self {
        let status = module.status();
        Self {
            id: module.id(),
            title: module.title().to_owned(),
            competency: module.competency().to_owned(),
            difficulty_label: difficulty_label(module.difficulty()),
            duration_label: duration_label(module.duration_minutes()),
            status_label: match status {
                ModuleStatus::Draft => "Draft",
                ModuleStatus::Published => "Published",
                ModuleStatus::Archived => "Archived",
            },
            excerpt: excerpt(module.description(), EXCERPT_CHARS),
            description_html: markdown_to_html(module.description()),
            materials: module.materials().iter().map(MaterialVm::from).collect(),
            can_publish: status == ModuleStatus::Draft && !module.materials().is_empty(),
            can_archive: status != ModuleStatus::Archived,
        }
    }
}

#[must_use]
pub fn map_module_cards(modules: &[PdModule]) -> Vec<ModuleCardVm> {
    modules.iter().map(ModuleCardVm::from).collect()
}

#[must_use]
pub fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => "Beginner",
        Difficulty::Intermediate => "Intermediate",
        Difficulty::Advanced => "Advanced",
    }
}

fn duration_label(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

/// Raw values of the "new module" form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleForm {
    pub title: String,
    pub description: String,
    pub competency: String,
    pub difficulty: String,
    pub duration_minutes: String,
}

impl Default for ModuleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            competency: String::new(),
            difficulty: Difficulty::Beginner.as_str().to_owned(),
            duration_minutes: "45".into(),
        }
    }
}

impl ModuleForm {
    /// # Errors
    ///
    /// Returns a user-facing message for an unknown difficulty or a
    /// non-numeric duration. Field rules are checked by the catalog service.
    pub fn to_draft(&self) -> Result<ModuleDraft, String> {
        let difficulty = Difficulty::parse(self.difficulty.trim())
            .ok_or_else(|| format!("unknown difficulty: {}", self.difficulty))?;
        let duration_minutes = self
            .duration_minutes
            .trim()
            .parse()
            .map_err(|_| "duration must be a whole number of minutes".to_owned())?;
        Ok(ModuleDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            competency: self.competency.clone(),
            difficulty,
            duration_minutes,
        })
    }
}

/// Raw values of the "add material" form on a module card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialForm {
    pub title: String,
    pub kind: String,
    pub url: String,
}

impl Default for MaterialForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            kind: "link".into(),
            url: String::new(),
        }
    }
}

impl MaterialForm {
    /// # Errors
    ///
    /// Returns a user-facing message for an unknown kind, a blank title or a
    /// URL that does not parse.
    pub fn to_material(&self) -> Result<Material, String> {
        let kind = match self.kind.trim() {
            "video" => MaterialKind::Video,
            "document" => MaterialKind::Document,
            "link" => MaterialKind::Link,
            other => return Err(format!("unknown material kind: {other}")),
        };
        Material::new(self.title.clone(), kind, &self.url).map_err(|err| err.to_string())
    }
}
