//! Client-side filtering over already-loaded lists.

use crate::model::module::{Difficulty, ModuleStatus, PdModule};
use crate::model::school::{School, SchoolStatus};
use crate::model::teacher::{Teacher, TeacherStatus};

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn contains_query(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolFilter {
    pub query: String,
    pub status: Option<SchoolStatus>,
}

impl SchoolFilter {
    #[must_use]
    pub fn pending() -> Self {
        Self {
            query: String::new(),
            status: Some(SchoolStatus::Pending),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    #[must_use]
    pub fn matches(&self, school: &School) -> bool {
        let q = normalize(&self.query);
        self.status.is_none_or(|s| s == school.status())
            && (contains_query(school.name(), &q) || contains_query(school.city(), &q))
    }

    #[must_use]
    pub fn apply<'a>(&self, schools: &'a [School]) -> Vec<&'a School> {
        schools.iter().filter(|s| self.matches(s)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherFilter {
    pub query: String,
    pub status: Option<TeacherStatus>,
    pub subject: Option<String>,
}

impl TeacherFilter {
    #[must_use]
    pub fn matches(&self, teacher: &Teacher) -> bool {
        let q = normalize(&self.query);
        let subject_ok = match self.subject.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => teacher
                .subject()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
        };
        self.status.is_none_or(|s| s == teacher.status())
            && subject_ok
            && (contains_query(teacher.name(), &q) || contains_query(teacher.email(), &q))
    }

    #[must_use]
    pub fn apply<'a>(&self, teachers: &'a [Teacher]) -> Vec<&'a Teacher> {
        teachers.iter().filter(|t| self.matches(t)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    pub query: String,
    pub status: Option<ModuleStatus>,
    pub competency: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub max_duration_minutes: Option<u32>,
}

impl ModuleFilter {
    #[must_use]
    pub fn published() -> Self {
        Self {
            status: Some(ModuleStatus::Published),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, module: &PdModule) -> bool {
        let q = normalize(&self.query);
        let competency_ok = match self.competency.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => module.competency().eq_ignore_ascii_case(wanted),
        };
        self.status.is_none_or(|s| s == module.status())
            && self.difficulty.is_none_or(|d| d == module.difficulty())
            && self
                .max_duration_minutes
                .is_none_or(|max| module.duration_minutes() <= max)
            && competency_ok
            && (contains_query(module.title(), &q) || contains_query(module.competency(), &q))
    }

    #[must_use]
    pub fn apply<'a>(&self, modules: &'a [PdModule]) -> Vec<&'a PdModule> {
        modules.iter().filter(|m| self.matches(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{ModuleId, SchoolId, TeacherId};
    use crate::model::module::ModuleDraft;
    use crate::model::school::{OnboardingLimit, SchoolDraft};
    use crate::model::teacher::TeacherDraft;
    use crate::time::fixed_now;

    fn school(id: u64, name: &str, city: &str) -> School {
        School::register(
            SchoolId::new(id),
            SchoolDraft {
                name: name.into(),
                city: city.into(),
                contact_email: format!("office{id}@school.org"),
            },
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn school_filter_by_status_and_query() {
        let mut approved = school(1, "Hillside Academy", "Nairobi");
        approved.approve(OnboardingLimit::new(5).unwrap()).unwrap();
        let schools = vec![approved, school(2, "Lakeside School", "Kisumu")];

        let hits = SchoolFilter::pending().apply(&schools);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Lakeside School");

        let hits = SchoolFilter::default().with_query("NAIROBI").apply(&schools);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), SchoolId::new(1));

        assert_eq!(SchoolFilter::default().apply(&schools).len(), 2);
    }

    #[test]
    fn teacher_filter_matches_email_and_subject() {
        let teachers = vec![
            Teacher::invite(
                TeacherId::new(1),
                SchoolId::new(1),
                TeacherDraft {
                    name: "Maya".into(),
                    email: "maya@hill.org".into(),
                    subject: Some("Math".into()),
                },
                fixed_now(),
            )
            .unwrap(),
            Teacher::invite(
                TeacherId::new(2),
                SchoolId::new(1),
                TeacherDraft {
                    name: "Leo".into(),
                    email: "leo@hill.org".into(),
                    subject: Some("Science".into()),
                },
                fixed_now(),
            )
            .unwrap(),
        ];

        let filter = TeacherFilter {
            query: "hill.org".into(),
            subject: Some("math".into()),
            ..TeacherFilter::default()
        };
        let hits = filter.apply(&teachers);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Maya");
    }

    #[test]
    fn module_filter_by_duration_and_difficulty() {
        let module = |id: u64, minutes: u32, difficulty: Difficulty| {
            PdModule::new(
                ModuleId::new(id),
                ModuleDraft {
                    title: format!("Module {id}"),
                    description: String::new(),
                    competency: "Classroom Management".into(),
                    difficulty,
                    duration_minutes: minutes,
                },
                fixed_now(),
            )
            .unwrap()
        };
        let modules = vec![
            module(1, 30, Difficulty::Beginner),
            module(2, 90, Difficulty::Beginner),
            module(3, 20, Difficulty::Advanced),
        ];

        let filter = ModuleFilter {
            query: "classroom".into(),
            difficulty: Some(Difficulty::Beginner),
            max_duration_minutes: Some(60),
            ..ModuleFilter::default()
        };
        let hits = filter.apply(&modules);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), ModuleId::new(1));
        assert!(ModuleFilter::published().apply(&modules).is_empty());
    }
}
