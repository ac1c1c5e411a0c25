use std::collections::HashMap;

use chrono::{DateTime, Utc};

use pd_core::model::{
    AssignmentId, AssignmentStatus, ModuleId, PdAssignment, PdModule, Teacher, TeacherId,
};
use services::AssignOutcome;

use crate::vm::time_fmt::{format_date, format_due};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentRowVm {
    pub id: AssignmentId,
    pub module_title: String,
    pub teacher_name: String,
    pub status_label: &'static str,
    pub due_label: String,
    pub overdue: bool,
    pub can_start: bool,
    pub can_complete: bool,
}

/// Joins assignments with module titles and teacher names for display.
/// Unknown ids fall back to the raw id.
#[derive(Debug, Default)]
pub struct AssignmentLabels {
    modules: HashMap<ModuleId, String>,
    teachers: HashMap<TeacherId, String>,
}

impl AssignmentLabels {
    #[must_use]
    pub fn new(modules: &[PdModule], teachers: &[Teacher]) -> Self {
        Self {
            modules: modules
                .iter()
                .map(|m| (m.id(), m.title().to_owned()))
                .collect(),
            teachers: teachers
                .iter()
                .map(|t| (t.id(), t.name().to_owned()))
                .collect(),
        }
    }

    #[must_use]
    pub fn row(&self, assignment: &PdAssignment, now: DateTime<Utc>) -> AssignmentRowVm {
        let status = assignment.status();
        let due_label = match assignment.completed_at() {
            Some(at) => format!("Completed {}", format_date(at)),
            None => format_due(assignment.due_at(), now),
        };
        AssignmentRowVm {
            id: assignment.id(),
            module_title: self
                .modules
                .get(&assignment.module_id())
                .cloned()
                .unwrap_or_else(|| format!("Module {}", assignment.module_id())),
            teacher_name: self
                .teachers
                .get(&assignment.teacher_id())
                .cloned()
                .unwrap_or_else(|| format!("Teacher {}", assignment.teacher_id())),
            status_label: status_label(status),
            due_label,
            overdue: assignment.is_overdue(now),
            can_start: status == AssignmentStatus::Assigned,
            can_complete: status.is_open(),
        }
    }

    #[must_use]
    pub fn rows(&self, assignments: &[PdAssignment], now: DateTime<Utc>) -> Vec<AssignmentRowVm> {
        assignments.iter().map(|a| self.row(a, now)).collect()
    }
}

#[must_use]
pub fn status_label(status: AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Assigned => "Not started",
        AssignmentStatus::InProgress => "In progress",
        AssignmentStatus::Completed => "Completed",
    }
}

/// Parses the optional `YYYY-MM-DD` due-date field; the deadline is the end
/// of that day in UTC.
///
/// # Errors
///
/// Returns a user-facing message for malformed dates.
pub fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("\"{raw}\" is not a date (use YYYY-MM-DD)"))?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| format!("\"{raw}\" is not a date (use YYYY-MM-DD)"))?;
    Ok(Some(end_of_day.and_utc()))
}

/// Raw values of the "assign module" form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignForm {
    pub module: String,
    pub teachers: Vec<TeacherId>,
    pub due: String,
}

/// A validated assignment request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignRequest {
    pub module_id: ModuleId,
    pub teacher_ids: Vec<TeacherId>,
    pub due_at: Option<DateTime<Utc>>,
}

impl AssignForm {
    pub fn toggle_teacher(&mut self, id: TeacherId) {
        if let Some(pos) = self.teachers.iter().position(|t| *t == id) {
            self.teachers.remove(pos);
        } else {
            self.teachers.push(id);
        }
    }

    /// # Errors
    ///
    /// Returns a user-facing message when no module or teacher is picked or
    /// the due date is malformed.
    pub fn to_request(&self) -> Result<AssignRequest, String> {
        let module_id = self
            .module
            .parse::<ModuleId>()
            .map_err(|_| "choose a module to assign".to_owned())?;
        if self.teachers.is_empty() {
            return Err("choose at least one teacher".into());
        }
        Ok(AssignRequest {
            module_id,
            teacher_ids: self.teachers.clone(),
            due_at: parse_due_date(&self.due)?,
        })
    }
}

#[must_use]
pub fn assign_outcome_label(outcome: &AssignOutcome) -> String {
    let created = outcome.created.len();
    let noun = if created == 1 { "teacher" } else { "teachers" };
    match outcome.skipped.len() {
        0 => format!("Assigned to {created} {noun}"),
        skipped => format!("Assigned to {created} {noun}; {skipped} already had it open"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pd_core::model::{Difficulty, ModuleDraft, SchoolId, TeacherDraft};
    use pd_core::time::fixed_now;

    #[test]
    fn rows_join_titles_and_flag_overdue() {
        let now = fixed_now();
        let module = PdModule::new(
            ModuleId::new(1),
            ModuleDraft {
                title: "Growth Mindset".into(),
                description: String::new(),
                competency: "Wellbeing".into(),
                difficulty: Difficulty::Beginner,
                duration_minutes: 30,
            },
            now,
        )
        .unwrap();
        let teacher = Teacher::invite(
            TeacherId::new(5),
            SchoolId::new(1),
            TeacherDraft {
                name: "Kwame".into(),
                email: "kwame@school.org".into(),
                subject: None,
            },
            now,
        )
        .unwrap();
        let labels = AssignmentLabels::new(&[module], &[teacher]);

        let assignment = PdAssignment::new(
            AssignmentId::new(1),
            ModuleId::new(1),
            TeacherId::new(5),
            now,
            Some(now + Duration::days(2)),
        )
        .unwrap();
        let row = labels.row(&assignment, now + Duration::days(4));
        assert_eq!(row.module_title, "Growth Mindset");
        assert_eq!(row.teacher_name, "Kwame");
        assert_eq!(row.due_label, "Overdue by 2 days");
        assert!(row.overdue && row.can_start);

        let orphan = PdAssignment::new(AssignmentId::new(2), ModuleId::new(9), TeacherId::new(8), now, None)
            .unwrap();
        let row = labels.row(&orphan, now);
        assert_eq!(row.module_title, "Module 9");
        assert_eq!(row.due_label, "No due date");
    }

    #[test]
    fn assign_form_requires_module_and_teachers() {
        let mut form = AssignForm::default();
        assert_eq!(form.to_request().unwrap_err(), "choose a module to assign");

        form.module = "3".into();
        assert_eq!(form.to_request().unwrap_err(), "choose at least one teacher");

        form.toggle_teacher(TeacherId::new(1));
        form.toggle_teacher(TeacherId::new(2));
        form.toggle_teacher(TeacherId::new(1));
        let request = form.to_request().unwrap();
        assert_eq!(request.module_id, ModuleId::new(3));
        assert_eq!(request.teacher_ids, vec![TeacherId::new(2)]);
        assert_eq!(request.due_at, None);
    }

    #[test]
    fn outcome_label_mentions_skipped_teachers() {
        let now = fixed_now();
        let created = PdAssignment::new(AssignmentId::new(1), ModuleId::new(1), TeacherId::new(1), now, None)
            .unwrap();
        let outcome = AssignOutcome {
            created: vec![created],
            skipped: vec![TeacherId::new(2)],
        };
        assert_eq!(
            assign_outcome_label(&outcome),
            "Assigned to 1 teacher; 1 already had it open"
        );
        assert_eq!(assign_outcome_label(&AssignOutcome::default()), "Assigned to 0 teachers");
    }

    #[test]
    fn due_date_field_is_optional() {
        assert_eq!(parse_due_date("  ").unwrap(), None);
        let due = parse_due_date("2023-11-20").unwrap().unwrap();
        assert_eq!(format_date(due), "2023-11-20");
        assert!(parse_due_date("20/11/2023").is_err());
    }
}
