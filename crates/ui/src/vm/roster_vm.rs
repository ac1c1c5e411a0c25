use pd_core::model::{Teacher, TeacherDraft, TeacherId, TeacherStatus};
use services::RosterCapacity;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeacherRowVm {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub status_label: &'static str,
    pub can_activate: bool,
    pub can_deactivate: bool,
}

impl From<&Teacher> for TeacherRowVm {
    fn from(teacher: &Teacher) -> Self {
        let status = teacher.status();
        Self {
            id: teacher.id(),
            name: teacher.name().to_owned(),
            email: teacher.email().to_owned(),
            subject: teacher.subject().unwrap_or("—").to_owned(),
            status_label: status_label(status),
            can_activate: status != TeacherStatus::Active,
            can_deactivate: status != TeacherStatus::Inactive,
        }
    }
}

#[must_use]
pub fn status_label(status: TeacherStatus) -> &'static str {
    match status {
        TeacherStatus::Invited => "Invited",
        TeacherStatus::Active => "Active",
        TeacherStatus::Inactive => "Inactive",
    }
}

/// The roster page: capacity header plus one row per teacher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterVm {
    pub rows: Vec<TeacherRowVm>,
    pub capacity_label: String,
    pub can_invite: bool,
}

impl RosterVm {
    #[must_use]
    pub fn new(teachers: &[Teacher], capacity: RosterCapacity) -> Self {
        let capacity_label = match capacity.limit {
            Some(limit) => format!("{} of {limit} seats used", capacity.enrolled),
            None => "Awaiting approval".into(),
        };
        Self {
            rows: teachers.iter().map(TeacherRowVm::from).collect(),
            capacity_label,
            can_invite: !capacity.is_full(),
        }
    }
}

/// Raw values of the invite form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InviteForm {
    pub name: String,
    pub email: String,
    pub subject: String,
}

impl InviteForm {
    /// Whether the submit button is enabled. Full validation happens in the
    /// roster service.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.email.contains('@')
    }

    #[must_use]
    pub fn to_draft(&self) -> TeacherDraft {
        let subject = self.subject.trim();
        TeacherDraft {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            subject: (!subject.is_empty()).then(|| subject.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_core::model::SchoolId;
    use pd_core::time::fixed_now;

    fn teacher(status: TeacherStatus) -> Teacher {
        let mut teacher = Teacher::invite(
            TeacherId::new(1),
            SchoolId::new(1),
            TeacherDraft {
                name: "Zola".into(),
                email: "zola@school.org".into(),
                subject: None,
            },
            fixed_now(),
        )
        .unwrap();
        match status {
            TeacherStatus::Invited => {}
            TeacherStatus::Active => teacher.activate().unwrap(),
            TeacherStatus::Inactive => teacher.deactivate().unwrap(),
        }
        teacher
    }

    #[test]
    fn row_actions_follow_status() {
        let invited = TeacherRowVm::from(&teacher(TeacherStatus::Invited));
        assert!(invited.can_activate && invited.can_deactivate);
        assert_eq!(invited.subject, "—");

        let active = TeacherRowVm::from(&teacher(TeacherStatus::Active));
        assert!(!active.can_activate);

        let inactive = TeacherRowVm::from(&teacher(TeacherStatus::Inactive));
        assert!(!inactive.can_deactivate);
    }

    #[test]
    fn full_roster_disables_invites() {
        let roster = RosterVm::new(
            &[teacher(TeacherStatus::Active)],
            RosterCapacity {
                enrolled: 1,
                limit: Some(1),
            },
        );
        assert_eq!(roster.capacity_label, "1 of 1 seats used");
        assert!(!roster.can_invite);

        let pending = RosterVm::new(&[], RosterCapacity { enrolled: 0, limit: None });
        assert_eq!(pending.capacity_label, "Awaiting approval");
        assert!(!pending.can_invite);
    }

    #[test]
    fn invite_form_trims_into_a_draft() {
        let form = InviteForm {
            name: "  Ama Mensah ".into(),
            email: " ama@school.org".into(),
            subject: "   ".into(),
        };
        assert!(form.is_complete());
        let draft = form.to_draft();
        assert_eq!(draft.name, "Ama Mensah");
        assert_eq!(draft.subject, None);
        assert!(!InviteForm::default().is_complete());
    }
}
