use pd_core::model::AttemptStatus;
use services::{AdminOverview, AssignmentTally, SchoolOverview, TeacherOverview};

/// One number on a dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatTileVm {
    pub label: &'static str,
    pub value: String,
}

impl StatTileVm {
    fn new(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: value.to_string(),
        }
    }
}

#[must_use]
pub fn admin_tiles(overview: &AdminOverview) -> Vec<StatTileVm> {
    vec![
        StatTileVm::new("Pending schools", overview.pending_schools),
        StatTileVm::new("Approved schools", overview.approved_schools),
        StatTileVm::new("Teachers", overview.teachers),
        StatTileVm::new("Published modules", overview.published_modules),
        StatTileVm::new("Draft modules", overview.draft_modules),
    ]
}

fn assignment_tiles(tally: &AssignmentTally) -> [StatTileVm; 3] {
    [
        StatTileVm::new("Open assignments", tally.open()),
        StatTileVm::new("Completed", tally.completed),
        StatTileVm::new("Overdue", tally.overdue),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolDashboardVm {
    pub school_name: String,
    pub tiles: Vec<StatTileVm>,
    /// Shown instead of the invite button while the school awaits approval.
    pub notice: Option<String>,
}

impl From<&SchoolOverview> for SchoolDashboardVm {
    fn from(overview: &SchoolOverview) -> Self {
        let seats = match overview.capacity.limit {
            Some(limit) => format!("{} / {limit}", overview.capacity.enrolled),
            None => overview.capacity.enrolled.to_string(),
        };
        let mut tiles = vec![
            StatTileVm::new("Seats used", seats),
            StatTileVm::new("Active teachers", overview.active_teachers),
            StatTileVm::new("Invited", overview.invited_teachers),
        ];
        tiles.extend(assignment_tiles(&overview.assignments));
        let notice = if overview.capacity.limit.is_none() {
            Some("Your school is awaiting approval. Teachers can be invited once it is approved.".into())
        } else if overview.capacity.is_full() {
            Some("All onboarding seats are in use.".into())
        } else {
            None
        };
        Self {
            school_name: overview.school.name().to_owned(),
            tiles,
            notice,
        }
    }
}

/// The teacher's call to action for the competency assessment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentCta {
    Start,
    Resume,
    Evaluated,
}

impl AssessmentCta {
    #[must_use]
    pub fn from_status(status: Option<AttemptStatus>) -> Self {
        match status {
            None | Some(AttemptStatus::NotStarted) => AssessmentCta::Start,
            Some(AttemptStatus::InProgress) => AssessmentCta::Resume,
            Some(AttemptStatus::Evaluated) => AssessmentCta::Evaluated,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AssessmentCta::Start => "Start competency assessment",
            AssessmentCta::Resume => "Resume competency assessment",
            AssessmentCta::Evaluated => "Assessment evaluated",
        }
    }

    #[must_use]
    pub fn is_actionable(self) -> bool {
        !matches!(self, AssessmentCta::Evaluated)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeacherDashboardVm {
    pub greeting: String,
    pub tiles: Vec<StatTileVm>,
    pub assessment: AssessmentCta,
}

impl From<&TeacherOverview> for TeacherDashboardVm {
    fn from(overview: &TeacherOverview) -> Self {
        Self {
            greeting: format!("Welcome back, {}", overview.teacher.name()),
            tiles: assignment_tiles(&overview.assignments).into(),
            assessment: AssessmentCta::from_status(overview.assessment),
        }
    }
}
