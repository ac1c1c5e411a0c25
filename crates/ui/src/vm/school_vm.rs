use pd_core::model::{OnboardingLimit, School, SchoolId, SchoolStatus};

use crate::vm::time_fmt::format_date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolRowVm {
    pub id: SchoolId,
    pub name: String,
    pub city: String,
    pub contact_email: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub limit_label: String,
    pub registered_str: String,
    pub can_decide: bool,
}

impl From<&School> for SchoolRowVm {
    fn from(school: &School) -> Self {
        Self {
            id: school.id(),
            name: school.name().to_owned(),
            city: school.city().to_owned(),
            contact_email: school.contact_email().to_owned(),
            status_label: status_label(school.status()),
            status_class: status_class(school.status()),
            limit_label: school
                .onboarding_limit()
                .map_or_else(|| "—".into(), |limit| format!("{} teachers", limit.value())),
            registered_str: format_date(school.created_at()),
            can_decide: school.is_pending(),
        }
    }
}

#[must_use]
pub fn map_school_rows(schools: &[School]) -> Vec<SchoolRowVm> {
    schools.iter().map(SchoolRowVm::from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolDetailVm {
    pub row: SchoolRowVm,
    pub rejection_reason: Option<String>,
    /// Approved schools may only raise their limit.
    pub can_raise_limit: bool,
}

impl From<&School> for SchoolDetailVm {
    fn from(school: &School) -> Self {
        Self {
            row: SchoolRowVm::from(school),
            rejection_reason: school.rejection_reason().map(str::to_owned),
            can_raise_limit: school.status() == SchoolStatus::Approved,
        }
    }
}

#[must_use]
pub fn status_label(status: SchoolStatus) -> &'static str {
    match status {
        SchoolStatus::Pending => "Pending review",
        SchoolStatus::Approved => "Approved",
        SchoolStatus::Rejected => "Rejected",
    }
}

fn status_class(status: SchoolStatus) -> &'static str {
    match status {
        SchoolStatus::Pending => "badge badge-pending",
        SchoolStatus::Approved => "badge badge-ok",
        SchoolStatus::Rejected => "badge badge-muted",
    }
}

/// Reads the onboarding-limit field of the approval form.
///
/// # Errors
///
/// Returns a user-facing message for blank, non-numeric or zero input.
pub fn parse_limit(raw: &str) -> Result<OnboardingLimit, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Enter how many teachers this school may onboard".into());
    }
    let value: u32 = raw
        .parse()
        .map_err(|_| format!("\"{raw}\" is not a whole number"))?;
    OnboardingLimit::new(value).map_err(|err| err.to_string())
}
