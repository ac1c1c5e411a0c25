mod admin;
mod assessment;
mod school_admin;
mod shell;
mod state;
mod teacher;
mod toast;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use admin::{AdminHome, AdminModules, AdminSchoolDetail, AdminSchools};
pub use assessment::AssessmentSection;
pub use school_admin::{SchoolAdminHome, SchoolAssignments, SchoolTeachers};
pub use shell::{Home, NotFound, Shell};
pub use state::{RedirectTo, ViewError, ViewState, view_state_from_resource};
pub use teacher::{TeacherHome, TeacherLearning};
pub use toast::{ToastHost, Toaster, use_toaster};
