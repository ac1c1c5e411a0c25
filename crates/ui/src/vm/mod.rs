mod assignment_vm;
mod dashboard_vm;
mod feedback;
mod markdown_vm;
mod module_vm;
mod roster_vm;
mod school_vm;
mod section_vm;
mod submit_vm;
mod time_fmt;

pub use assignment_vm::{
    AssignForm, AssignRequest, AssignmentLabels, AssignmentRowVm, assign_outcome_label,
    parse_due_date,
};
pub use dashboard_vm::{
    AssessmentCta, SchoolDashboardVm, StatTileVm, TeacherDashboardVm, admin_tiles,
};
pub use feedback::{NotFound, Resolution, Toast, ToastKind, resolve};
pub use markdown_vm::{excerpt, markdown_to_html, sanitize_html};
pub use module_vm::{
    MaterialForm, MaterialVm, ModuleCardVm, ModuleForm, difficulty_label, map_module_cards,
};
pub use roster_vm::{InviteForm, RosterVm, TeacherRowVm};
pub use school_vm::{SchoolDetailVm, SchoolRowVm, map_school_rows, parse_limit};
pub use section_vm::{
    CompletionVm, OptionVm, QuestionBodyVm, SectionPageVm, entry_route, first_route, media_upload,
    route_after,
};
pub use submit_vm::{SubmitRowVm, SubmitVm, progress_label};
pub use time_fmt::{format_date, format_due};
