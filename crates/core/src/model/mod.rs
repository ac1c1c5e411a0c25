pub mod answer;
pub mod assignment;
pub mod attempt;
pub mod catalog;
pub mod ids;
pub mod module;
pub mod question;
pub mod school;
pub mod section;
pub mod teacher;

pub use ids::{AssignmentId, AttemptId, ModuleId, ParseIdError, QuestionId, SchoolId, TeacherId};

pub use answer::{Answer, AnswerStore};
pub use assignment::{AssignmentError, AssignmentStatus, PdAssignment};
pub use attempt::{Attempt, AttemptError, AttemptStatus};
pub use catalog::{DroppedQuestion, Partitioned, QuestionCatalog};
pub use module::{
    Difficulty, Material, MaterialKind, ModuleDraft, ModuleError, ModuleStatus, PdModule,
};
pub use question::{Question, QuestionError, QuestionKind, RawQuestion};
pub use school::{OnboardingLimit, School, SchoolDraft, SchoolError, SchoolStatus};
pub use section::Section;
pub use teacher::{Teacher, TeacherDraft, TeacherError, TeacherStatus};
