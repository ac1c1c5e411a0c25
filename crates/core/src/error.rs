use thiserror::Error;

use crate::model::{
    AssignmentError, AttemptError, ModuleError, QuestionError, SchoolError, TeacherError,
};
use crate::navigator::NavigationError;
use crate::validation::ValidationError;

/// Any domain-rule violation raised by `pd-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    School(#[from] SchoolError),
    #[error(transparent)]
    Teacher(#[from] TeacherError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}
