use thiserror::Error;

use crate::model::{CurriculumError, ModuleError, StudySessionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error(transparent)]
    StudySession(#[from] StudySessionError),
}
