//! Habit and to-do use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into user-facing actions.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Services are storage-agnostic; they only see repository traits.

pub mod habit_service;
pub mod todo_service;

use crate::model::todo::TodoTransitionError;
use crate::model::ModelValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ModelValidationError),
    NotFound(Uuid),
    Transition(TodoTransitionError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "not found: {id}"),
            Self::Transition(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transition(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for ServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TodoTransitionError> for ServiceError {
    fn from(value: TodoTransitionError) -> Self {
        Self::Transition(value)
    }
}
