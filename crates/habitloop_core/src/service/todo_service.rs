//! To-do use-case service.

use crate::model::todo::{TodoId, TodoItem, TodoPolicy};
use crate::model::ModelValidationError;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::RepoResult;
use crate::service::{ServiceError, ServiceResult};

/// To-do actions under one completion policy.
pub struct TodoService<R: TodoRepository> {
    repo: R,
    policy: TodoPolicy,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R, policy: TodoPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> TodoPolicy {
        self.policy
    }

    pub fn create_todo(&self, title: &str, now_ms: i64) -> ServiceResult<TodoItem> {
        let item = TodoItem::new(title.trim(), now_ms);
        self.repo.create_todo(&item)?;
        Ok(item)
    }

    pub fn rename_todo(&self, id: TodoId, title: &str) -> ServiceResult<TodoItem> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ModelValidationError::EmptyTitle.into());
        }
        let mut item = self.require(id)?;
        item.title = title.to_string();
        self.repo.update_todo(&item)?;
        Ok(item)
    }

    /// Sets the completed flag, subject to the policy.
    pub fn set_completed(&self, id: TodoId, completed: bool) -> ServiceResult<TodoItem> {
        let mut item = self.require(id)?;
        if item.set_completed(completed, self.policy)? {
            self.repo.update_todo(&item)?;
        }
        Ok(item)
    }

    /// Flips the completed flag, subject to the policy.
    pub fn toggle_todo(&self, id: TodoId) -> ServiceResult<TodoItem> {
        let current = self.require(id)?;
        self.set_completed(id, !current.is_completed)
    }

    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.repo.delete_todo(id)?;
        Ok(())
    }

    pub fn list_todos(&self) -> RepoResult<Vec<TodoItem>> {
        self.repo.list_todos()
    }

    fn require(&self, id: TodoId) -> ServiceResult<TodoItem> {
        self.repo.get_todo(id)?.ok_or(ServiceError::NotFound(id))
    }
}
