pub mod dashboard;
pub mod error;
pub mod file_store;
pub mod finance;
pub mod finance_view;
pub mod goal;
pub mod goal_view;
pub mod habit;
pub mod habit_view;
pub mod service;
pub mod store;
pub mod task;
pub mod task_view;

pub use crate::error::{BrainError, BrainResult, StoreError, ValidationError};
pub use crate::service::{BrainService, BrainServiceBuilder};
