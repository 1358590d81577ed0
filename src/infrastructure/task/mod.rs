//! Task infrastructure - storage and the task service

mod repository;
mod service;

pub use repository::InMemoryTaskRepository;
pub use service::{CreateTaskRequest, TaskService, UpdateTaskRequest};
