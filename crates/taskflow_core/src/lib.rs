pub mod classify;
pub mod dates;
pub mod error;
pub mod model;
pub mod notify;
pub mod reminder;
pub mod settings;
pub mod storage;
pub mod task_api;
