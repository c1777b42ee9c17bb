mod task;

pub use task::{LogEntry, Subtask, Task, generated_id};
