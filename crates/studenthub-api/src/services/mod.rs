pub mod tool_jobs;

pub use tool_jobs::ToolJobRunner;
