pub mod feasibility;
pub mod job_checker;

pub use job_checker::JobChecker;
