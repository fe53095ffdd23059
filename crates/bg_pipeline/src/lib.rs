pub mod job;
pub mod limiter;
pub mod logging;
pub mod scheduler;

pub use job::{ArticleJob, Job, JobFailure, JobReport, JobTemplates, Stage};
pub use limiter::RateLimiter;
pub use logging::{init_logging, Logger};
pub use scheduler::Scheduler;

pub mod prelude {
    pub use super::{ArticleJob, Job, Scheduler};
    pub use bg_core::{Subject, Worklist, Result, Error};
}
