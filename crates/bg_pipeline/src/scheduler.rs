use std::time::Duration;
use bg_core::Subject;
use crate::job::Job;
use crate::limiter::RateLimiter;
use crate::logging::Logger;

/// Runs one job per subject, in order, with rate-limited starts.
///
/// A failed job is logged and the next subject proceeds as usual; nothing
/// is aggregated across jobs.
#[derive(Debug)]
pub struct Scheduler {
    limiter: RateLimiter,
    logger: Logger,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            limiter: RateLimiter::new(interval),
            logger: Logger::new(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn run(&mut self, subjects: &[Subject], job: &dyn Job) {
        let total = subjects.len();
        for (i, subject) in subjects.iter().enumerate() {
            let waited = self.limiter.until_ready().await;
            let logger = self.logger.scoped(subject);
            if !waited.is_zero() {
                logger.debug(&format!("Waited {}ms for a slot", waited.as_millis()));
            }

            logger.info(&format!("🚀 Starting job {}/{}", i + 1, total));
            match job.run(subject, &logger).await {
                Ok(report) => match report.article_id {
                    Some(id) => logger.info(&format!("✅ Draft {} created: {}", id, report.title)),
                    None => logger.info(&format!("✅ Draft created: {}", report.title)),
                },
                Err(failure) => logger.error(&format!("❌ {}", failure)),
            }
        }
    }
}
