use anyhow::Context;
use bg_compose::Compositor;
use bg_core::{ArticleMetadata, Config, ContentGenerator, ImageSource, Publisher, RunMode, Worklist};
use bg_pipeline::{init_logging, ArticleJob, Scheduler};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, the variables may already be exported
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Failed to load configuration")?;
    let level: Level = config
        .log_level
        .parse()
        .with_context(|| format!("Invalid LOG_LEVEL: {}", config.log_level))?;
    let logger = init_logging(level);

    let generator = bg_inference::create_generator(&config.generation, config.request_timeout)?;
    info!("🧠 Content generator initialized (using {})", generator.name());

    let images = bg_images::create_image_source(&config.images, config.request_timeout)?;
    info!("📸 Image source initialized (using {})", images.name());

    let publisher = bg_publish::create_publisher(&config, config.request_timeout)?;
    match config.run_mode {
        RunMode::Publish => info!("🏪 Publisher initialized (using {})", publisher.name()),
        RunMode::DryRun => info!("🧪 Dry run: drafts stay in memory"),
    }

    let job = ArticleJob::new(
        images,
        generator,
        publisher,
        Compositor::new(config.insertion_policy),
        ArticleMetadata::draft(config.author.clone(), config.tags.clone()),
    );

    let worklist = Worklist::dog_breeds().truncated(config.worklist_limit);
    info!(
        "🐕 Processing {} subject(s), one every {}ms",
        worklist.len(),
        config.job_interval.as_millis()
    );

    Scheduler::new(config.job_interval)
        .with_logger(logger)
        .run(worklist.subjects(), &job)
        .await;

    info!("🏁 Worklist finished");
    Ok(())
}
