use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use bg_compose::Compositor;
use bg_core::{
    ArticleMetadata, ContentGenerator, Error, ImageSource, PublishRequest, Publisher, Subject,
};
use crate::logging::Logger;

/// Where in a job a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Images,
    Generation,
    Compose,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Images => "image search",
            Stage::Generation => "generation",
            Stage::Compose => "composition",
            Stage::Publish => "publish",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {error}")]
pub struct JobFailure {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl JobFailure {
    pub fn new(stage: Stage, error: Error) -> Self {
        Self { stage, error }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub title: String,
    pub article_id: Option<u64>,
    pub collection_id: u64,
}

/// One unit of work per subject.
#[async_trait]
pub trait Job: Send + Sync {
    /// `logger` is already scoped to `subject`.
    async fn run(&self, subject: &Subject, logger: &Logger) -> Result<JobReport, JobFailure>;
}

/// Text templates for a job; `{subject}` is replaced with the subject name.
#[derive(Debug, Clone)]
pub struct JobTemplates {
    pub prompt: String,
    pub title: String,
    pub image_query: String,
}

impl Default for JobTemplates {
    fn default() -> Self {
        Self {
            prompt: "Write a long form blog post about how to care for a {subject} puppy \
                     and their breed specific needs, health issues and diet. \
                     Output as html: <html>\n"
                .to_string(),
            title: "What you should know before adopting a {subject} puppy".to_string(),
            image_query: "{subject} dog".to_string(),
        }
    }
}

impl JobTemplates {
    pub fn prompt(&self, subject: &Subject) -> String {
        render(&self.prompt, subject)
    }

    pub fn title(&self, subject: &Subject) -> String {
        render(&self.title, subject)
    }

    pub fn image_query(&self, subject: &Subject) -> String {
        render(&self.image_query, subject)
    }
}

fn render(template: &str, subject: &Subject) -> String {
    template.replace("{subject}", subject.as_str())
}

/// Fetch images and text, merge them, and submit a draft.
pub struct ArticleJob {
    images: Arc<dyn ImageSource>,
    generator: Arc<dyn ContentGenerator>,
    publisher: Arc<dyn Publisher>,
    compositor: Compositor,
    templates: JobTemplates,
    metadata: ArticleMetadata,
}

impl ArticleJob {
    pub fn new(
        images: Arc<dyn ImageSource>,
        generator: Arc<dyn ContentGenerator>,
        publisher: Arc<dyn Publisher>,
        compositor: Compositor,
        metadata: ArticleMetadata,
    ) -> Self {
        Self {
            images,
            generator,
            publisher,
            compositor,
            templates: JobTemplates::default(),
            metadata,
        }
    }

    pub fn with_templates(mut self, templates: JobTemplates) -> Self {
        self.templates = templates;
        self
    }
}

#[async_trait]
impl Job for ArticleJob {
    async fn run(&self, subject: &Subject, logger: &Logger) -> Result<JobReport, JobFailure> {
        let query = self.templates.image_query(subject);
        let prompt = self.templates.prompt(subject);

        logger.scoped(Stage::Images).info(&format!(
            "📸 Searching {} for {:?} while {} writes",
            self.images.name(),
            query,
            self.generator.name()
        ));
        let (images, generated) = tokio::join!(
            self.images.search(&query),
            self.generator.generate(&prompt)
        );
        let images = images.map_err(|e| JobFailure::new(Stage::Images, e))?;
        let generated = generated.map_err(|e| JobFailure::new(Stage::Generation, e))?;
        let text = generated.first().ok_or_else(|| {
            JobFailure::new(
                Stage::Generation,
                Error::EmptyResult("generation returned no candidates".to_string()),
            )
        })?;
        logger.scoped(Stage::Generation).debug(&format!("Generated markup:\n{}", text));

        logger.scoped(Stage::Compose).info(&format!("🖼️ Adding {} image(s) to the article", images.len()));
        let article = self
            .compositor
            .compose(text, &images, &self.templates.title(subject))
            .map_err(|e| JobFailure::new(Stage::Compose, e))?;

        let publish_log = logger.scoped(Stage::Publish);
        publish_log.info(&format!("📤 Posting {:?} to {}", article.title, self.publisher.name()));
        let request = PublishRequest::new(article, &images, self.metadata.clone());
        let published = self
            .publisher
            .publish(&request)
            .await
            .map_err(|e| JobFailure::new(Stage::Publish, e))?;
        publish_log.debug(&format!("Backend response: {}", published.payload));

        Ok(JobReport {
            title: request.title,
            article_id: published.id,
            collection_id: published.collection_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::{GenerationResult, ImageSet, InsertionPolicy, PublishedArticle, Result};
    use std::sync::Mutex;

    /// `None` makes the search fail.
    struct MockImages(Option<Vec<String>>);
    struct MockGenerator(Vec<String>);
    #[derive(Default)]
    struct MockPublisher(Mutex<Vec<PublishRequest>>);

    #[async_trait]
    impl ImageSource for MockImages {
        fn name(&self) -> &str {
            "mock"
        }

        async fn search(&self, _query: &str) -> Result<ImageSet> {
            match &self.0 {
                Some(urls) => Ok(ImageSet::new(urls.clone())),
                None => Err(Error::upstream("mock", "search failed")),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _prompt: &str) -> Result<GenerationResult> {
            Ok(GenerationResult { candidates: self.0.clone() })
        }
    }

    #[async_trait]
    impl Publisher for MockPublisher {
        fn name(&self) -> &str {
            "mock"
        }

        async fn publish(&self, request: &PublishRequest) -> Result<PublishedArticle> {
            self.0.lock().unwrap().push(request.clone());
            Ok(PublishedArticle {
                id: Some(42),
                collection_id: 1,
                created_at: None,
                payload: serde_json::Value::Null,
            })
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://img/{}.jpg", i)).collect()
    }

    fn job(images: MockImages, candidates: Vec<&str>, publisher: Arc<MockPublisher>) -> ArticleJob {
        ArticleJob::new(
            Arc::new(images),
            Arc::new(MockGenerator(candidates.into_iter().map(str::to_string).collect())),
            publisher,
            Compositor::new(InsertionPolicy::Strict),
            ArticleMetadata::draft("Jane Doe", vec!["dogs".to_string()]),
        )
    }

    #[test]
    fn test_templates_substitute_subject() {
        let templates = JobTemplates::default();
        let subject = Subject::new("Pug");
        assert_eq!(templates.image_query(&subject), "Pug dog");
        assert_eq!(templates.title(&subject), "What you should know before adopting a Pug puppy");
        assert!(templates.prompt(&subject).contains("care for a Pug puppy"));
    }

    #[tokio::test]
    async fn test_job_uses_first_candidate_and_default_title() {
        let publisher = Arc::new(MockPublisher::default());
        let job = job(
            MockImages(Some(urls(3))),
            vec!["<p>a</p><p>b</p>", "<h1>Ignored</h1>"],
            publisher.clone(),
        );

        let report = job.run(&Subject::new("Pug"), &Logger::new()).await.unwrap();
        assert_eq!(report.title, "What you should know before adopting a Pug puppy");
        assert_eq!(report.article_id, Some(42));

        let requests = publisher.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].cover_image_url.as_deref(), Some("https://img/0.jpg"));
        assert!(!requests[0].metadata.published);
    }

    #[tokio::test]
    async fn test_image_failure_is_reported_at_its_stage() {
        let publisher = Arc::new(MockPublisher::default());
        let job = job(
            MockImages(None),
            vec!["<p>a</p><p>b</p>"],
            publisher.clone(),
        );

        let failure = job.run(&Subject::new("Pug"), &Logger::new()).await.unwrap_err();
        assert_eq!(failure.stage, Stage::Images);
        assert!(failure.error.is_upstream());
        assert!(publisher.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_generation_is_reported() {
        let publisher = Arc::new(MockPublisher::default());
        let job = job(MockImages(Some(urls(3))), vec![], publisher.clone());

        let failure = job.run(&Subject::new("Pug"), &Logger::new()).await.unwrap_err();
        assert_eq!(failure.stage, Stage::Generation);
        assert!(matches!(failure.error, Error::EmptyResult(_)));
        assert_eq!(failure.to_string(), "generation failed: Empty result: generation returned no candidates");
        let source = std::error::Error::source(&failure).expect("stage failure keeps its cause");
        assert_eq!(source.to_string(), "Empty result: generation returned no candidates");
    }

    #[tokio::test]
    async fn test_compose_failure_stops_before_publish() {
        let publisher = Arc::new(MockPublisher::default());
        let job = job(MockImages(Some(urls(3))), vec!["<p>lonely</p>"], publisher.clone());

        let failure = job.run(&Subject::new("Pug"), &Logger::new()).await.unwrap_err();
        assert_eq!(failure.stage, Stage::Compose);
        assert!(matches!(failure.error, Error::InsertionPointNotFound { .. }));
        assert!(publisher.0.lock().unwrap().is_empty());
    }
}
