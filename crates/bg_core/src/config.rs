use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use crate::{Error, Result};

pub const DEFAULT_TAGS: &str = "dogs, puppies, advice, health, tips, care";
pub const DEFAULT_MODEL: &str = "text-davinci-002";
pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2022-10";
pub const DEFAULT_JOB_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Publish,
    DryRun,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "publish" => Ok(Self::Publish),
            "dry-run" | "dryrun" | "dry_run" => Ok(Self::DryRun),
            other => Err(Error::Configuration(format!("Unknown RUN_MODE: {}", other))),
        }
    }
}

/// What the compositor does when the markup or the image set can't satisfy
/// the two in-body image slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPolicy {
    /// Fail the job.
    #[default]
    Strict,
    /// Leave the affected slots empty and keep going.
    SkipImages,
}

impl FromStr for InsertionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "skip" | "skip-images" => Ok(Self::SkipImages),
            other => Err(Error::Configuration(format!("Unknown INSERTION_POLICY: {}", other))),
        }
    }
}

#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Clone)]
pub enum ImageSearchConfig {
    Google { api_key: String, engine_id: String },
    Unsplash { access_key: String },
}

impl ImageSearchConfig {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Google { .. } => "google",
            Self::Unsplash { .. } => "unsplash",
        }
    }
}

impl fmt::Debug for ImageSearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google { engine_id, .. } => f
                .debug_struct("Google")
                .field("api_key", &"<redacted>")
                .field("engine_id", engine_id)
                .finish(),
            Self::Unsplash { .. } => f
                .debug_struct("Unsplash")
                .field("access_key", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Clone)]
pub struct ShopConfig {
    pub domain: String,
    pub access_token: String,
    pub api_version: String,
}

impl fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopConfig")
            .field("domain", &self.domain)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub generation: GenerationConfig,
    pub images: ImageSearchConfig,
    /// Always present in publish mode.
    pub shop: Option<ShopConfig>,
    pub run_mode: RunMode,
    pub author: String,
    pub tags: Vec<String>,
    pub worklist_limit: Option<usize>,
    pub job_interval: Duration,
    pub request_timeout: Duration,
    pub insertion_policy: InsertionPolicy,
    pub log_level: String,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as
    /// missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let generation = GenerationConfig {
            api_key: env.required("OPENAI_API_KEY")?,
            model: env.optional("GENERATION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let provider = env.optional("IMAGE_PROVIDER").unwrap_or_else(|| "google".to_string());
        let images = match provider.to_lowercase().as_str() {
            "google" => ImageSearchConfig::Google {
                api_key: env.required("GOOGLE_SEARCH_API_KEY")?,
                engine_id: env.required("GOOGLE_SEARCH_ENGINE_ID")?,
            },
            "unsplash" => ImageSearchConfig::Unsplash {
                access_key: env.required("UNSPLASH_ACCESS_KEY")?,
            },
            other => {
                return Err(Error::Configuration(format!("Unknown IMAGE_PROVIDER: {}", other)))
            }
        };

        let run_mode = env.parsed("RUN_MODE")?.unwrap_or(RunMode::Publish);
        let api_version = env
            .optional("SHOPIFY_API_VERSION")
            .unwrap_or_else(|| DEFAULT_SHOPIFY_API_VERSION.to_string());
        let shop = match run_mode {
            RunMode::Publish => Some(ShopConfig {
                domain: env.required("SHOP")?,
                access_token: env.required("SHOP_API_KEY")?,
                api_version,
            }),
            RunMode::DryRun => match (env.optional("SHOP"), env.optional("SHOP_API_KEY")) {
                (Some(domain), Some(access_token)) => Some(ShopConfig { domain, access_token, api_version }),
                _ => None,
            },
        };

        let tags = parse_tags(&env.optional("BLOG_TAGS").unwrap_or_else(|| DEFAULT_TAGS.to_string()));

        Ok(Self {
            generation,
            images,
            shop,
            run_mode,
            author: env.required("BLOG_AUTHOR")?,
            tags,
            worklist_limit: env.parsed("WORKLIST_LIMIT")?,
            job_interval: Duration::from_millis(
                env.parsed("JOB_INTERVAL_MS")?.unwrap_or(DEFAULT_JOB_INTERVAL_MS),
            ),
            request_timeout: Duration::from_secs(
                env.parsed("REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            insertion_policy: env.parsed("INSERTION_POLICY")?.unwrap_or_default(),
            log_level: env.optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| Error::Configuration(format!("{} is required", key)))
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(key)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|e| Error::Configuration(format!("Invalid {}: {}", key, e)))
            })
            .transpose()
    }
}
