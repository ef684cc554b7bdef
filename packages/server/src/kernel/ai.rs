//! Injectable text-generation capability.
//!
//! Assistant copy (nutrition blurbs, chat replies) is produced by a
//! peripheral collaborator. The lifecycle never requires this capability;
//! hosts that lack a backend wire [`NoopTextGenerator`] and everything
//! else keeps working.

use async_trait::async_trait;
use tracing::{debug, warn};

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend label for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Tries an ordered list of backends, returning the first success.
pub struct FallbackTextGenerator {
    backends: Vec<Box<dyn TextGenerator>>,
}

impl FallbackTextGenerator {
    pub fn new(backends: Vec<Box<dyn TextGenerator>>) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl TextGenerator for FallbackTextGenerator {
    fn name(&self) -> &str {
        "fallback-chain"
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        for backend in &self.backends {
            match backend.generate(prompt).await {
                Ok(text) => {
                    debug!(backend = backend.name(), "text generated");
                    return Ok(text);
                }
                Err(error) => {
                    warn!(backend = backend.name(), %error, "backend failed, trying next");
                }
            }
        }
        anyhow::bail!("all text generation backends failed")
    }
}

/// No-backend stand-in; always reports the capability as absent.
pub struct NoopTextGenerator;

#[async_trait]
impl TextGenerator for NoopTextGenerator {
    fn name(&self) -> &str {
        "noop"
    }

    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("text generation is not configured")
    }
}
