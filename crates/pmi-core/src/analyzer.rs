//! The analysis pipeline: request → prompt → provider → sections

use tracing::{debug, info, warn};

use crate::analysis::{AnalysisOutcome, AnalysisRequest, SplitOutcome, StructuralWarning};
use crate::json_response::JsonResponseParser;
use crate::llm::{GenerationConfig, GenerationResult, LLMProvider, ResponseFormat};
use crate::prompt::PromptBuilder;
use crate::section::SectionHeadings;
use crate::splitter::ResponseSplitter;
use crate::types::RetryConfig;
use crate::Result;

/// Runs competitive analyses against an LLM provider
pub struct Analyzer<L: LLMProvider> {
    llm: L,
    prompt: PromptBuilder,
    splitter: ResponseSplitter,
    retry: RetryConfig,
    generation: GenerationConfig,
}

impl<L: LLMProvider> Analyzer<L> {
    /// Create an analyzer with default prompt, headings and retry policy
    pub fn new(llm: L) -> Self {
        let generation = GenerationConfig {
            model_id: llm.model_id().to_string(),
            ..Default::default()
        };
        Self {
            llm,
            prompt: PromptBuilder::default(),
            splitter: ResponseSplitter::default(),
            retry: RetryConfig::default(),
            generation,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.generation.response_format = prompt.format();
        self.prompt = prompt;
        self
    }

    pub fn with_headings(mut self, headings: SectionHeadings) -> Self {
        self.splitter = ResponseSplitter::new(headings);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override generation settings. The response format always follows
    /// the prompt builder.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation = GenerationConfig {
            response_format: self.prompt.format(),
            ..config
        };
        self
    }

    pub fn provider(&self) -> &L {
        &self.llm
    }

    /// Analyze a product. Blank input is rejected before anything is sent.
    pub async fn analyze(&self, product_description: &str) -> Result<AnalysisOutcome> {
        let request = AnalysisRequest::new(product_description)?;
        self.analyze_request(request).await
    }

    pub async fn analyze_request(&self, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        let prompt = self.prompt.build(&request);
        debug!(
            product = request.product_description(),
            prompt_len = prompt.len(),
            "built analysis prompt"
        );

        let (result, attempts) = self.generate_with_retry(&prompt).await?;
        info!(
            model = %result.model_id,
            attempts,
            chars = result.text.len(),
            "received completion"
        );

        let SplitOutcome {
            response,
            mut warnings,
        } = self.parse(&result.text);

        if result.truncated {
            warn!("completion was truncated at the output token limit");
            warnings.insert(0, StructuralWarning::TruncatedCompletion);
        }

        Ok(AnalysisOutcome {
            request,
            response,
            warnings,
            model_id: result.model_id,
            attempts,
        })
    }

    /// Split a completion according to the configured response format
    pub fn parse(&self, completion: &str) -> SplitOutcome {
        match self.generation.response_format {
            ResponseFormat::Sections => self.splitter.split(completion),
            ResponseFormat::Json => JsonResponseParser::new(self.splitter.clone()).parse(completion),
        }
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<(GenerationResult, u32)> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.llm.generate_with_config(prompt, &self.generation).await {
                Ok(result) => return Ok((result, attempt)),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(attempt, error = %e, "transient provider failure, retrying");
                    if !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
