//! Text generation service abstraction.
//!
//! The extraction pipeline only needs "prompt in, text out". [`TextGenerator`]
//! is that seam; [`HttpGenerator`] is the production implementation talking to
//! a remote model over HTTP.

mod client;

pub use client::HttpGenerator;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::models::config::GenerationConfig;

/// Something that turns a prompt into generated text.
pub trait TextGenerator {
    /// Generate a continuation for `prompt`.
    ///
    /// Any failure to obtain text is reported as
    /// [`ExtractionError::UpstreamUnavailable`].
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ExtractionError>> + Send;
}

/// Request body of the prompt endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    #[serde(flatten)]
    pub params: &'a GenerationConfig,
}

/// One element of the prompt endpoint's response array.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}
