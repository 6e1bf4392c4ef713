//! End-to-end conversion of OCR text into a normalized expense.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::category::CategoryReconciler;
use super::defaults::DefaultPolicy;
use super::normalize::{normalize_date, normalize_total};
use super::parser::LenientJsonParser;
use super::prompt::PromptTemplate;
use super::FieldParser;
use crate::error::{ExtractionError, NoStructureFound};
use crate::llm::TextGenerator;
use crate::models::config::ExtractionConfig;
use crate::models::expense::{
    CandidateRecord, ExpenseType, NormalizedExpense, DATE_KEY, EXPENSE_NAME_KEY, EXPENSE_TYPE_KEY,
    TOTAL_KEY,
};

/// Receipt extraction pipeline.
///
/// Prompts the generator with the OCR text, recovers fields from the reply,
/// reconciles the category and fills every gap from the [`DefaultPolicy`].
/// The only error a caller ever sees is
/// [`ExtractionError::UpstreamUnavailable`].
#[derive(Debug, Clone)]
pub struct ReceiptExtractor<G, P = LenientJsonParser> {
    generator: G,
    parser: P,
    template: PromptTemplate,
    reconciler: CategoryReconciler,
    defaults: DefaultPolicy,
    day_first: bool,
}

impl<G: TextGenerator> ReceiptExtractor<G> {
    /// Create an extractor with the default template, parser and policies.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            parser: LenientJsonParser::new(),
            template: PromptTemplate::default(),
            reconciler: CategoryReconciler::new(),
            defaults: DefaultPolicy::new(),
            day_first: false,
        }
    }

    /// Create an extractor tuned by the extraction configuration.
    pub fn from_config(generator: G, config: &ExtractionConfig) -> Self {
        Self::new(generator)
            .with_reconciler(CategoryReconciler::new().with_threshold(config.similarity_threshold))
            .with_day_first(config.day_first)
    }
}

impl<G, P> ReceiptExtractor<G, P> {
    /// Swap the field parser.
    pub fn with_parser<Q: FieldParser>(self, parser: Q) -> ReceiptExtractor<G, Q> {
        ReceiptExtractor {
            generator: self.generator,
            parser,
            template: self.template,
            reconciler: self.reconciler,
            defaults: self.defaults,
            day_first: self.day_first,
        }
    }

    /// Replace the instruction template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replace the category reconciler.
    pub fn with_reconciler(mut self, reconciler: CategoryReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Replace the defaulting policy.
    pub fn with_defaults(mut self, defaults: DefaultPolicy) -> Self {
        self.defaults = defaults;
        self
    }

    /// Read ambiguous slash dates day-first.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}

impl<G: TextGenerator, P: FieldParser> ReceiptExtractor<G, P> {
    /// Extract a normalized expense from OCR text.
    pub async fn extract(&self, ocr_text: &str) -> Result<NormalizedExpense, ExtractionError> {
        let start = Instant::now();
        info!("Extracting expense from {} characters of OCR text", ocr_text.len());

        let prompt = self.template.render(ocr_text);
        debug!(prompt_chars = prompt.len(), "Built extraction prompt");

        let generated = self.generator.generate(&prompt).await?;
        debug!(generated = %generated, "Received generated text");

        let expense = self.normalize(&generated);
        info!(
            expense_type = %expense.expense_type,
            date = %expense.date,
            total = %expense.total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extracted expense"
        );

        Ok(expense)
    }

    /// Turn generated text into a normalized expense. Never fails.
    pub fn normalize(&self, generated: &str) -> NormalizedExpense {
        let candidate = match self.parser.parse(generated) {
            Ok(mut record) => {
                debug!(?record, "Parsed candidate record");
                let category = self
                    .reconciler
                    .reconcile(record.get(EXPENSE_TYPE_KEY).map(String::as_str));
                record.insert(EXPENSE_TYPE_KEY.to_string(), category.as_str().to_string());
                record
            }
            Err(NoStructureFound) => {
                warn!("No structured block in generated text, using defaults");
                CandidateRecord::new()
            }
        };

        self.build(&candidate)
    }

    fn build(&self, candidate: &CandidateRecord) -> NormalizedExpense {
        let expense_type = candidate
            .get(EXPENSE_TYPE_KEY)
            .and_then(|v| ExpenseType::from_label(v))
            .unwrap_or_else(|| self.defaults.expense_type());

        let date = candidate
            .get(DATE_KEY)
            .and_then(|v| {
                let parsed = normalize_date(v, self.day_first);
                if parsed.is_none() {
                    debug!(raw = %v, "Unusable date, using default");
                }
                parsed
            })
            .unwrap_or_else(|| self.defaults.date());

        let total = candidate
            .get(TOTAL_KEY)
            .and_then(|v| {
                let parsed = normalize_total(v);
                if parsed.is_none() {
                    debug!(raw = %v, "Unusable total, using default");
                }
                parsed
            })
            .unwrap_or_else(|| self.defaults.total());

        let expense_name = candidate
            .get(EXPENSE_NAME_KEY)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.defaults.expense_name());

        NormalizedExpense {
            expense_type,
            date,
            total,
            expense_name,
        }
    }
}
