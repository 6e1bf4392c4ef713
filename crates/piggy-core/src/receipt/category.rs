//! Mapping of free-text category guesses onto the fixed category set.

use tracing::debug;

use crate::models::expense::ExpenseType;

/// Default similarity cutoff for accepting a fuzzy match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Forces any candidate string into an [`ExpenseType`].
#[derive(Debug, Clone, Copy)]
pub struct CategoryReconciler {
    threshold: f64,
    fallback: ExpenseType,
}

impl CategoryReconciler {
    /// Create a reconciler with the default threshold and `needs` fallback.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            fallback: ExpenseType::Needs,
        }
    }

    /// Set the minimum similarity (0.0 - 1.0) for a fuzzy match.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Reconcile a candidate; `None` or an empty string yields the fallback.
    ///
    /// Exact labels are returned as-is. Otherwise the trimmed, lowercased
    /// candidate is compared to every label by normalized Levenshtein
    /// similarity and the best label is taken if it reaches the threshold.
    /// Ties go to the earlier label in [`ExpenseType::ALL`].
    pub fn reconcile(&self, candidate: Option<&str>) -> ExpenseType {
        let Some(candidate) = candidate else {
            return self.fallback;
        };

        if let Some(exact) = ExpenseType::from_label(candidate) {
            return exact;
        }

        let normalized = candidate.trim().to_lowercase();
        let (best, score) = ExpenseType::ALL
            .into_iter()
            .map(|label| (label, strsim::normalized_levenshtein(&normalized, label.as_str())))
            .fold((self.fallback, f64::MIN), |best, current| {
                if current.1 > best.1 { current } else { best }
            });

        let reconciled = if score >= self.threshold { best } else { self.fallback };
        debug!(
            candidate = %candidate,
            closest = %best,
            score,
            reconciled = %reconciled,
            "Corrected expense category"
        );
        reconciled
    }
}

impl Default for CategoryReconciler {
    fn default() -> Self {
        Self::new()
    }
}
