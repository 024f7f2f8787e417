//! The challenge-solving pipeline.
//!
//! Straight-line flow: normalize -> reassemble -> extract -> compute ->
//! format. Extraction is an injectable strategy with two
//! implementations: the deterministic word-table extractor (primary) and
//! a model-assisted extractor that hands the normalized text to an LLM
//! constrained to a strict number-pair-plus-operation schema. When both
//! are configured, the model path runs once as a fallback after the
//! deterministic path reports too few numbers; there are no retries or
//! loops inside the solver.
//!
//! The non-model path is a pure function: same challenge, same answer.

use crate::calculate;
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::extract::{self, Extraction};
use crate::llm::{ChallengeModel, HttpChallengeModel, LlmError, ModelExtraction};
use crate::normalize::normalize;
use crate::reassemble::reassemble;

/// The three views of one challenge the pipeline works from.
#[derive(Debug, Clone)]
pub struct ChallengeText {
    pub raw: String,
    pub normalized: String,
    pub reassembled: String,
}

impl ChallengeText {
    pub fn prepare(raw: &str) -> Self {
        let normalized = normalize(raw);
        let reassembled = reassemble(&normalized);
        Self {
            raw: raw.to_string(),
            normalized,
            reassembled,
        }
    }
}

/// Pluggable extraction seam
pub trait ExtractionStrategy: Send + Sync {
    fn extract(&self, text: &ChallengeText) -> Result<Extraction, SolveError>;
}

/// Word-table and cue-based extraction, no network involved.
pub struct DeterministicExtractor;

impl ExtractionStrategy for DeterministicExtractor {
    fn extract(&self, text: &ChallengeText) -> Result<Extraction, SolveError> {
        extract::extract(&text.raw, &text.normalized, &text.reassembled)
    }
}

/// Model-assisted extraction over the normalized challenge text.
///
/// The backend returns a typed extraction; this wrapper enforces the
/// semantic contract (at least two finite operands) and maps shape
/// rejections to `InvalidModelOutput`. Nothing is retried here.
pub struct ModelExtractor {
    model: Box<dyn ChallengeModel>,
}

impl ModelExtractor {
    pub fn new(model: Box<dyn ChallengeModel>) -> Self {
        Self { model }
    }

    fn validate(extraction: ModelExtraction) -> Result<Extraction, SolveError> {
        if extraction.numbers.len() < 2 {
            return Err(SolveError::InvalidModelOutput {
                reason: format!("expected at least 2 numbers, got {}", extraction.numbers.len()),
            });
        }
        if extraction.numbers.iter().any(|n| !n.is_finite()) {
            return Err(SolveError::InvalidModelOutput {
                reason: "non-finite number in payload".to_string(),
            });
        }

        Ok(Extraction {
            numbers: extraction.numbers,
            operation: extraction.operation,
        })
    }
}

impl ExtractionStrategy for ModelExtractor {
    fn extract(&self, text: &ChallengeText) -> Result<Extraction, SolveError> {
        match self.model.extract_operands(&text.normalized) {
            Ok(extraction) => Self::validate(extraction),
            Err(LlmError::InvalidJson(reason)) => Err(SolveError::InvalidModelOutput { reason }),
            Err(err) => Err(SolveError::Llm(err)),
        }
    }
}

/// One-shot challenge solver.
///
/// Stateless across invocations; independent solves can run in parallel.
pub struct Solver {
    primary: Box<dyn ExtractionStrategy>,
    fallback: Option<Box<dyn ExtractionStrategy>>,
}

impl Solver {
    /// Deterministic extraction only.
    pub fn deterministic() -> Self {
        Self {
            primary: Box::new(DeterministicExtractor),
            fallback: None,
        }
    }

    /// Deterministic extraction with a one-shot model fallback.
    pub fn with_model_fallback(model: Box<dyn ChallengeModel>) -> Self {
        Self {
            primary: Box::new(DeterministicExtractor),
            fallback: Some(Box::new(ModelExtractor::new(model))),
        }
    }

    /// Wire a solver from configuration: deterministic only by default,
    /// with an HTTP model fallback when `model_fallback` is set.
    pub fn from_config(config: &SolverConfig) -> anyhow::Result<Self> {
        if config.model_fallback {
            let model = HttpChallengeModel::new(config.llm.clone())?;
            Ok(Self::with_model_fallback(Box::new(model)))
        } else {
            Ok(Self::deterministic())
        }
    }

    /// Explicit strategy wiring, mostly for tests.
    pub fn new(
        primary: Box<dyn ExtractionStrategy>,
        fallback: Option<Box<dyn ExtractionStrategy>>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Solve one challenge into a two-decimal answer string.
    pub fn solve(&self, challenge: &str) -> Result<String, SolveError> {
        let text = ChallengeText::prepare(challenge);
        tracing::debug!(
            normalized = %text.normalized,
            reassembled = %text.reassembled,
            "challenge prepared"
        );

        let extraction = match self.primary.extract(&text) {
            Ok(extraction) => extraction,
            Err(err @ SolveError::InsufficientNumbers { .. }) => match &self.fallback {
                Some(fallback) => {
                    tracing::debug!("deterministic extraction failed ({}), trying model path", err);
                    fallback.extract(&text)?
                }
                None => return Err(err),
            },
            Err(err) => return Err(err),
        };

        let value = calculate::compute(&extraction, &text.raw)?;
        let answer = calculate::format_answer(value);
        tracing::debug!(operation = extraction.operation.as_str(), %answer, "challenge solved");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::OperationTag;
    use crate::llm::FakeChallengeModel;

    fn model_answer(numbers: Vec<f64>, operation: OperationTag) -> ModelExtraction {
        ModelExtraction { numbers, operation }
    }

    #[test]
    fn test_deterministic_solve() {
        let solver = Solver::deterministic();
        assert_eq!(solver.solve("add twenty and fivve").unwrap(), "25.00");
    }

    #[test]
    fn test_deterministic_path_is_pure() {
        let solver = Solver::deterministic();
        let challenge = "the BALL weighs tWenTy Kilos aNd ANother weighs fiVVVe kilos what is the total";
        let first = solver.solve(challenge).unwrap();
        for _ in 0..5 {
            assert_eq!(solver.solve(challenge).unwrap(), first);
        }
    }

    #[test]
    fn test_fallback_not_consulted_when_deterministic_succeeds() {
        let model = FakeChallengeModel::always(model_answer(vec![1.0, 1.0], OperationTag::Add));
        let solver = Solver::new(
            Box::new(DeterministicExtractor),
            Some(Box::new(ModelExtractor::new(Box::new(model)))),
        );
        assert_eq!(solver.solve("twenty and fivve").unwrap(), "25.00");
    }

    #[test]
    fn test_model_fallback_rescues_sparse_challenge() {
        let model = FakeChallengeModel::always(model_answer(vec![7.0, 3.0], OperationTag::Multiply));
        let solver = Solver::with_model_fallback(Box::new(model));
        // No word-table hit, a single literal digit: deterministic fails
        assert_eq!(solver.solve("sevn things taken 3 times").unwrap(), "21.00");
    }

    #[test]
    fn test_too_few_model_operands_rejected() {
        let model = FakeChallengeModel::always(model_answer(vec![7.0], OperationTag::Add));
        let solver = Solver::with_model_fallback(Box::new(model));
        match solver.solve("nothing numeric here at all") {
            Err(SolveError::InvalidModelOutput { .. }) => {}
            other => panic!("expected InvalidModelOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_model_shape_rejection_maps_to_invalid_output() {
        let model = FakeChallengeModel::always_error(LlmError::InvalidJson(
            "unknown variant `modulo`".to_string(),
        ));
        let solver = Solver::with_model_fallback(Box::new(model));
        match solver.solve("nothing numeric here at all") {
            Err(SolveError::InvalidModelOutput { reason }) => {
                assert!(reason.contains("modulo"));
            }
            other => panic!("expected InvalidModelOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_model_operands_rejected() {
        let err = ModelExtractor::validate(model_answer(vec![4.0, f64::NAN], OperationTag::Add))
            .expect_err("non-finite operands must be rejected");
        assert!(matches!(err, SolveError::InvalidModelOutput { .. }));
    }

    #[test]
    fn test_model_transport_error_surfaces() {
        let model = FakeChallengeModel::always_error(LlmError::Timeout(30));
        let solver = Solver::with_model_fallback(Box::new(model));
        match solver.solve("nothing numeric here at all") {
            Err(SolveError::Llm(LlmError::Timeout(30))) => {}
            other => panic!("expected Llm timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_from_config_default_is_deterministic() {
        let solver = Solver::from_config(&SolverConfig::default()).expect("wire solver");
        assert_eq!(solver.solve("twenty and fivve").unwrap(), "25.00");
    }

    #[test]
    fn test_from_config_wires_model_fallback() {
        let mut config = SolverConfig::default();
        config.model_fallback = true;
        let solver = Solver::from_config(&config).expect("wire solver with fallback");
        // Deterministic extraction succeeds, so the HTTP model is never contacted
        assert_eq!(solver.solve("twenty and fivve").unwrap(), "25.00");
    }
}
