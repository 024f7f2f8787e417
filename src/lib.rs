//! Verimath - Verification Challenge Solver
//!
//! Decodes deliberately garbled arithmetic word problems (the anti-bot
//! "math CAPTCHA" used by the forum's verification gate) into a fixed
//! precision numeric answer.
//!
//! Pipeline: normalize -> reassemble -> extract numbers/operation -> compute.
//! The deterministic path is a pure function; an optional model-assisted
//! extractor can be injected as a fallback for challenges the word tables
//! cannot crack.

pub mod calculate;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod normalize;
pub mod reassemble;
pub mod solver;

pub use config::SolverConfig;
pub use error::SolveError;
pub use extract::OperationTag;
pub use llm::{
    ChallengeModel, FakeChallengeModel, HttpChallengeModel, LlmBackend, LlmConfig, LlmError,
    ModelExtraction,
};
pub use solver::{ChallengeText, DeterministicExtractor, ExtractionStrategy, ModelExtractor, Solver};
