//! Numeric and operation extraction.
//!
//! Turns reassembled challenge text into an ordered operand list and an
//! arithmetic operation. Number words are mapped through an explicit
//! ordered pattern table (most specific first - the ordering is the
//! priority system, so it is a list, never a map): two-digit compounds,
//! then tens, then teens, then the small words. Every pattern tolerates
//! one doubled copy of each letter, matching what survives the
//! normalizer's letter fold ("fivve", "twelvve").
//!
//! Operation inference scans the raw, normalized and reassembled text
//! together for cue families in a fixed priority order; the first family
//! that fires wins. The priority is empirical: "total" language is the
//! most common and most ambiguous cue, so subtraction and the
//! double/triple multipliers are checked before generic multiply and
//! divide, and the additive default catches everything else.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SolveError;

/// Inferred arithmetic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationTag {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl OperationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationTag::Add => "add",
            OperationTag::Subtract => "subtract",
            OperationTag::Multiply => "multiply",
            OperationTag::Divide => "divide",
        }
    }
}

/// Ordered operand list plus the operation to apply
#[derive(Debug, Clone)]
pub struct Extraction {
    pub numbers: Vec<f64>,
    pub operation: OperationTag,
}

/// Expand a word into a pattern tolerating one doubled copy of each letter.
///
/// "five" -> "f{1,2}i{1,2}v{1,2}e{1,2}", which matches both "five" and the
/// post-fold residue "fivve". Non-letter characters pass through untouched.
fn tolerant(word: &str) -> String {
    let mut pat = String::with_capacity(word.len() * 6);
    for c in word.chars() {
        if c.is_ascii_lowercase() {
            pat.push(c);
            pat.push_str("{1,2}");
        } else {
            pat.push(c);
        }
    }
    pat
}

/// Pattern alternation over a word's accepted spellings.
fn spellings(variants: &[&str]) -> String {
    let alts: Vec<String> = variants.iter().map(|v| tolerant(v)).collect();
    format!("(?:{})", alts.join("|"))
}

const TENS: &[(&[&str], i64)] = &[
    (&["twenty"], 20),
    (&["thirty"], 30),
    (&["forty", "fourty"], 40),
    (&["fifty"], 50),
    (&["sixty"], 60),
    (&["seventy"], 70),
    (&["eighty"], 80),
    (&["ninety"], 90),
];

const ONES_FOR_COMPOUNDS: &[(&[&str], i64)] = &[
    (&["one"], 1),
    (&["two"], 2),
    (&["three"], 3),
    (&["four"], 4),
    (&["five"], 5),
    (&["six"], 6),
    (&["seven"], 7),
    (&["eight"], 8),
    (&["nine"], 9),
];

const TEENS: &[(&[&str], i64)] = &[
    (&["eleven"], 11),
    (&["twelve", "twelv"], 12),
    (&["thirteen", "thirten"], 13),
    (&["fourteen", "forteen"], 14),
    (&["fifteen", "fiften"], 15),
    (&["sixteen", "sixten"], 16),
    (&["seventeen", "seventen"], 17),
    (&["eighteen", "eighten"], 18),
    (&["nineteen", "ninteen"], 19),
];

// Standalone "one" is deliberately absent: it fires on ordinary prose
// ("only one number") far more often than it names an operand, and is
// still recognized inside compounds. "zero" is present so spelled-out
// zero divisors reach the division-by-zero check.
const SMALL: &[(&[&str], i64)] = &[
    (&["ten"], 10),
    (&["zero"], 0),
    (&["two"], 2),
    (&["three"], 3),
    (&["four"], 4),
    (&["five"], 5),
    (&["six"], 6),
    (&["seven"], 7),
    (&["eight"], 8),
    (&["nine"], 9),
];

/// Number-word table, most specific patterns first.
static WORD_TABLE: Lazy<Vec<(Regex, i64)>> = Lazy::new(|| {
    let mut table = Vec::new();

    // Two-digit compounds: tens word immediately followed by a ones word
    // ("twentyone" .. "ninetynine"), the shape fragment merging produces.
    for (tens_words, tens_value) in TENS {
        for (ones_words, ones_value) in ONES_FOR_COMPOUNDS {
            let pat = format!("{}{}", spellings(tens_words), spellings(ones_words));
            table.push((Regex::new(&pat).expect("compound pattern"), tens_value + ones_value));
        }
    }
    for (words, value) in TENS {
        table.push((Regex::new(&spellings(words)).expect("tens pattern"), *value));
    }
    for (words, value) in TEENS {
        table.push((Regex::new(&spellings(words)).expect("teens pattern"), *value));
    }
    for (words, value) in SMALL {
        table.push((Regex::new(&spellings(words)).expect("small pattern"), *value));
    }
    table
});

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("digit pattern"));

/// Collect every number-word match in text order.
///
/// Each match is masked out with spaces (same length, so positions stay
/// stable) before the later, less specific patterns run - a span already
/// converted can never be converted twice, and digit literals in the
/// text never match a letter pattern, so the pass is idempotent. Only
/// values that actually came from a word substitution are returned;
/// literal digits are the raw-text scan's business.
pub(crate) fn word_number_values(text: &str) -> Vec<f64> {
    let mut masked = text.to_string();
    let mut found: Vec<(usize, i64)> = Vec::new();

    for (pattern, value) in WORD_TABLE.iter() {
        while let Some((start, end)) = pattern.find(&masked).map(|m| (m.start(), m.end())) {
            found.push((start, *value));
            masked.replace_range(start..end, &" ".repeat(end - start));
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, value)| value as f64).collect()
}

/// Scan text left to right for digit runs with an optional decimal point.
pub(crate) fn scan_numbers(text: &str) -> Vec<f64> {
    DIGIT_RUN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

fn union_dedup(primary: Vec<f64>, supplement: Vec<f64>) -> Vec<f64> {
    let mut out = primary;
    for v in supplement {
        if !out.iter().any(|have| have.to_bits() == v.to_bits()) {
            out.push(v);
        }
    }
    out
}

fn cue_regex(words: &[&str]) -> Regex {
    Regex::new(&spellings(words)).expect("cue pattern")
}

static SUBTRACT_CUES: Lazy<Regex> = Lazy::new(|| {
    cue_regex(&["slow", "lose", "loses", "decrease", "subtract", "minus", "less", "fewer", "reduc"])
});
static RESULT_CUES: Lazy<Regex> = Lazy::new(|| cue_regex(&["new", "result", "final", "what"]));
static TRIPLE_CUE: Lazy<Regex> = Lazy::new(|| cue_regex(&["triple"]));
static DOUBLE_CUE: Lazy<Regex> = Lazy::new(|| cue_regex(&["double"]));
static MULTIPLY_CUE: Lazy<Regex> = Lazy::new(|| cue_regex(&["multipl"]));
static RATE_CUES: Lazy<Regex> = Lazy::new(|| cue_regex(&["per", "each", "times"]));
static TOTAL_CUES: Lazy<Regex> = Lazy::new(|| cue_regex(&["total", "how much"]));
static DIVIDE_CUES: Lazy<Regex> = Lazy::new(|| cue_regex(&["divide", "split", "ratio"]));

/// Operation plus the operand rewrite the double/triple cues demand.
struct InferredOp {
    tag: OperationTag,
    factor: Option<f64>,
}

/// Infer the operation from cue families in fixed priority order.
///
/// First match wins. Challenges where several families fire are logged
/// for tuning; the priority order is a best-effort heuristic, not a
/// parser.
fn infer_operation(combined: &str, challenge: &str) -> InferredOp {
    let subtract = SUBTRACT_CUES.is_match(combined) && RESULT_CUES.is_match(combined);
    let triple = TRIPLE_CUE.is_match(combined);
    let double = DOUBLE_CUE.is_match(combined);
    let total = TOTAL_CUES.is_match(combined);
    let multiply =
        MULTIPLY_CUE.is_match(combined) || (RATE_CUES.is_match(combined) && total);
    let divide = DIVIDE_CUES.is_match(combined) && !total;

    let fired = [subtract, triple, double, multiply, divide]
        .iter()
        .filter(|f| **f)
        .count();
    if fired > 1 {
        tracing::warn!(
            challenge,
            "multiple operation cue families fired, keeping highest priority"
        );
    }

    if subtract {
        InferredOp { tag: OperationTag::Subtract, factor: None }
    } else if triple {
        InferredOp { tag: OperationTag::Multiply, factor: Some(3.0) }
    } else if double {
        InferredOp { tag: OperationTag::Multiply, factor: Some(2.0) }
    } else if multiply {
        InferredOp { tag: OperationTag::Multiply, factor: None }
    } else if divide {
        InferredOp { tag: OperationTag::Divide, factor: None }
    } else {
        InferredOp { tag: OperationTag::Add, factor: None }
    }
}

/// Extract the operand list and operation for one challenge.
///
/// Strictly word-derived values are preferred when the table yields at
/// least two; otherwise the deduplicated union with literal digits from
/// the raw text is taken. The literal scan runs on the raw challenge,
/// the least processed form, because normalization turns a decimal
/// point into a space - "2.5" must stay one operand, not become two.
/// Fewer than two operands is a hard failure, except for double/triple
/// which only need the first.
pub fn extract(raw: &str, normalized: &str, reassembled: &str) -> Result<Extraction, SolveError> {
    let word_values = word_number_values(reassembled);
    let literal_values = scan_numbers(raw);

    let mut numbers = if word_values.len() >= 2 {
        word_values
    } else {
        union_dedup(word_values, literal_values)
    };

    let combined = format!("{} {} {}", raw.to_ascii_lowercase(), normalized, reassembled);
    let inferred = infer_operation(&combined, raw);

    match inferred.factor {
        Some(factor) => {
            let first = match numbers.first() {
                Some(n) => *n,
                None => {
                    return Err(SolveError::InsufficientNumbers {
                        challenge: raw.to_string(),
                        found: 0,
                    })
                }
            };
            numbers = vec![first, factor];
        }
        None => {
            if numbers.len() < 2 {
                return Err(SolveError::InsufficientNumbers {
                    challenge: raw.to_string(),
                    found: numbers.len(),
                });
            }
        }
    }

    tracing::debug!(
        operation = inferred.tag.as_str(),
        count = numbers.len(),
        "extraction complete"
    );
    Ok(Extraction { numbers, operation: inferred.tag })
}
