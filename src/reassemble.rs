//! Fragment reassembly.
//!
//! The generator also splits words apart ("twen ty one", "spe ed"). This
//! stage rejoins the pieces using the selective-merge strategy: any token
//! of 3 characters or fewer that contains no digit is treated as a split
//! fragment and glued onto a neighboring alphabetic token. Purely numeric
//! tokens never participate in a merge in either direction - a bare digit
//! run is a value, never a word fragment.
//!
//! Letter runs are re-folded after merging because joining fragments can
//! butt two identical letters up against an existing pair.

use crate::normalize::fold_letter_runs;

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Rejoin split word fragments in normalized text.
///
/// A fully-digit challenge passes through unchanged.
pub fn reassemble(normalized: &str) -> String {
    let mut merged: Vec<String> = Vec::new();
    // Fragments with no previous alphabetic token to attach to are held
    // and prefixed onto the next token instead.
    let mut pending = String::new();

    for token in normalized.split_whitespace() {
        if is_numeric(token) {
            if !pending.is_empty() {
                merged.push(std::mem::take(&mut pending));
            }
            merged.push(token.to_string());
            continue;
        }

        let fragment = token.len() <= 3 && !token.chars().any(|c| c.is_ascii_digit());
        if fragment {
            if pending.is_empty() {
                if let Some(last) = merged.last_mut() {
                    if !is_numeric(last) {
                        last.push_str(token);
                        continue;
                    }
                }
            }
            pending.push_str(token);
            continue;
        }

        if pending.is_empty() {
            merged.push(token.to_string());
        } else {
            pending.push_str(token);
            merged.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        merged.push(pending);
    }

    fold_letter_runs(&merged.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_fragments_merge_into_previous() {
        assert_eq!(reassemble("twen ty one"), "twentyone");
    }

    #[test]
    fn test_leading_fragment_attaches_forward() {
        assert_eq!(reassemble("the balloon drifts"), "theballoon drifts");
    }

    #[test]
    fn test_long_tokens_left_alone() {
        assert_eq!(reassemble("train travels sixty miles"), "train travels sixty miles");
    }

    #[test]
    fn test_numeric_tokens_never_merge() {
        assert_eq!(reassemble("weighs 20 kg and 5 more"), "weighs 20 kgand 5 more");
    }

    #[test]
    fn test_digits_only_passthrough() {
        assert_eq!(reassemble("12 7 1999"), "12 7 1999");
    }

    #[test]
    fn test_refold_after_merge() {
        // "fall" + "ls" butts three l's together; the fold undoes it
        assert_eq!(reassemble("fall ls"), "falls");
    }

    #[test]
    fn test_empty() {
        assert_eq!(reassemble(""), "");
    }
}
