//! Challenge text normalization.
//!
//! The challenge generator obfuscates its word problems with inserted
//! symbols, random casing and letter duplication ("fiVVVe"). This stage
//! undoes the character-level damage:
//! - lowercase everything
//! - replace every non-alphanumeric character with a space
//! - collapse whitespace runs, trim the ends
//! - fold runs of 3+ identical letters down to exactly 2
//!
//! Folding stops at 2 rather than 1 so legitimate doubled letters
//! ("fifteen", "ball") survive. Digits are never folded: "100" is a
//! value, not an obfuscated "10".

/// Normalize a raw challenge into lowercase `[a-z0-9 ]` text.
///
/// Idempotent; never fails, the output may be empty.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut last_was_space = true;

    for c in raw.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            cleaned.push(c);
            last_was_space = false;
        } else if !last_was_space {
            cleaned.push(' ');
            last_was_space = true;
        }
    }
    while cleaned.ends_with(' ') {
        cleaned.pop();
    }

    fold_letter_runs(&cleaned)
}

/// Fold every run of 3 or more identical consecutive letters to exactly 2.
///
/// Also used by the reassembler: joining fragments can create new
/// accidental repeats at the seams.
pub(crate) fn fold_letter_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if Some(c) == prev && c.is_ascii_lowercase() {
            run += 1;
            if run >= 3 {
                continue;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_strip_symbols() {
        assert_eq!(normalize("What?! Is 12 + 5"), "what is 12 5");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(normalize("  the   BALL \t weighs "), "the ball weighs");
    }

    #[test]
    fn test_fold_triplicated_letters() {
        assert_eq!(normalize("fiVVVe"), "fivve");
        assert_eq!(normalize("tripppppple"), "tripple");
    }

    #[test]
    fn test_doubled_letters_survive() {
        assert_eq!(normalize("fifteen balls"), "fifteen balls");
    }

    #[test]
    fn test_digits_never_folded() {
        assert_eq!(normalize("1000 and 777"), "1000 and 777");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("a##b  CCCC dd 999");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_letter_fold_invariant() {
        let out = normalize("aaaa bbbbb xxxxxxxxxy");
        for window in out.as_bytes().windows(3) {
            if window[0].is_ascii_lowercase() {
                assert!(
                    !(window[0] == window[1] && window[1] == window[2]),
                    "letter run longer than 2 in {:?}",
                    out
                );
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ???"), "");
    }
}
