//! Jaro-Winkler string similarity used to rank search results.
//!
//! [`similarity`] returns a score in `[0, 1]` where `1` means identical.
//! Comparison is case-sensitive; callers normalize case before scoring.
//!
//! # Example
//!
//! ```
//! use clowds_core::similarity::similarity;
//!
//! assert!((similarity("martha", "martha") - 1.0).abs() < f64::EPSILON);
//! assert!(similarity("martha", "marhta") > 0.95);
//! assert_eq!(similarity("", "martha"), 0.0);
//! ```

/// Maximum number of leading characters that earn the Winkler prefix bonus.
const MAX_PREFIX: usize = 4;

/// Weight applied per matching prefix character.
const PREFIX_SCALE: f64 = 0.1;

/// Computes the Jaro-Winkler similarity of two strings.
///
/// Strings are compared as sequences of Unicode scalar values. The matching
/// window is `floor(max_len / 2) - 1`; for single-character inputs that
/// window is negative and no characters can match.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let jaro = jaro(&a, &b);
    if jaro == 0.0 {
        return 0.0;
    }

    let prefix = a
        .iter()
        .zip(b.iter())
        .take(MAX_PREFIX)
        .take_while(|(left, right)| left == right)
        .count();

    #[allow(clippy::cast_precision_loss)]
    let boost = PREFIX_SCALE * prefix as f64 * (1.0 - jaro);
    jaro + boost
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn jaro(a: &[char], b: &[char]) -> f64 {
    let window = (a.len().max(b.len()) / 2) as isize - 1;

    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ch) in a.iter().enumerate() {
        let i = i as isize;
        let start = (i - window).max(0);
        let end = (i + window + 1).min(b.len() as isize);
        if start >= end {
            continue;
        }

        #[allow(clippy::cast_sign_loss)]
        for j in start as usize..end as usize {
            if b_matched[j] || b[j] != *ch {
                continue;
            }
            a_matched[i as usize] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Walk matched characters of both sides in order; each mismatch is half a transposition.
    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, ch) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ch != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-3
    }

    #[test]
    fn test_identical_strings_score_one() {
        for s in ["a", "blinding lights", "the weeknd", "日本語"] {
            assert!(approx(similarity(s, s), 1.0), "{s} should score 1");
        }
    }

    #[test]
    fn test_empty_string_scores_zero() {
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_both_empty_are_equal() {
        assert!(approx(similarity("", ""), 1.0));
    }

    #[test]
    fn test_classic_martha_marhta() {
        // Jaro 0.944, prefix "mar" -> 0.961
        assert!(approx(similarity("martha", "marhta"), 0.961));
    }

    #[test]
    fn test_classic_dwayne_duane() {
        // Jaro 0.822, prefix "d" -> 0.840
        assert!(approx(similarity("dwayne", "duane"), 0.840));
    }

    #[test]
    fn test_classic_dixon_dicksonx() {
        // Jaro 0.767, prefix "di" -> 0.813
        assert!(approx(similarity("dixon", "dicksonx"), 0.813));
    }

    #[test]
    fn test_no_common_characters_scores_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_single_character_mismatch_has_no_window() {
        assert_eq!(similarity("a", "b"), 0.0);
        // Window is zero for length two, so only aligned characters can match.
        assert_eq!(similarity("ab", "ba"), 0.0);
    }

    #[test]
    fn test_is_symmetric() {
        let pairs = [
            ("blinding lights", "blinding light"),
            ("the weeknd", "weeknd"),
            ("crate", "trace"),
            ("dixon", "dicksonx"),
        ];
        for (a, b) in pairs {
            assert!(
                (similarity(a, b) - similarity(b, a)).abs() < f64::EPSILON,
                "{a} / {b} not symmetric"
            );
        }
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let words = ["", "a", "ab", "abc", "abcd", "dcba", "aaaa", "abab", "zyx"];
        for a in words {
            for b in words {
                let score = similarity(a, b);
                assert!((0.0..=1.0).contains(&score), "{a}/{b} -> {score}");
            }
        }
    }

    #[test]
    fn test_case_is_significant() {
        assert!(similarity("Weeknd", "weeknd") < 1.0);
    }
}
