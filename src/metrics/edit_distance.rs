//! Levenshtein edit distance over arbitrary sequences
//!
//! Used at character granularity for CER and at token granularity for WER.

/// Minimum number of unit-cost insertions, deletions and substitutions
/// turning `reference` into `hypothesis`.
///
/// Runs in O(m·n) time and keeps a single rolling row sized by the shorter
/// sequence, so memory stays O(min(m, n)).
pub fn edit_distance<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> usize {
    if reference == hypothesis {
        return 0;
    }
    if reference.is_empty() {
        return hypothesis.len();
    }
    if hypothesis.is_empty() {
        return reference.len();
    }

    // Distance is symmetric, so iterate over the longer side and keep the row
    // for the shorter one.
    let (long, short) = if reference.len() >= hypothesis.len() {
        (reference, hypothesis)
    } else {
        (hypothesis, reference)
    };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, long_item) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, short_item) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(long_item != short_item);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Character-level distance between two strings (Unicode scalar values)
pub fn char_distance(reference: &str, hypothesis: &str) -> usize {
    let r: Vec<char> = reference.chars().collect();
    let h: Vec<char> = hypothesis.chars().collect();
    edit_distance(&r, &h)
}
