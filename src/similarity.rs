//! Sequence similarity for fuzzy place-name matching
//!
//! Implements the Ratcliff/Obershelp "gestalt" ratio: find the longest common
//! block, recurse on the pieces either side of it, and score `2*M / T` where
//! `M` is the number of matched characters and `T` the combined length.
//! Works on `char`s so Chinese place names compare per character, not per byte.

/// Default minimum ratio a candidate needs to be accepted
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Similarity ratio in [0, 1]. Two empty strings are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Returns the candidate most similar to `input`, if its ratio is at least `cutoff`.
///
/// Ties go to the candidate that appears first.
///
/// # Arguments
/// * `input` - Name to look up, e.g. a fishing spot
/// * `candidates` - Names to compare against, in preference order for ties
/// * `cutoff` - Minimum similarity ratio (0.0 to 1.0) a candidate must reach
///
/// # Returns
/// * `Some((candidate, ratio))` for the best candidate at or above `cutoff`
/// * `None` if no candidate reaches `cutoff` or there are none
pub fn find_best_match<'a, I>(input: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = ratio(input, candidate);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best
}

/// Total characters covered by the recursive longest-block decomposition
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        total += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    total
}

/// Longest common block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Returns `(i, j, size)`; among equally long blocks the one starting
/// earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
    // run[j + 1] = length of the common run ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b.len() + 1];

    for i in a_lo..a_hi {
        let mut current = vec![0usize; b.len() + 1];
        for j in b_lo..b_hi {
            if a[i] != b[j] {
                continue;
            }
            let k = if j > b_lo { prev[j] + 1 } else { 1 };
            current[j + 1] = k;
            if k > best_size {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_size = k;
            }
        }
        prev = current;
    }

    (best_i, best_j, best_size)
}
