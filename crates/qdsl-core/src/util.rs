//! Small helpers shared across the validator and the path resolver.

/// Levenshtein edit distance between two strings, case-insensitive.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut row: Vec<usize> = (0..=m).collect();
    for i in 1..=n {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=m {
            let tmp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = tmp;
        }
    }
    row[m]
}

/// The closest candidate to `target` within `max_distance`, or `None` if
/// nothing qualifies. Ties are broken by the order `candidates` is given.
pub fn closest_match<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|c| (c, edit_distance(target, c)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_identical() {
        assert_eq!(edit_distance("eq", "eq"), 0);
    }

    #[test]
    fn test_edit_distance_one_substitution() {
        assert_eq!(edit_distance("equals", "equals"), 0);
        assert_eq!(edit_distance("eq", "eo"), 1);
    }

    #[test]
    fn test_closest_match_finds_within_threshold() {
        let candidates = ["eq", "neq", "gt", "gte", "in"];
        assert_eq!(closest_match("eqq", candidates, 2), Some("eq"));
    }

    #[test]
    fn test_closest_match_respects_threshold() {
        let candidates = ["fts", "fts_phrase"];
        assert_eq!(closest_match("equals", candidates, 2), None);
    }
}
