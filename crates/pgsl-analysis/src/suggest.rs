// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean suggestions for undefined names.

/// Compute edit distance (Levenshtein) between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b.chars().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// The closest candidate to `name`, if any is close enough.
pub(crate) fn closest<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.len() {
        0..=2 => 1,
        3..=5 => 2,
        _ => 3,
    };

    candidates
        .into_iter()
        .filter(|c| *c != name && name.len().abs_diff(c.len()) <= max_distance)
        .map(|c| (c, edit_distance(name, c)))
        .filter(|&(_, d)| d <= max_distance)
        .min_by_key(|&(c, d)| (d, c))
        .map(|(c, _)| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_close_names() {
        let names = ["counter", "count", "color"];
        assert_eq!(closest("conter", names), Some("counter".to_string()));
        assert_eq!(closest("cout", names), Some("count".to_string()));
        assert_eq!(closest("velocity", names), None);
    }
}
