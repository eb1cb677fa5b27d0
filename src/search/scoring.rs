//! Relevance scoring rules used by the matcher.
//!
//! All functions take already-normalized text and measure lengths in chars.
//! Each returns `None` when its rule does not apply, so the matcher can fall
//! through to the next one:
//! - prefix: `len(query) / len(target)`
//! - word prefix: mean of per-word prefix ratios, scaled by [`WORD_MATCH_SCALE`]
//! - subsequence: `(len(query) / len(target)) * (len(query) / span)`

/// Word matches rank strictly below a whole-string prefix match of equal ratio.
pub const WORD_MATCH_SCALE: f64 = 0.9;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Score for `target` starting with `query`.
pub(crate) fn prefix_score(query: &str, target: &str) -> Option<f64> {
    if query.is_empty() || !target.starts_with(query) {
        return None;
    }
    Some(char_len(query) as f64 / char_len(target) as f64)
}

/// Score for every query word being a prefix of a distinct target word.
///
/// With `ignore_order`, longer query words are placed first and each takes the
/// shortest unused target word it prefixes. Otherwise query words must match
/// target words left to right.
pub(crate) fn word_prefix_score<Q: AsRef<str>>(
    query_words: &[Q],
    target_words: &[&str],
    ignore_order: bool,
) -> Option<f64> {
    if query_words.is_empty() || query_words.len() > target_words.len() {
        return None;
    }

    let ratios = if ignore_order {
        unordered_word_ratios(query_words, target_words)?
    } else {
        ordered_word_ratios(query_words, target_words)?
    };

    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    Some(mean * WORD_MATCH_SCALE)
}

fn unordered_word_ratios<Q: AsRef<str>>(
    query_words: &[Q],
    target_words: &[&str],
) -> Option<Vec<f64>> {
    let mut order: Vec<usize> = (0..query_words.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(char_len(query_words[i].as_ref())));

    let mut used = vec![false; target_words.len()];
    let mut ratios = Vec::with_capacity(query_words.len());

    for qi in order {
        let query_word: &str = query_words[qi].as_ref();
        let (ti, target_len) = target_words
            .iter()
            .enumerate()
            .filter(|(ti, word)| !used[*ti] && word.starts_with(query_word))
            .map(|(ti, word)| (ti, char_len(word)))
            .min_by_key(|&(_, len)| len)?;

        used[ti] = true;
        ratios.push(char_len(query_word) as f64 / target_len as f64);
    }

    Some(ratios)
}

fn ordered_word_ratios<Q: AsRef<str>>(
    query_words: &[Q],
    target_words: &[&str],
) -> Option<Vec<f64>> {
    let mut ratios = Vec::with_capacity(query_words.len());
    let mut next = 0;

    for query_word in query_words {
        let query_word: &str = query_word.as_ref();
        let offset = target_words[next..]
            .iter()
            .position(|word| word.starts_with(query_word))?;
        let target_word = target_words[next + offset];
        ratios.push(char_len(query_word) as f64 / char_len(target_word) as f64);
        next += offset + 1;
    }

    Some(ratios)
}

/// Score for the query's chars appearing in order within the target.
///
/// Characters are taken at their first possible position. The span is the
/// inclusive distance between the first and last matched chars, so a
/// contiguous run scores the same as a prefix of equal length.
pub(crate) fn subsequence_score(query: &str, target: &str) -> Option<f64> {
    let query_len = char_len(query);
    if query_len == 0 {
        return None;
    }

    let mut wanted = query.chars().peekable();
    let mut first = None;
    let mut last = 0;
    let mut target_len = 0;

    for (i, c) in target.chars().enumerate() {
        target_len = i + 1;
        if wanted.peek() == Some(&c) {
            wanted.next();
            first.get_or_insert(i);
            last = i;
        }
    }

    if wanted.peek().is_some() {
        return None;
    }

    let span = last - first? + 1;
    Some((query_len as f64 / target_len as f64) * (query_len as f64 / span as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    fn approx(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|a| (a - expected).abs() < 1e-9)
    }

    #[rstest]
    #[case("fire", "firefox", 4.0 / 7.0)]
    #[case("f", "files", 1.0 / 5.0)]
    #[case("café", "cafés", 4.0 / 5.0)]
    fn test_prefix_score(#[case] query: &str, #[case] target: &str, #[case] expected: f64) {
        check!(approx(prefix_score(query, target), expected));
    }

    #[rstest]
    #[case("fox", "firefox")]
    #[case("", "firefox")]
    #[case("firefoxes", "firefox")]
    fn test_prefix_score_no_match(#[case] query: &str, #[case] target: &str) {
        check!(prefix_score(query, target).is_none());
    }

    #[test]
    fn test_word_prefix_unordered() {
        let score = word_prefix_score(&["code", "vis"], &["visual", "studio", "code"], true);
        check!(approx(score, 0.9 * (1.0 + 0.5) / 2.0));
    }

    #[test]
    fn test_word_prefix_ordered_rejects_swapped_words() {
        check!(word_prefix_score(&["code", "vis"], &["visual", "studio", "code"], false).is_none());
        let score = word_prefix_score(&["vis", "code"], &["visual", "studio", "code"], false);
        check!(approx(score, 0.9 * (0.5 + 1.0) / 2.0));
    }

    #[test]
    fn test_word_prefix_each_target_word_used_once() {
        check!(word_prefix_score(&["st", "s"], &["studio"], true).is_none());
        check!(word_prefix_score(&["s", "st"], &["studio", "s"], true).is_some());
    }

    #[test]
    fn test_word_prefix_longest_query_word_placed_first() {
        // "ab" is placed before "a" so both find a word
        let score = word_prefix_score(&["a", "ab"], &["abc", "ab"], true);
        check!(approx(score, 0.9 * (1.0 / 3.0 + 1.0) / 2.0));
    }

    #[test]
    fn test_word_prefix_prefers_shortest_target_word() {
        let score = word_prefix_score(&["term"], &["terminator", "term"], true);
        check!(approx(score, 0.9));
    }

    #[rstest]
    #[case("fb", "firefox browser", (2.0 / 15.0) * (2.0 / 9.0))]
    #[case("ire", "firefox", (3.0 / 7.0) * 1.0)]
    #[case("fox", "firefox", (3.0 / 7.0) * (3.0 / 7.0))]
    #[case("ffx", "firefox", (3.0 / 7.0) * (3.0 / 7.0))]
    fn test_subsequence_score(#[case] query: &str, #[case] target: &str, #[case] expected: f64) {
        check!(approx(subsequence_score(query, target), expected));
    }

    #[rstest]
    #[case("xf", "firefox")]
    #[case("ff x", "firefox")]
    #[case("", "firefox")]
    fn test_subsequence_no_match(#[case] query: &str, #[case] target: &str) {
        check!(subsequence_score(query, target).is_none());
    }
}
