//! Small text-matching helpers shared by tier classification and community
//! topic inference.

/// Case-sensitive term match bounded by non-alphanumeric characters, so
/// "mit" does not match inside "committee". Callers lowercase both sides.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(term) {
        let at = start + pos;
        let end = at + term.len();
        let left_ok = at == 0
            || !haystack[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        start = at + 1;
    }
    false
}
