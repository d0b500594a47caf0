/// Scores `text` against `query`; `None` when the query characters do not all appear in order.
///
/// - empty query matches everything with score 0
/// - exact match scores highest, then prefix, then substring
/// - otherwise characters matched in order, with bonuses for consecutive runs,
///   early positions and matches right after a separator (` `, `_`, `-`, `/`)
///
/// `/` counts as a word boundary because the candidates are folder paths: `nb`
/// should favour `notes/backlog` over `notesbook`.
pub fn fuzzy_match(text: &str, query: &str) -> Option<i32> {
    if query.is_empty() {
        return Some(0);
    }
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    if text_lower == query_lower {
        return Some(1000);
    }

    if text_lower.starts_with(&query_lower) {
        return Some(900 + (100 - text.chars().count() as i32).max(0));
    }

    if let Some(pos) = text_lower.find(&query_lower) {
        let char_pos = text_lower[..pos].chars().count() as i32;
        return Some(500 + (50 - char_pos).max(0));
    }

    let text_chars: Vec<char> = text_lower.chars().collect();
    let query_chars: Vec<char> = query_lower.chars().collect();
    let mut text_idx = 0;
    let mut query_idx = 0;
    let mut score: i32 = 0;
    let mut prev_matched = false;
    let mut consecutive_bonus = 0;

    while text_idx < text_chars.len() && query_idx < query_chars.len() {
        if text_chars[text_idx] == query_chars[query_idx] {
            score += (100 - text_idx as i32).max(1);
            if prev_matched {
                consecutive_bonus += 20;
            }
            if text_idx == 0 || matches!(text_chars[text_idx - 1], ' ' | '_' | '-' | '/') {
                score += 30;
            }
            prev_matched = true;
            query_idx += 1;
        } else {
            prev_matched = false;
        }
        text_idx += 1;
    }

    (query_idx == query_chars.len()).then_some(score + consecutive_bonus)
}

/// Indices of `items` matching `query`, best score first; equal scores keep their input order.
pub fn rank<'a, I>(items: I, query: &str) -> Vec<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, i32)> = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, text)| fuzzy_match(text, query).map(|score| (idx, score)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(idx, _)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(fuzzy_match("anything", ""), Some(0));
    }

    #[test]
    fn exact_beats_prefix_beats_substring() {
        let exact = fuzzy_match("Projects", "projects").unwrap();
        let prefix = fuzzy_match("Projects/alpha", "projects").unwrap();
        let substring = fuzzy_match("archive/projects", "projects").unwrap();
        assert!(exact > prefix);
        assert!(prefix > substring);
    }

    #[test]
    fn scattered_characters_match_in_order() {
        assert!(fuzzy_match("projects/alpha", "pja").is_some());
        assert!(fuzzy_match("projects/alpha", "ajp").is_none());
    }

    #[test]
    fn path_separator_starts_a_word() {
        let nested = fuzzy_match("notes/backlog", "nb").unwrap();
        let flat = fuzzy_match("notesbook", "nb").unwrap();
        assert!(nested > flat);
    }

    #[test]
    fn rank_is_stable_for_ties() {
        let items = ["b/x", "a/x", "c/y"];
        assert_eq!(rank(items.iter().copied(), ""), vec![0, 1, 2]);
        assert_eq!(rank(items.iter().copied(), "y"), vec![2]);
    }
}
