//! Wiki link rewriting after a file moves.

use crate::editor::{char_to_byte_index, tokens};
use crate::link;

/// Replace `remove` characters at `col` of `line` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub line: usize,
    pub col: usize,
    pub remove: usize,
    pub insert: String,
}

/// Edits that point every matching `[[target]]` at `new_target`.
///
/// `should_edit` receives the normalized link path (heading and alias cut
/// off) and decides whether the link referred to the moved file. Only the
/// path part is replaced, so `#heading` and `|alias` survive. Links inside
/// code are never touched.
pub fn wikilink_edits<F>(text: &str, new_target: &str, should_edit: F) -> Vec<TextEdit>
where
    F: Fn(&str) -> bool,
{
    let mut edits: Vec<TextEdit> = tokens::scan_document(text)
        .into_iter()
        .filter(|(_, span)| span.wiki)
        .filter_map(|(line, span)| {
            let raw_path_len = span.text.chars().take_while(|&c| c != '#').count();
            let target = link::normalize(&span.text);
            let target = target.path.trim();
            if target.is_empty() || !should_edit(target) {
                return None;
            }
            Some(TextEdit {
                line,
                col: span.text_start,
                remove: raw_path_len,
                insert: new_target.to_string(),
            })
        })
        .collect();

    // bottom-right first so earlier columns stay valid
    edits.sort_by(|a, b| (b.line, b.col).cmp(&(a.line, a.col)));
    edits
}

/// Applies edits produced by [`wikilink_edits`], keeping line endings intact.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
    for edit in edits {
        let Some(line) = lines.get_mut(edit.line) else {
            continue;
        };
        let from = char_to_byte_index(line, edit.col);
        let to = char_to_byte_index(line, edit.col + edit.remove);
        line.replace_range(from..to, &edit.insert);
    }
    lines.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(text: &str, old: &str, new: &str) -> String {
        let edits = wikilink_edits(text, new, |target| target.eq_ignore_ascii_case(old));
        apply_edits(text, &edits)
    }

    #[test]
    fn keeps_heading_and_alias() {
        let text = "[[Old]] and [[Old#Intro]] and [[Old|shown]] and [[Old#^b1|x]]\n";
        assert_eq!(
            rewrite(text, "Old", "New"),
            "[[New]] and [[New#Intro]] and [[New|shown]] and [[New#^b1|x]]\n"
        );
    }

    #[test]
    fn leaves_other_links_and_code_alone() {
        let text = "[[Older]] `[[Old]]`\n```\n[[Old]]\n```\n[old](Old.md)\n";
        assert_eq!(rewrite(text, "Old", "New"), text);
    }

    #[test]
    fn handles_multibyte_and_crlf() {
        let text = "Café [[Old]] · [[Old]]\r\nnext [[Old]]";
        assert_eq!(
            rewrite(text, "Old", "archive/Neu"),
            "Café [[archive/Neu]] · [[archive/Neu]]\r\nnext [[archive/Neu]]"
        );
    }
}
