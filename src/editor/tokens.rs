//! Clickable span detection.
//!
//! Lines are scanned character by character. Columns are character indices,
//! never byte offsets, so they line up with editor cursor positions.

use crate::host::{ClickableToken, TokenKind};

use super::cursor::Position;

/// A link found on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub kind: TokenKind,
    /// Target as written, alias stripped; markdown destinations percent-decoded.
    pub text: String,
    /// Columns of the target text.
    pub text_start: usize,
    pub text_end: usize,
    /// Columns of the whole link syntax, brackets included.
    pub start: usize,
    pub end: usize,
    /// `[[...]]` / `![[...]]` rather than markdown or URL syntax.
    pub wiki: bool,
}

impl LinkSpan {
    /// Cursor hit test; the column right after the closing bracket still counts.
    pub fn contains(&self, col: usize) -> bool {
        self.start <= col && col <= self.end
    }

    pub fn to_token(&self, line: usize) -> ClickableToken {
        ClickableToken {
            kind: self.kind,
            text: self.text.clone(),
            start: Position::new(line, self.text_start),
            end: Position::new(line, self.text_end),
        }
    }
}

/// Token under `pos`, or `None` when the cursor is not on a link.
pub fn token_at(lines: &[&str], pos: Position) -> Option<ClickableToken> {
    let line = lines.get(pos.line)?;
    if in_fenced_block(lines, pos.line) {
        return None;
    }
    scan_line(line)
        .into_iter()
        .find(|span| span.contains(pos.ch))
        .map(|span| span.to_token(pos.line))
}

/// All links of a document with their line numbers, fenced code skipped.
pub fn scan_document(text: &str) -> Vec<(usize, LinkSpan)> {
    let mut in_fence = false;
    let mut found = Vec::new();
    for (row, line) in text.lines().enumerate() {
        if is_fence_marker(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        found.extend(scan_line(line).into_iter().map(|span| (row, span)));
    }
    found
}

/// True when `row` is inside (or is the marker line of) a fenced code block.
pub fn in_fenced_block(lines: &[&str], row: usize) -> bool {
    let mut in_fence = false;
    for line in lines.iter().take(row) {
        if is_fence_marker(line) {
            in_fence = !in_fence;
        }
    }
    in_fence || lines.get(row).is_some_and(|l| is_fence_marker(l))
}

fn is_fence_marker(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

pub fn scan_line(line: &str) -> Vec<LinkSpan> {
    let cs: Vec<char> = line.chars().collect();
    let n = cs.len();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < n {
        // inline code: skip to the matching run of backticks
        if cs[i] == '`' {
            let run = count_run(&cs, i, '`');
            match find_run(&cs, i + run, '`', run) {
                Some(close) => {
                    i = close + run;
                    continue;
                }
                None => break,
            }
        }

        let embed = cs[i] == '!';
        let open_at = if embed { i + 1 } else { i };

        if starts_with(&cs, open_at, "[[") {
            if let Some((span, next)) = wiki_link(&cs, i, open_at + 2) {
                spans.push(span);
                i = next;
            } else {
                i = open_at + 2;
            }
            continue;
        }

        if cs.get(open_at) == Some(&'[') {
            if let Some((span, next)) = markdown_link(&cs, i, open_at) {
                spans.push(span);
                i = next;
            } else {
                i = open_at + 1;
            }
            continue;
        }

        if cs[i] == '<' {
            if let Some((span, next)) = autolink(&cs, i) {
                spans.push(span);
                i = next;
                continue;
            }
        }

        if starts_bare_url(&cs, i) {
            let (span, next) = bare_url(&cs, i);
            spans.push(span);
            i = next;
            continue;
        }

        i += 1;
    }

    spans
}

fn wiki_link(cs: &[char], start: usize, open: usize) -> Option<(LinkSpan, usize)> {
    let close = find_str(cs, open, "]]")?;
    let raw = &cs[open..close];
    if raw.is_empty() || raw.iter().any(|&c| c == '[' || c == ']') {
        return None;
    }
    let target_len = raw.iter().position(|&c| c == '|').unwrap_or(raw.len());
    let text: String = raw[..target_len].iter().collect();
    if text.trim().is_empty() {
        return None;
    }
    Some((
        LinkSpan {
            kind: TokenKind::InternalLink,
            text,
            text_start: open,
            text_end: open + target_len,
            start,
            end: close + 2,
            wiki: true,
        },
        close + 2,
    ))
}

fn markdown_link(cs: &[char], start: usize, bracket: usize) -> Option<(LinkSpan, usize)> {
    let label_end = (bracket + 1..cs.len()).find(|&j| cs[j] == ']')?;
    if cs.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let dest_open = label_end + 2;
    let close = (dest_open..cs.len()).find(|&j| cs[j] == ')')?;

    // trim surrounding whitespace, drop an optional "title", unwrap <dest>
    let mut from = dest_open;
    while from < close && cs[from].is_whitespace() {
        from += 1;
    }
    let mut to = if cs.get(from) == Some(&'<') {
        from += 1;
        (from..close).find(|&j| cs[j] == '>')?
    } else {
        (from..close).find(|&j| cs[j].is_whitespace()).unwrap_or(close)
    };
    while to > from && cs[to - 1].is_whitespace() {
        to -= 1;
    }
    if from >= to {
        return None;
    }

    let dest: String = cs[from..to].iter().collect();
    let (kind, text) = if is_external(&dest) {
        (TokenKind::ExternalLink, dest)
    } else {
        let decoded = urlencoding::decode(&dest).map(|d| d.into_owned()).unwrap_or(dest);
        (TokenKind::InternalLink, decoded)
    };

    Some((
        LinkSpan {
            kind,
            text,
            text_start: from,
            text_end: to,
            start,
            end: close + 1,
            wiki: false,
        },
        close + 1,
    ))
}

fn autolink(cs: &[char], start: usize) -> Option<(LinkSpan, usize)> {
    let close = (start + 1..cs.len()).find(|&j| cs[j] == '>')?;
    let inner = &cs[start + 1..close];
    if inner.iter().any(|c| c.is_whitespace()) {
        return None;
    }
    let text: String = inner.iter().collect();
    if !is_external(&text) {
        return None;
    }
    Some((
        LinkSpan {
            kind: TokenKind::ExternalLink,
            text,
            text_start: start + 1,
            text_end: close,
            start,
            end: close + 1,
            wiki: false,
        },
        close + 1,
    ))
}

fn starts_bare_url(cs: &[char], i: usize) -> bool {
    let boundary = i == 0 || cs[i - 1].is_whitespace() || matches!(cs[i - 1], '(' | '"' | '\'' | '*' | '_');
    boundary && (starts_with(cs, i, "https://") || starts_with(cs, i, "http://"))
}

fn bare_url(cs: &[char], start: usize) -> (LinkSpan, usize) {
    let mut end = (start..cs.len())
        .find(|&j| cs[j].is_whitespace() || matches!(cs[j], '<' | '>' | '"'))
        .unwrap_or(cs.len());
    let after = end;

    // trailing punctuation belongs to the sentence, a closing paren only if unbalanced
    while end > start {
        let c = cs[end - 1];
        let unbalanced_paren = c == ')' && {
            let opens = cs[start..end].iter().filter(|&&x| x == '(').count();
            let closes = cs[start..end].iter().filter(|&&x| x == ')').count();
            closes > opens
        };
        if matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '*' | '_') || unbalanced_paren {
            end -= 1;
        } else {
            break;
        }
    }

    let text: String = cs[start..end].iter().collect();
    (
        LinkSpan {
            kind: TokenKind::ExternalLink,
            text,
            text_start: start,
            text_end: end,
            start,
            end,
            wiki: false,
        },
        after.max(start + 1),
    )
}

/// `scheme://...` or a `mailto:`/`tel:` URI.
pub fn is_external(dest: &str) -> bool {
    let lower = dest.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return true;
    }
    match dest.find("://") {
        Some(idx) if idx >= 2 => dest[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

fn starts_with(cs: &[char], at: usize, pat: &str) -> bool {
    let mut idx = at;
    for p in pat.chars() {
        if cs.get(idx) != Some(&p) {
            return false;
        }
        idx += 1;
    }
    true
}

fn find_str(cs: &[char], from: usize, pat: &str) -> Option<usize> {
    (from..cs.len()).find(|&j| starts_with(cs, j, pat))
}

fn count_run(cs: &[char], at: usize, c: char) -> usize {
    cs[at..].iter().take_while(|&&x| x == c).count()
}

fn find_run(cs: &[char], from: usize, c: char, len: usize) -> Option<usize> {
    let mut j = from;
    while j < cs.len() {
        if cs[j] == c {
            let run = count_run(cs, j, c);
            if run == len {
                return Some(j);
            }
            j += run;
        } else {
            j += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wikilink_with_heading_and_alias() {
        let spans = scan_line("See [[Foo#Section|Display]] here");
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.kind, TokenKind::InternalLink);
        assert_eq!(span.text, "Foo#Section");
        assert_eq!((span.text_start, span.text_end), (6, 17));
        assert_eq!((span.start, span.end), (4, 27));
        assert!(span.wiki);
    }

    #[test]
    fn embeds_are_internal() {
        let spans = scan_line("![[diagram.png]]");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "diagram.png");
        assert_eq!(spans[0].start, 0);
    }

    #[test]
    fn markdown_links_split_by_scheme() {
        let spans = scan_line("[docs](https://example.com/a) and [note](sub/My%20Note.md)");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, TokenKind::ExternalLink);
        assert_eq!(spans[0].text, "https://example.com/a");
        assert_eq!((spans[0].text_start, spans[0].text_end), (7, 28));
        assert_eq!(spans[1].kind, TokenKind::InternalLink);
        assert_eq!(spans[1].text, "sub/My Note.md");
    }

    #[test]
    fn markdown_link_title_and_angle_destination() {
        let spans = scan_line(r#"[a](<my note.md> "Title")"#);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "my note.md");
        let spans = scan_line(r#"[a](other.md "Title")"#);
        assert_eq!(spans[0].text, "other.md");
    }

    #[test]
    fn bracket_text_without_destination_is_not_a_link() {
        assert!(scan_line("[a] and [b]").is_empty());
        let spans = scan_line("[a] and [b](c.md)");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 8);
    }

    #[test]
    fn bare_and_angle_urls() {
        let spans = scan_line("Visit https://rust-lang.org. Or <mailto:me@example.com>");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "https://rust-lang.org");
        assert_eq!(spans[1].text, "mailto:me@example.com");
    }

    #[test]
    fn bare_url_keeps_balanced_parens() {
        let spans = scan_line("(see https://en.wikipedia.org/wiki/Rust_(language))");
        assert_eq!(spans[0].text, "https://en.wikipedia.org/wiki/Rust_(language)");
    }

    #[test]
    fn inline_code_is_skipped() {
        let spans = scan_line("`[[Fake]]` but [[Real]] and ``[[x]]``");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Real");
    }

    #[test]
    fn unclosed_backtick_hides_rest_of_line() {
        assert!(scan_line("[[Before]] `code [[Hidden]]").len() == 1);
    }

    #[test]
    fn empty_and_nested_wikilinks_are_ignored() {
        assert!(scan_line("[[]] [[|alias]]").is_empty());
        assert!(scan_line("[[a[b]]").is_empty());
    }

    #[test]
    fn token_hit_test_includes_closing_edge() {
        let lines = vec!["x [[Note]] y"];
        assert!(token_at(&lines, Position::new(0, 1)).is_none());
        assert_eq!(token_at(&lines, Position::new(0, 2)).map(|t| t.text), Some("Note".into()));
        assert!(token_at(&lines, Position::new(0, 10)).is_some());
        assert!(token_at(&lines, Position::new(0, 11)).is_none());
    }

    #[test]
    fn token_lookup_is_deterministic() {
        let lines = vec!["[[A]] then https://b.example"];
        for ch in 0..lines[0].chars().count() {
            let pos = Position::new(0, ch);
            assert_eq!(token_at(&lines, pos), token_at(&lines, pos));
        }
    }

    #[test]
    fn fenced_blocks_hide_links() {
        let text = "```\n[[CodeLink]]\n```\nOutside [[RealLink]]";
        let found = scan_document(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 3);
        assert_eq!(found[0].1.text, "RealLink");

        let lines: Vec<&str> = text.lines().collect();
        assert!(token_at(&lines, Position::new(1, 3)).is_none());
    }

    #[test]
    fn scheme_detection() {
        assert!(is_external("https://x.y"));
        assert!(is_external("obsidian://open?vault=a"));
        assert!(is_external("MAILTO:a@b.c"));
        assert!(!is_external("notes/a.md"));
        assert!(!is_external("C://odd"));
    }
}
