//! Escaping at the rendering boundary
//!
//! Every piece of untrusted text (quotes, contexts, case statements) is
//! escaped on its way into an artifact. Each escape has a paired
//! unescape and the pair round-trips byte-exactly, so escaped artifacts
//! remain a faithful transport of the extracted text.

/// Characters with markdown meaning that get a backslash escape
const MARKDOWN_SPECIALS: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!', '|', '>',
];

/// Escape text for embedding in HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape_html`]; `unescape_html(escape_html(t)) == t` for any `t`
pub fn unescape_html(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        unescaped.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (replacement, consumed) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else if rest.starts_with("&quot;") {
            ('"', 6)
        } else if rest.starts_with("&#39;") {
            ('\'', 5)
        } else {
            ('&', 1)
        };
        unescaped.push(replacement);
        rest = &rest[consumed..];
    }
    unescaped.push_str(rest);
    unescaped
}

/// Escape text for embedding in markdown
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Reverse [`escape_markdown`]; round-trips byte-exactly
pub fn unescape_markdown(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if MARKDOWN_SPECIALS.contains(&next) {
                    unescaped.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        unescaped.push(c);
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTILE: &str =
        "a < b && \"c\" > 'd' — *bold* [link](url) `code` \\ #1 | 2. x!";

    #[test]
    fn test_html_escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_html_round_trip_is_byte_exact() {
        for text in [HOSTILE, "", "plain", "&amp; pre-escaped", "&& & &unknown;"] {
            assert_eq!(unescape_html(&escape_html(text)), text);
        }
    }

    #[test]
    fn test_markdown_escapes_specials() {
        assert_eq!(escape_markdown("*not bold*"), "\\*not bold\\*");
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_markdown_round_trip_is_byte_exact() {
        for text in [HOSTILE, "", "plain", "\\already\\escaped", "- list\n1. item"] {
            assert_eq!(unescape_markdown(&escape_markdown(text)), text);
        }
    }

    #[test]
    fn test_unescape_leaves_bare_entities_alone() {
        assert_eq!(unescape_html("fish & chips"), "fish & chips");
        assert_eq!(unescape_markdown("back\\slash x"), "back\\slash x");
    }
}
