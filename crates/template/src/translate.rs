//! Rewrites delimiter-marked markup into engine syntax.
//!
//! Literal text is wrapped in raw blocks so braces in the typesetting markup
//! are never interpreted. Each site becomes either a control tag or an
//! expression, depending on its first word.

use crate::delimiters::Delimiters;

const CONTROL_KEYWORDS: &[&str] = &[
    "if",
    "elif",
    "else",
    "endif",
    "for",
    "endfor",
    "set",
    "set_global",
    "break",
    "continue",
    "filter",
    "endfilter",
];

/// Produces engine source for `source`, or a human-readable reason it is
/// malformed.
pub(crate) fn translate(source: &str, delimiters: &Delimiters) -> Result<String, String> {
    let Delimiters { left, right } = delimiters;
    let mut out = String::with_capacity(source.len() + 32);
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find(left.as_str()) {
        push_literal(&mut out, &rest[..start], source, offset)?;

        let site_start = offset + start;
        let after_left = &rest[start + left.len()..];
        let Some(end) = after_left.find(right.as_str()) else {
            return Err(format!(
                "unclosed {} opened at line {}",
                left,
                line_of(source, site_start)
            ));
        };

        let site = after_left[..end].trim();
        if site.is_empty() {
            return Err(format!(
                "empty {}{} at line {}",
                left,
                right,
                line_of(source, site_start)
            ));
        }
        push_site(&mut out, site);

        let consumed = start + left.len() + end + right.len();
        rest = &rest[consumed..];
        offset += consumed;
    }
    push_literal(&mut out, rest, source, offset)?;

    Ok(out)
}

fn push_literal(out: &mut String, text: &str, source: &str, offset: usize) -> Result<(), String> {
    if text.is_empty() {
        return Ok(());
    }
    if let Some(pos) = find_raw_terminator(text) {
        return Err(format!(
            "literal text contains a raw block terminator at line {}",
            line_of(source, offset + pos)
        ));
    }
    out.push_str("{% raw %}");
    out.push_str(text);
    out.push_str("{% endraw %}");
    Ok(())
}

fn push_site(out: &mut String, site: &str) {
    let keyword = site.split_whitespace().next().unwrap_or_default();
    if CONTROL_KEYWORDS.contains(&keyword) {
        out.push_str("{% ");
        out.push_str(site);
        out.push_str(" %}");
    } else {
        out.push_str("{{ ");
        out.push_str(site);
        out.push_str(" }}");
    }
}

/// Finds `{%` followed by an optional `-`, whitespace and `endraw`.
fn find_raw_terminator(text: &str) -> Option<usize> {
    text.match_indices("{%").map(|(i, _)| i).find(|&i| {
        let tail = text[i + 2..].trim_start_matches('-').trim_start();
        tail.starts_with("endraw")
    })
}

fn line_of(source: &str, byte_offset: usize) -> usize {
    source[..byte_offset].matches('\n').count() + 1
}
