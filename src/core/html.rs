// src/core/html.rs
//
// Just enough HTML scanning for BGG's web pages (the ranks dump page); the
// XML API goes through roxmltree instead.

use super::sanitize::{normalize_ws, unescape};

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Byte span `[start, end)` of the next `<tag ...>` opening tag at or after `from`.
pub fn next_open_tag_ci(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    next_open_tag(s, &to_lower(s), &format!("<{}", to_lower(tag)), from)
}

// `lc` is `to_lower(s)`; ASCII-only lowering keeps byte offsets aligned.
fn next_open_tag(s: &str, lc: &str, pat: &str, from: usize) -> Option<(usize, usize)> {
    let mut at = from;
    loop {
        let start = lc.get(at..)?.find(pat)? + at;
        let after = start + pat.len();
        // `<a` must not match `<abbr`
        match lc[after..].chars().next() {
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => {
                let end = s[start..].find('>')? + start + 1;
                return Some((start, end));
            }
            _ => at = after,
        }
    }
}

/// Value of `name="..."` (or single-quoted) inside an opening tag, unescaped.
pub fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lc = to_lower(tag);
    let key = format!("{}=", to_lower(name));
    let mut from = 0;
    while let Some(rel) = lc[from..].find(&key) {
        let at = from + rel;
        // whole attribute names only: `data-href=` is not `href=`
        let boundary = lc[..at].chars().last().is_none_or(|c| c.is_whitespace());
        let v = at + key.len();
        if boundary {
            let quote = tag[v..].chars().next()?;
            if quote == '"' || quote == '\'' {
                let close = tag[v + 1..].find(quote)? + v + 1;
                return Some(unescape(&tag[v + 1..close]));
            }
            let end = tag[v..]
                .find(|c: char| c.is_whitespace() || c == '>')
                .map_or(tag.len(), |e| v + e);
            return Some(unescape(&tag[v..end]));
        }
        from = v;
    }
    None
}

/// First `<a href>` whose (unescaped) target starts with `prefix`.
pub fn find_href_with_prefix(html: &str, prefix: &str) -> Option<String> {
    let lc = to_lower(html);
    let mut from = 0;
    while let Some((start, end)) = next_open_tag(html, &lc, "<a", from) {
        if let Some(href) = attr_value(&html[start..end], "href") {
            if href.starts_with(prefix) {
                return Some(href);
            }
        }
        from = end;
    }
    None
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}
