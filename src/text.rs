//! @dose
//! purpose: Whitespace primitives shared by every style parser and composer. clean_doc is the
//!     docstring normalizer (tab expansion, blank-line trimming, common-indent removal) and
//!     reflow applies the same treatment to a multi-line description body.
//!
//! when-editing:
//!     - !clean_doc must stay idempotent; round-trip tests depend on it
//!     - Leading blank lines are dropped before the margin is measured
//!
//! invariants:
//!     - Whitespace-only input normalizes to an empty string
//!     - The first line never keeps leading whitespace
//!     - No tab characters survive clean_doc
//!
//! gotchas:
//!     - Lines that are only whitespace are ignored when measuring the margin but still have
//!       up to margin columns removed

/// Tab stop width used when expanding tabs.
pub const TAB_WIDTH: usize = 8;

/// Normalize a raw docstring body.
///
/// Tabs expand to 8-column stops, leading and trailing blank lines are removed, the first
/// line is left-stripped and the common indentation of the remaining lines is removed.
pub fn clean_doc(text: &str) -> String {
    let expanded: Vec<String> = text.split('\n').map(expand_tabs).collect();

    let Some(first) = expanded.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let last = expanded
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);
    let lines = &expanded[first..=last];

    let margin = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_whitespace(l))
        .min()
        .unwrap_or(0);

    let mut out = Vec::with_capacity(lines.len());
    out.push(lines[0].trim_start().to_string());
    for line in &lines[1..] {
        out.push(drop_columns(line, margin).to_string());
    }
    out.join("\n")
}

/// Reflow a description body: the first line is kept, the rest is re-dedented as a block so
/// nested indentation (lists, code) survives. A body that starts on the line after its tag is
/// dedented as a whole.
pub fn reflow(desc: &str) -> String {
    if let Some(block) = desc.trim_start_matches([' ', '\t', '\r']).strip_prefix('\n') {
        return dedent(block);
    }
    let desc = desc.trim();
    match desc.split_once('\n') {
        Some((first, rest)) => {
            let rest = dedent(rest);
            if rest.is_empty() {
                first.trim_end().to_string()
            } else {
                format!("{}\n{}", first.trim_end(), rest)
            }
        }
        None => desc.to_string(),
    }
}

/// Remove the common indentation of all non-blank lines, first line included, and trim
/// surrounding blank lines.
pub fn dedent(text: &str) -> String {
    let expanded: Vec<String> = text.split('\n').map(expand_tabs).collect();
    let Some(first) = expanded.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let last = expanded
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);
    let lines = &expanded[first..=last];
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_whitespace(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| drop_columns(l, margin).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every non-empty line of `text` with `prefix`. Empty lines stay empty.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent every line after the first. Used for descriptions that start on the tag line.
pub fn indent_continuation(text: &str, prefix: &str) -> String {
    match text.split_once('\n') {
        Some((first, rest)) => format!("{}\n{}", first, indent_lines(rest, prefix)),
        None => text.to_string(),
    }
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(ch);
            column = if ch == '\n' || ch == '\r' { 0 } else { column + 1 };
        }
    }
    out
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn drop_columns(line: &str, columns: usize) -> &str {
    let mut rest = line;
    for _ in 0..columns {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_whitespace() => rest = chars.as_str(),
            _ => break,
        }
    }
    rest
}
