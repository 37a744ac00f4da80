use anyhow::Result;
use log::debug;
use std::path::Path;

use super::{Codemod, MigrateContext, splice};
use crate::markup::{ImportDecl, Span, find_import, strip_comments};

/// Drop the legacy layout and header from the UI library import once
/// nothing in the page refers to them any more
pub struct PruneUiImports;

impl Codemod for PruneUiImports {
    fn name(&self) -> &'static str {
        "prune-ui-imports"
    }

    fn apply(&self, ctx: &MigrateContext, _path: &Path, content: &str) -> Result<Option<String>> {
        let mut current = content.to_string();
        let mut changed = false;

        for legacy in [&ctx.app.legacy_layout, &ctx.app.legacy_header] {
            let Some(decl) = find_import(&current, &ctx.app.ui_module) else {
                break;
            };
            if !decl.imports(legacy) || mentioned_outside(&current, legacy, decl.span) {
                continue;
            }
            debug!("Removing unused {legacy} from {} import", ctx.app.ui_module);
            if let Some(updated) = remove_import_name(&current, &decl, legacy) {
                current = updated;
                changed = true;
            }
        }

        Ok(changed.then_some(current))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether `name` appears as a whole identifier anywhere outside `except`
fn mentioned_outside(content: &str, name: &str, except: Span) -> bool {
    content.match_indices(name).any(|(start, _)| {
        let end = start + name.len();
        let bounded = !content[..start].chars().next_back().is_some_and(is_ident_char)
            && !content[end..].chars().next().is_some_and(is_ident_char);
        bounded && (start < except.start || start >= except.end)
    })
}

/// Ranges of the comma-separated entries of an import list, relative to the
/// list. Commas inside comments do not split.
fn entries(list: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = list.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            ('/', Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            (',', _) => {
                out.push((start, i));
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push((start, list.len()));
    out
}

/// Start and end of the code in `entry`, skipping whitespace and whole
/// comments at either side
fn code_bounds(entry: &str) -> Option<(usize, usize)> {
    let mut first = None;
    let mut last = 0;
    let mut chars = entry.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            ('/', Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            (c, _) if !c.is_whitespace() => {
                first.get_or_insert(i);
                last = i + c.len_utf8();
            }
            _ => {}
        }
    }
    first.map(|first| (first, last))
}

fn binding(entry: &str) -> Option<String> {
    strip_comments(entry).split_whitespace().last().map(String::from)
}

/// Remove the entry binding `name` from `decl`. The whole declaration goes
/// when it was the only name; an entry alone on its line takes the line.
pub fn remove_import_name(content: &str, decl: &ImportDecl, name: &str) -> Option<String> {
    if !decl.imports(name) {
        return None;
    }
    if decl.names.len() == 1 {
        let end = match content[decl.span.end..].find('\n') {
            Some(rel) if content[decl.span.end..decl.span.end + rel].trim().is_empty() => {
                decl.span.end + rel + 1
            }
            _ => decl.span.end,
        };
        return Some(splice(content, Span::new(decl.span.start, end), ""));
    }

    let list = decl.list.slice(content);
    let entries = entries(list);
    let index = entries
        .iter()
        .position(|&(s, e)| binding(&list[s..e]).as_deref() == Some(name))?;
    let (s, e) = entries[index];
    let (code_start, code_end) = code_bounds(&list[s..e])?;
    let (entry_start, entry_end) = (s + code_start, s + code_end);
    let has_comma = e < list.len();
    let after = if has_comma { e + 1 } else { entry_end };

    let line_start = list[..entry_start].rfind('\n').map(|i| i + 1);
    let line_end = list[after..].find('\n').map_or(list.len(), |rel| after + rel);
    let own_line = line_start.is_some_and(|ls| list[ls..entry_start].trim().is_empty())
        && list[after..line_end].trim().is_empty();

    let removal = match line_start {
        Some(ls) if own_line && line_end < list.len() => Span::new(ls, line_end + 1),
        // Entry shares its line with the closing brace
        Some(ls) if own_line => {
            let newline = ls - 1;
            let start = if list[..newline].ends_with('\r') {
                newline - 1
            } else {
                newline
            };
            Span::new(start, list.len())
        }
        _ if has_comma => {
            let spaces = list[after..].len() - list[after..].trim_start_matches([' ', '\t']).len();
            Span::new(entry_start, after + spaces)
        }
        // Last entry without a trailing comma: take the preceding comma
        _ => Span::new(s.checked_sub(1)?, entry_end),
    };

    let absolute = Span::new(decl.list.start + removal.start, decl.list.start + removal.end);
    Some(splice(content, absolute, ""))
}
