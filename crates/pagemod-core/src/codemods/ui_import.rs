use anyhow::Result;
use std::path::Path;

use super::page_header::replaceable_header;
use super::{Codemod, MigrateContext, line_ending};
use crate::markup::{ImportDecl, find_import};

/// Add the page header component to the UI library import list, ahead of
/// the header replacement that starts using it
pub struct UiImport;

impl Codemod for UiImport {
    fn name(&self) -> &'static str {
        "ui-import"
    }

    fn apply(&self, ctx: &MigrateContext, _path: &Path, content: &str) -> Result<Option<String>> {
        if replaceable_header(ctx, content)?.is_none() {
            return Ok(None);
        }
        let Some(decl) = find_import(content, &ctx.app.ui_module) else {
            return Ok(None);
        };
        Ok(insert_import_name(content, &decl, &ctx.app.header_component))
    }
}

/// Byte offset just past the last non-comment, non-whitespace character
fn last_code_end(text: &str) -> Option<usize> {
    let mut last = None;
    let mut chars = text.char_indices().peekable();
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
            (c, _) if !c.is_whitespace() => last = Some(i + c.len_utf8()),
            _ => {}
        }
    }
    last
}

/// Insert `name` just before the closing brace of `decl`'s list, following
/// the list's own layout. `None` when the name is already imported.
pub fn insert_import_name(content: &str, decl: &ImportDecl, name: &str) -> Option<String> {
    if decl.imports(name) {
        return None;
    }

    let list = decl.list.slice(content);
    let (offset, insertion) = match last_code_end(list) {
        None => (0, format!(" {name} ")),
        Some(end) => {
            let trailing_comma = list[..end].ends_with(',');
            if list.contains('\n') {
                let line_start = list[..end].rfind('\n').map_or(0, |i| i + 1);
                let line = &list[line_start..];
                let indent = &line[..line.len() - line.trim_start_matches([' ', '\t']).len()];
                let eol = line_ending(content);
                if trailing_comma {
                    (end, format!("{eol}{indent}{name},"))
                } else {
                    (end, format!(",{eol}{indent}{name}"))
                }
            } else if trailing_comma {
                (end, format!(" {name},"))
            } else {
                (end, format!(", {name}"))
            }
        }
    };

    let at = decl.list.start + offset;
    let mut out = String::with_capacity(content.len() + insertion.len());
    out.push_str(&content[..at]);
    out.push_str(&insertion);
    out.push_str(&content[at..]);
    Some(out)
}
