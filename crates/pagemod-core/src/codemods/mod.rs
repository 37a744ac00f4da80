use anyhow::Result;
use std::path::Path;

use crate::config::AppConfig;

pub mod layout_element;
pub mod layout_import;
pub mod page_header;
pub mod prune_imports;
pub mod ui_import;

use layout_element::LayoutElement;
use layout_import::LayoutImport;
use page_header::PageHeader;
use prune_imports::PruneUiImports;
use ui_import::UiImport;

/// Context passed to all codemods during migration
#[derive(Debug, Clone)]
pub struct MigrateContext {
    /// The app whose page tree is being migrated
    pub app: AppConfig,
}

/// One transform step. `Ok(None)` means the step had nothing to do.
pub trait Codemod {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &MigrateContext, path: &Path, content: &str) -> Result<Option<String>>;
}

/// The migration chain in execution order. Import edits come before the
/// element edits that rely on them.
pub fn default_chain() -> Vec<Box<dyn Codemod>> {
    vec![
        Box::new(UiImport),
        Box::new(LayoutImport),
        Box::new(LayoutElement),
        Box::new(PageHeader),
        Box::new(PruneUiImports),
    ]
}

/// Replace `span` of `content` with `replacement`
pub(crate) fn splice(content: &str, span: crate::markup::Span, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..span.start]);
    out.push_str(replacement);
    out.push_str(&content[span.end..]);
    out
}

/// Leading whitespace of the line containing byte `offset`
pub(crate) fn line_indent(content: &str, offset: usize) -> &str {
    let line_start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &content[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Line terminator the file already uses; CRLF wins if any line has it
pub(crate) fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::MigrateContext;
    use crate::config::AppConfig;
    use std::path::PathBuf;

    pub fn ctx() -> MigrateContext {
        MigrateContext {
            app: AppConfig::new("/repo/apps/atlvs/src/app", "ATLVS", "AtlvsAppLayout"),
        }
    }

    pub fn page(rel: &str) -> PathBuf {
        ctx().app.root.join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Span;

    #[test]
    fn test_splice() {
        assert_eq!(splice("abcdef", Span::new(1, 3), "XY"), "aXYdef");
        assert_eq!(splice("abc", Span::new(3, 3), "!"), "abc!");
    }

    #[test]
    fn test_line_indent() {
        let src = "a\n    <Tag />\n\t<Other />";
        assert_eq!(line_indent(src, src.find("<Tag").unwrap()), "    ");
        assert_eq!(line_indent(src, src.find("<Other").unwrap()), "\t");
        assert_eq!(line_indent(src, 0), "");
    }

    #[test]
    fn test_line_ending() {
        assert_eq!(line_ending("a\r\nb\r\n"), "\r\n");
        assert_eq!(line_ending("a\nb\n"), "\n");
        assert_eq!(line_ending("<Card />"), "\n");
    }

    #[test]
    fn test_chain_order() {
        let names: Vec<_> = default_chain().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["ui-import", "layout-import", "layout-element", "page-header", "prune-ui-imports"]
        );
    }
}
