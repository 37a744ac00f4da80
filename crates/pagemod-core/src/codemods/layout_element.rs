use anyhow::Result;
use std::path::Path;

use super::layout_import::LAYOUT_SLOT_ATTRS;
use super::{Codemod, MigrateContext, splice};
use crate::markup::{Element, element_offsets, find_element};

/// Rename every legacy layout element to the app layout, dropping the
/// header and footer it used to render. Nested layouts are renamed in the
/// same pass so none is left for a later run.
pub struct LayoutElement;

impl Codemod for LayoutElement {
    fn name(&self) -> &'static str {
        "layout-element"
    }

    fn apply(&self, ctx: &MigrateContext, _path: &Path, content: &str) -> Result<Option<String>> {
        let legacy = &ctx.app.legacy_layout;
        let layout = &ctx.app.layout_component;
        if legacy == layout {
            return Ok(None);
        }

        // Each round renames the first remaining element, outermost first
        let mut updated = content.to_string();
        for _ in 0..element_offsets(content, legacy).len() {
            let Some(el) = find_element(&updated, legacy)? else {
                break;
            };
            updated = rename(&updated, &el, layout);
        }
        Ok((updated != content).then_some(updated))
    }
}

fn rename(content: &str, legacy: &Element, layout: &str) -> String {
    let mut open = format!("<{layout}");
    for attr in &legacy.attrs {
        if LAYOUT_SLOT_ATTRS.contains(&attr.name.as_str()) {
            continue;
        }
        open.push(' ');
        open.push_str(&attr.to_source());
    }
    open.push_str(if legacy.self_closing { " />" } else { ">" });

    // Close tag first so the open tag's offsets stay valid
    let mut updated = content.to_string();
    if let Some(close) = legacy.close {
        updated = splice(&updated, close, &format!("</{layout}>"));
    }
    splice(&updated, legacy.open, &open)
}
