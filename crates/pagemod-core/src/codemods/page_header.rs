use anyhow::Result;
use log::debug;
use std::path::Path;

use super::{Codemod, MigrateContext, line_ending, line_indent, splice};
use crate::breadcrumbs;
use crate::markup::{AttrValue, Element, find_element_from};

const DEFAULT_VIEWS: &str = "[{ id: 'default', label: 'Default', icon: 'grid' }]";

/// Replace the first legacy section header with the standard page header,
/// carrying its title and description over and adding breadcrumbs derived
/// from the page's route
pub struct PageHeader;

/// The legacy header this codemod would replace, if any: the first one in
/// the file that is self-closing and has a title
pub(crate) fn replaceable_header(ctx: &MigrateContext, content: &str) -> Result<Option<Element>> {
    let mut from = 0;
    while let Some(el) = find_element_from(content, &ctx.app.legacy_header, from)? {
        if el.self_closing && el.attr("title").is_some() {
            return Ok(Some(el));
        }
        debug!(
            "<{}> at byte {} has children or no title, leaving it",
            el.name, el.open.start
        );
        from = el.open.start + 1;
    }
    Ok(None)
}

impl Codemod for PageHeader {
    fn name(&self) -> &'static str {
        "page-header"
    }

    fn apply(&self, ctx: &MigrateContext, path: &Path, content: &str) -> Result<Option<String>> {
        let Some(legacy) = replaceable_header(ctx, content)? else {
            return Ok(None);
        };

        let indent = line_indent(content, legacy.open.start);
        let attr_indent = format!("{indent}  ");

        let mut attrs: Vec<String> = Vec::new();
        if let Some(title) = legacy.attr("title") {
            attrs.push(title.to_source());
        }
        let subtitle = legacy
            .attr("subtitle")
            .or_else(|| legacy.attr("description"))
            .filter(|a| a.value != AttrValue::Flag);
        if let Some(subtitle) = subtitle {
            attrs.push(format!("subtitle={}", subtitle.value.to_source()));
        }
        let crumbs = breadcrumbs::for_page(path, &ctx.app);
        attrs.push(format!("breadcrumbs={{{}}}", breadcrumbs::render(&crumbs)));
        attrs.push(format!("views={{{DEFAULT_VIEWS}}}"));
        attrs.push("activeView=\"default\"".to_string());
        attrs.push("showFavorite".to_string());
        attrs.push("showSettings".to_string());

        let eol = line_ending(content);
        let mut header = format!("<{}", ctx.app.header_component);
        for attr in &attrs {
            header.push_str(eol);
            header.push_str(&attr_indent);
            header.push_str(attr);
        }
        header.push_str(eol);
        header.push_str(indent);
        header.push_str("/>");

        Ok(Some(splice(content, legacy.span(), &header)))
    }
}
