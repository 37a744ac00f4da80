use anyhow::Result;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::{Codemod, MigrateContext, line_ending, splice};
use crate::markup::{
    Span, element_offsets, find_element_from, find_import, is_imported, last_import_end,
};

/// `import { CreatorNavigationAuthenticated } from '../../components/navigation';`
static NAVIGATION_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^(?P<indent>[ \t]*)import[ \t]*\{[ \t]*(?P<name>\w*Navigation\w*)[ \t]*\}[ \t]*from[ \t]*(?P<quote>['"])(?P<prefix>[^'"\n]*)components/navigation['"][ \t]*;?"#,
    )
    .expect("navigation import pattern")
});

/// Headers and footers handed to the legacy layout; they are dropped with it
pub(crate) const LAYOUT_SLOT_ATTRS: &[&str] = &["header", "footer"];

/// Spans of the header and footer attributes of every legacy layout
fn slot_spans(content: &str, legacy: &str) -> Result<Vec<Span>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(el) = find_element_from(content, legacy, from)? {
        spans.extend(
            el.attrs
                .iter()
                .filter(|a| LAYOUT_SLOT_ATTRS.contains(&a.name.as_str()))
                .map(|a| a.span),
        );
        from = el.open.start + 1;
    }
    Ok(spans)
}

/// Import the app layout component. The navigation import is swapped for
/// it when the navigation component is only used inside the legacy
/// layouts' headers or footers; otherwise the layout import is added.
pub struct LayoutImport;

impl Codemod for LayoutImport {
    fn name(&self) -> &'static str {
        "layout-import"
    }

    fn apply(&self, ctx: &MigrateContext, _path: &Path, content: &str) -> Result<Option<String>> {
        let layout = &ctx.app.layout_component;
        if is_imported(content, layout) {
            return Ok(None);
        }
        if element_offsets(content, &ctx.app.legacy_layout).is_empty() {
            return Ok(None);
        }
        let slots = slot_spans(content, &ctx.app.legacy_layout)?;
        let eol = line_ending(content);

        if let Some(caps) = NAVIGATION_IMPORT.captures(content) {
            let (Some(whole), Some(nav)) = (caps.get(0), caps.name("name")) else {
                return Ok(None);
            };
            let quote = &caps["quote"];
            let prefix = &caps["prefix"];
            let layout_import = format!(
                "{}import {{ {layout} }} from {quote}{prefix}components/app-layout{quote};",
                &caps["indent"]
            );

            let nav = nav.as_str();
            let outside_slots = element_offsets(content, nav)
                .into_iter()
                .any(|at| !slots.iter().any(|s| at >= s.start && at < s.end));

            let span = Span::new(whole.start(), whole.end());
            if !outside_slots {
                return Ok(Some(splice(content, span, &layout_import)));
            }
            debug!("{nav} is used outside the layout, keeping its import");
            return Ok(Some(splice(
                content,
                Span::new(span.end, span.end),
                &format!("{eol}{layout_import}"),
            )));
        }

        let quote = find_import(content, &ctx.app.ui_module).map_or('\'', |decl| decl.quote);
        let layout_import =
            format!("import {{ {layout} }} from {quote}@/components/app-layout{quote};");
        let updated = match last_import_end(content) {
            Some(end) => splice(content, Span::new(end, end), &format!("{eol}{layout_import}")),
            None => format!("{layout_import}{eol}{content}"),
        };
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::test_support::{ctx, page};

    fn apply(content: &str) -> Option<String> {
        LayoutImport
            .apply(&ctx(), &page("crm/tasks/page.tsx"), content)
            .unwrap()
    }

    #[test]
    fn test_swaps_navigation_import() {
        let content = r#"import { useState } from "react";
import { CreatorNavigationAuthenticated } from "../../../components/navigation";

<PageLayout background="black" header={<CreatorNavigationAuthenticated />}></PageLayout>
"#;
        let updated = apply(content).unwrap();
        assert!(updated.contains(
            "import { AtlvsAppLayout } from \"../../../components/app-layout\";\n\n<PageLayout"
        ));
        assert!(!updated.contains("components/navigation"));
    }

    #[test]
    fn test_keeps_navigation_used_elsewhere() {
        let content = r#"import { Navigation } from '../components/navigation';

<PageLayout header={<Navigation />}>
  <Navigation compact />
</PageLayout>
"#;
        let updated = apply(content).unwrap();
        assert!(updated.starts_with(
            "import { Navigation } from '../components/navigation';\nimport { AtlvsAppLayout } from '../components/app-layout';\n"
        ));
    }

    #[test]
    fn test_adds_alias_import_without_navigation() {
        let content = "'use client';\n\nimport { Card } from \"@ghxstship/ui\";\n\n<PageLayout></PageLayout>\n";
        let updated = apply(content).unwrap();
        assert_eq!(
            updated,
            "'use client';\n\nimport { Card } from \"@ghxstship/ui\";\nimport { AtlvsAppLayout } from \"@/components/app-layout\";\n\n<PageLayout></PageLayout>\n"
        );
    }

    #[test]
    fn test_no_imports_at_all() {
        let updated = apply("<PageLayout></PageLayout>\n").unwrap();
        assert_eq!(
            updated,
            "import { AtlvsAppLayout } from '@/components/app-layout';\n<PageLayout></PageLayout>\n"
        );
    }

    #[test]
    fn test_navigation_in_every_layout_header_is_swapped() {
        let content = r#"import { Navigation } from '../components/navigation';

if (loading) return <PageLayout header={<Navigation />}><Spinner /></PageLayout>;
return <PageLayout header={<Navigation />}>x</PageLayout>;
"#;
        let updated = apply(content).unwrap();
        assert!(updated.starts_with("import { AtlvsAppLayout } from '../components/app-layout';\n\n"));
        assert!(!updated.contains("components/navigation"));
    }

    #[test]
    fn test_crlf_file_keeps_crlf() {
        let content = "import { Card } from '@ghxstship/ui';\r\n\r\n<PageLayout></PageLayout>\r\n";
        assert_eq!(
            apply(content).as_deref(),
            Some(
                "import { Card } from '@ghxstship/ui';\r\nimport { AtlvsAppLayout } from '@/components/app-layout';\r\n\r\n<PageLayout></PageLayout>\r\n"
            )
        );

        let keep_nav = "import { Nav } from '../components/navigation';\r\n<PageLayout><Nav /></PageLayout>\r\n";
        assert!(apply(keep_nav).unwrap().starts_with(
            "import { Nav } from '../components/navigation';\r\nimport { AtlvsAppLayout } from '../components/app-layout';\r\n<PageLayout>"
        ));
    }

    #[test]
    fn test_no_op_cases() {
        // Already imported
        let content = "import { AtlvsAppLayout } from '../components/app-layout';\n<PageLayout></PageLayout>";
        assert!(apply(content).is_none());
        // No legacy layout to replace
        assert!(apply("import { Navigation } from '../components/navigation';\n<Section />").is_none());
    }
}
