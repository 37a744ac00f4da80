//! Breadcrumb trails derived from a page's route directories.

use std::fmt::Write as _;
use std::path::{Component, Path};

use crate::config::AppConfig;

/// One breadcrumb; the leaf carries no link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub href: Option<String>,
}

impl Crumb {
    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }

    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
        }
    }
}

/// Directories between the route root and the page file, in order.
///
/// The path is taken relative to `root` when it lies inside it, otherwise
/// everything below the last `route_root` component is used.
pub fn route_dirs(page: &Path, root: &Path, route_root: &str) -> Vec<String> {
    let rel = page.strip_prefix(root).unwrap_or(page);
    let mut parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if rel == page {
        if let Some(idx) = parts.iter().rposition(|p| p == route_root) {
            parts.drain(..=idx);
        }
    }

    // Drop the page file itself
    parts.pop();
    parts
}

/// `[id]`, `[...slug]` and `[[...slug]]` segments
pub fn is_dynamic_segment(segment: &str) -> bool {
    segment.starts_with('[') && segment.ends_with(']')
}

/// Segments that never show up in the URL: dynamic params, `(group)`s and `@slot`s
fn is_routable(segment: &str) -> bool {
    !(is_dynamic_segment(segment)
        || (segment.starts_with('(') && segment.ends_with(')'))
        || segment.starts_with('@'))
}

/// `win-loss` -> `Win Loss`
pub fn title_case(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Breadcrumbs for a page: the app crumb, then one crumb per routable
/// directory with accumulated hrefs, the last one without a link
pub fn derive(segments: &[String], app_label: &str, home_href: &str) -> Vec<Crumb> {
    let segments: Vec<&str> = segments
        .iter()
        .map(String::as_str)
        .filter(|s| is_routable(s))
        .collect();

    let mut crumbs = vec![Crumb::link(app_label, home_href)];
    let mut href = String::new();
    for (i, segment) in segments.iter().enumerate() {
        href.push('/');
        href.push_str(segment);
        if i + 1 == segments.len() {
            crumbs.push(Crumb::leaf(title_case(segment)));
        } else {
            crumbs.push(Crumb::link(title_case(segment), href.clone()));
        }
    }
    crumbs
}

/// Breadcrumbs for a page file of `app`
pub fn for_page(page: &Path, app: &AppConfig) -> Vec<Crumb> {
    derive(
        &route_dirs(page, &app.root, &app.route_root),
        &app.label,
        &app.home_href,
    )
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render as a JS array literal for a `breadcrumbs={...}` attribute
pub fn render(crumbs: &[Crumb]) -> String {
    let mut out = String::from("[");
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{{ label: {}", quote(&crumb.label));
        if let Some(href) = &crumb.href {
            let _ = write!(out, ", href: {}", quote(href));
        }
        out.push_str(" }");
    }
    out.push(']');
    out
}
