use std::fmt;
use std::path::Path;

use crate::breadcrumbs::{is_dynamic_segment, route_dirs};
use crate::config::AppConfig;
use crate::markup::contains_element;

/// Why a path is kept out of the migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The route root's own page
    RootIndex,
    /// Below a directory from the exclusion set (auth, api, ...)
    ExcludedDir(String),
    /// Below a `[param]` directory; these are migrated in a separate pass
    DynamicRoute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    AlreadyMigrated,
    Excluded(Exclusion),
    MissingLegacyPattern,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::RootIndex => write!(f, "root index page"),
            Exclusion::ExcludedDir(dir) => write!(f, "inside excluded directory '{dir}'"),
            Exclusion::DynamicRoute => write!(f, "dynamic route"),
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::AlreadyMigrated => write!(f, "already migrated"),
            Eligibility::Excluded(reason) => write!(f, "excluded: {reason}"),
            Eligibility::MissingLegacyPattern => write!(f, "no legacy layout or header"),
        }
    }
}

/// Decide whether a page should be processed. Rules are checked in order
/// and the first match wins; the result depends only on the arguments.
pub fn check(content: &str, path: &Path, app: &AppConfig) -> Eligibility {
    if content.contains(&app.header_component) {
        return Eligibility::AlreadyMigrated;
    }

    let dirs = route_dirs(path, &app.root, &app.route_root);
    if dirs.is_empty() {
        return Eligibility::Excluded(Exclusion::RootIndex);
    }
    if let Some(dir) = dirs.iter().find(|d| app.excluded_dirs.contains(*d)) {
        return Eligibility::Excluded(Exclusion::ExcludedDir(dir.clone()));
    }
    if app.skip_dynamic_routes && dirs.iter().any(|d| is_dynamic_segment(d)) {
        return Eligibility::Excluded(Exclusion::DynamicRoute);
    }

    if !contains_element(content, &app.legacy_layout)
        && !contains_element(content, &app.legacy_header)
    {
        return Eligibility::MissingLegacyPattern;
    }

    Eligibility::Eligible
}
