use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Config file looked up in the working directory when `--config` is not given
pub const CONFIG_FILE: &str = "pagemod.toml";

/// Top-level pagemod.toml: one `[apps.<name>]` table per web app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub apps: BTreeMap<String, AppConfig>,
}

/// Everything the pipeline needs to know about one app's page tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the page tree (e.g. `apps/atlvs/src/app`)
    pub root: PathBuf,

    /// Display name used as the first breadcrumb (e.g. `ATLVS`)
    pub label: String,

    /// App-specific layout wrapper that replaces the legacy layout
    pub layout_component: String,

    /// Directory names pruned from traversal and rejected by the filter
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// File name that marks a routed page
    #[serde(default = "default_page_file")]
    pub page_file: String,

    /// Module the UI components are imported from
    #[serde(default = "default_ui_module")]
    pub ui_module: String,

    /// Standard page header; its presence marks a page as migrated
    #[serde(default = "default_header_component")]
    pub header_component: String,

    #[serde(default = "default_legacy_layout")]
    pub legacy_layout: String,

    #[serde(default = "default_legacy_header")]
    pub legacy_header: String,

    /// Link target of the first breadcrumb
    #[serde(default = "default_home_href")]
    pub home_href: String,

    /// Directory name below which path segments become routes
    #[serde(default = "default_route_root")]
    pub route_root: String,

    /// Leave `[param]` route pages for a separate pass
    #[serde(default = "default_true")]
    pub skip_dynamic_routes: bool,
}

fn default_excluded_dirs() -> Vec<String> {
    ["auth", "api", "node_modules", ".next"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_page_file() -> String {
    "page.tsx".to_string()
}

fn default_ui_module() -> String {
    "@ghxstship/ui".to_string()
}

fn default_header_component() -> String {
    "EnterprisePageHeader".to_string()
}

fn default_legacy_layout() -> String {
    "PageLayout".to_string()
}

fn default_legacy_header() -> String {
    "SectionHeader".to_string()
}

fn default_home_href() -> String {
    "/dashboard".to_string()
}

fn default_route_root() -> String {
    "app".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Create an app config with every optional field at its default
    pub fn new(
        root: impl Into<PathBuf>,
        label: impl Into<String>,
        layout_component: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            label: label.into(),
            layout_component: layout_component.into(),
            excluded_dirs: default_excluded_dirs(),
            page_file: default_page_file(),
            ui_module: default_ui_module(),
            header_component: default_header_component(),
            legacy_layout: default_legacy_layout(),
            legacy_header: default_legacy_header(),
            home_href: default_home_href(),
            route_root: default_route_root(),
            skip_dynamic_routes: true,
        }
    }
}

impl Config {
    /// Built-in mapping for the ATLVS and COMPVSS apps of the monorepo.
    /// Roots are relative to the monorepo root.
    pub fn builtin() -> Self {
        let mut apps = BTreeMap::new();
        apps.insert(
            "atlvs".to_string(),
            AppConfig::new("apps/atlvs/src/app", "ATLVS", "AtlvsAppLayout"),
        );
        apps.insert(
            "compvss".to_string(),
            AppConfig::new("apps/compvss/src/app", "COMPVSS", "CompvssAppLayout"),
        );
        Self { apps }
    }

    /// Parse a config from TOML text. Roots are left as written.
    pub fn from_toml_str(s: &str, origin: &Path) -> Result<Self> {
        toml::from_str(s).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a config file; relative roots are resolved against its directory
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved(base))
    }

    /// Load `explicit` (relative to `cwd`), else `./pagemod.toml`, else the
    /// built-in mapping.
    /// Returns the config together with the file it came from.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let path = cwd.join(path);
            return Ok((Self::from_file(&path)?, Some(path)));
        }

        let local = cwd.join(CONFIG_FILE);
        if local.is_file() {
            debug!("Using config {}", local.display());
            return Ok((Self::from_file(&local)?, Some(local)));
        }

        debug!("No {CONFIG_FILE} found, using built-in apps");
        Ok((Self::builtin().resolved(cwd), None))
    }

    /// Join every relative root onto `base`
    pub fn resolved(mut self, base: &Path) -> Self {
        for app in self.apps.values_mut() {
            if app.root.is_relative() {
                app.root = base.join(&app.root);
            }
        }
        self
    }

    /// Pick the named apps, or all of them when `names` is empty
    pub fn select(&self, names: &[String]) -> Result<Vec<(String, AppConfig)>> {
        if self.apps.is_empty() {
            return Err(Error::NoApps);
        }
        if names.is_empty() {
            return Ok(self
                .apps
                .iter()
                .map(|(name, app)| (name.clone(), app.clone()))
                .collect());
        }
        names
            .iter()
            .map(|name| {
                self.apps
                    .get(name)
                    .map(|app| (name.clone(), app.clone()))
                    .ok_or_else(|| Error::UnknownApp(name.clone()))
            })
            .collect()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
