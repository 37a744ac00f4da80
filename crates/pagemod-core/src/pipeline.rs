use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

use crate::codemods::{self, Codemod, MigrateContext};
use crate::config::AppConfig;
use crate::eligibility;
use crate::report::{FileOutcome, RunSummary};
use crate::{walker, writer};

/// What to do with pages the codemods changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Rewrite pages in place
    #[default]
    Write,
    /// Report pages that need migration, write nothing
    Check,
    /// Like `Check`, with the unified diff attached to each outcome
    Diff,
}

/// Walks one app's page tree and migrates each page in turn
pub struct Pipeline {
    ctx: MigrateContext,
    codemods: Vec<Box<dyn Codemod>>,
    mode: Mode,
}

impl Pipeline {
    pub fn new(app: AppConfig) -> Self {
        Self {
            ctx: MigrateContext { app },
            codemods: codemods::default_chain(),
            mode: Mode::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_codemods(mut self, codemods: Vec<Box<dyn Codemod>>) -> Self {
        self.codemods = codemods;
        self
    }

    pub fn app(&self) -> &AppConfig {
        &self.ctx.app
    }

    pub fn run(&self) -> RunSummary {
        self.run_with(|_, _| {})
    }

    /// Process every page under the app root, calling `on_file` as each
    /// outcome is known. Per-file problems end up in the summary; a missing
    /// root gives an empty one.
    pub fn run_with(&self, mut on_file: impl FnMut(&Path, &FileOutcome)) -> RunSummary {
        let app = &self.ctx.app;
        info!("Migrating {} pages under {}", app.label, app.root.display());

        let mut summary = RunSummary::default();
        for path in walker::walk_pages(&app.root, &app.page_file, &app.excluded_dirs) {
            let outcome = self.process_file(&path);
            on_file(&path, &outcome);
            summary.record(path, outcome);
        }

        info!(
            "{}: {} modified, {} skipped",
            app.label, summary.modified, summary.skipped
        );
        summary
    }

    /// Read, check, transform and (in write mode) persist one page
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        debug!("Processing {}", path.display());

        let original = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                return FileOutcome::Failed(e.to_string());
            }
        };

        let eligibility = eligibility::check(&original, path, &self.ctx.app);
        if !eligibility.is_eligible() {
            debug!("{}: {eligibility}", path.display());
            return FileOutcome::Ineligible(eligibility);
        }

        let (content, changed) = match self.transform(path, &original) {
            Ok(result) => result,
            Err(e) => {
                warn!("Skipping {}: {e:#}", path.display());
                return FileOutcome::Failed(format!("{e:#}"));
            }
        };
        let changed = changed && content != original;
        if !changed {
            return FileOutcome::Unchanged;
        }

        match self.mode {
            Mode::Write => match writer::persist(path, &content, changed) {
                Ok(_) => {
                    info!("Migrated {}", path.display());
                    FileOutcome::Modified
                }
                Err(e) => {
                    warn!("Failed to write {}: {e}", path.display());
                    FileOutcome::Failed(format!("failed to write changes: {e}"))
                }
            },
            Mode::Check | Mode::Diff => FileOutcome::WouldModify {
                diff: writer::unified_diff(path, &original, &content),
            },
        }
    }

    /// Run the codemod chain over `content`. The flag is set when any
    /// codemod reported a change.
    pub fn transform(&self, path: &Path, content: &str) -> Result<(String, bool)> {
        let mut content = content.to_string();
        let mut changed = false;
        for codemod in &self.codemods {
            let result = codemod
                .apply(&self.ctx, path, &content)
                .with_context(|| format!("{} failed", codemod.name()))?;
            if let Some(updated) = result {
                debug!("{}: {} applied", path.display(), codemod.name());
                content = updated;
                changed = true;
            }
        }
        Ok((content, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::{Eligibility, Exclusion};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const LEGACY_PAGE: &str = r#"'use client';

import { useState } from 'react';
import { CreatorNavigationAuthenticated } from '../../../components/navigation';
import {
  Card,
  PageLayout,
  SectionHeader,
} from '@ghxstship/ui';

export default function FreightPage() {
  const [open, setOpen] = useState(false);
  return (
    <PageLayout background="black" header={<CreatorNavigationAuthenticated />}>
      <SectionHeader kicker="ATLVS" title="Freight & Logistics" description="Track shipments" />
      <Card onClick={() => setOpen(!open)} />
    </PageLayout>
  );
}
"#;

    const MIGRATED_PAGE: &str = r#"'use client';

import { useState } from 'react';
import { AtlvsAppLayout } from '../../../components/app-layout';
import {
  Card,
  EnterprisePageHeader,
} from '@ghxstship/ui';

export default function FreightPage() {
  const [open, setOpen] = useState(false);
  return (
    <AtlvsAppLayout background="black">
      <EnterprisePageHeader
        title="Freight & Logistics"
        subtitle="Track shipments"
        breadcrumbs={[{ label: 'ATLVS', href: '/dashboard' }, { label: 'Procurement', href: '/procurement' }, { label: 'Freight Tracking' }]}
        views={[{ id: 'default', label: 'Default', icon: 'grid' }]}
        activeView="default"
        showFavorite
        showSettings
      />
      <Card onClick={() => setOpen(!open)} />
    </AtlvsAppLayout>
  );
}
"#;

    struct Tree {
        dir: TempDir,
    }

    impl Tree {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn root(&self) -> PathBuf {
            self.dir.path().join("apps/atlvs/src/app")
        }

        fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
            let path = self.root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
            path
        }

        fn pipeline(&self) -> Pipeline {
            Pipeline::new(AppConfig::new(self.root(), "ATLVS", "AtlvsAppLayout"))
        }
    }

    #[test]
    fn test_migrates_legacy_page() {
        let tree = Tree::new();
        let page = tree.write("procurement/freight-tracking/page.tsx", LEGACY_PAGE);

        let summary = tree.pipeline().run();
        assert_eq!((summary.modified, summary.skipped), (1, 0));
        assert_eq!(fs::read_to_string(page).unwrap(), MIGRATED_PAGE);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let tree = Tree::new();
        let page = tree.write("procurement/freight-tracking/page.tsx", LEGACY_PAGE);
        tree.write("crm/page.tsx", "<SectionHeader title=\"CRM\" />\n");

        let first = tree.pipeline().run();
        assert_eq!(first.modified, 2);
        let after_first = fs::read_to_string(&page).unwrap();

        let second = tree.pipeline().run();
        assert_eq!(second.modified, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(fs::read_to_string(&page).unwrap(), after_first);
        assert!(second.files.iter().all(|(_, outcome)| {
            *outcome == FileOutcome::Ineligible(Eligibility::AlreadyMigrated)
        }));
    }

    #[test]
    fn test_second_run_without_header_replacement() {
        let tree = Tree::new();
        let nested = tree.write(
            "nested/page.tsx",
            "<PageLayout header={<Nav />}><Section><PageLayout nested>inner</PageLayout></Section></PageLayout>\n",
        );
        let pages = [
            nested.clone(),
            tree.write(
                "layout-only/page.tsx",
                "import { Card, PageLayout } from '@ghxstship/ui';\n\n<PageLayout><Card /></PageLayout>\n",
            ),
            tree.write(
                "wrapping/page.tsx",
                "import { Badge, PageLayout, SectionHeader } from '@ghxstship/ui';\n\n<PageLayout><SectionHeader title=\"A\"><Badge /></SectionHeader></PageLayout>\n",
            ),
            tree.write(
                "untitled/page.tsx",
                "<PageLayout><SectionHeader kicker=\"Quick\" /></PageLayout>\n",
            ),
        ];
        let read_all = || -> Vec<String> {
            pages
                .iter()
                .map(|page| fs::read_to_string(page).unwrap())
                .collect()
        };

        let first = tree.pipeline().run();
        assert_eq!((first.modified, first.skipped), (4, 0));
        let after_first = read_all();
        assert!(after_first.iter().all(|content| !content.contains("<PageLayout")));
        assert_eq!(
            fs::read_to_string(&nested).unwrap(),
            "import { AtlvsAppLayout } from '@/components/app-layout';\n\
             <AtlvsAppLayout><Section><AtlvsAppLayout nested>inner</AtlvsAppLayout></Section></AtlvsAppLayout>\n"
        );

        let second = tree.pipeline().run();
        assert_eq!((second.modified, second.skipped), (0, 4));
        assert_eq!(read_all(), after_first);
        assert_eq!(tree.pipeline().with_mode(Mode::Check).run().pending, 0);
    }

    #[test]
    fn test_untitled_header_before_titled_one() {
        let tree = Tree::new();
        let page = tree.write(
            "crm/page.tsx",
            "<SectionHeader kicker=\"Quick\" />\n<SectionHeader title=\"CRM\" description=\"d\" />\n",
        );

        let first = tree.pipeline().run();
        assert_eq!(first.modified, 1);
        let migrated = fs::read_to_string(&page).unwrap();
        assert!(migrated.starts_with("<SectionHeader kicker=\"Quick\" />\n<EnterprisePageHeader\n  title=\"CRM\"\n  subtitle=\"d\"\n"));

        let second = tree.pipeline().run();
        assert_eq!(second.modified, 0);
        assert_eq!(fs::read_to_string(&page).unwrap(), migrated);
    }

    #[test]
    fn test_crlf_page_stays_crlf() {
        let tree = Tree::new();
        let page = tree.write(
            "procurement/freight-tracking/page.tsx",
            LEGACY_PAGE.replace('\n', "\r\n"),
        );

        tree.pipeline().run();
        assert_eq!(
            fs::read_to_string(page).unwrap(),
            MIGRATED_PAGE.replace('\n', "\r\n")
        );
    }

    #[test]
    fn test_skip_on_absence_leaves_file_identical() {
        let tree = Tree::new();
        let content = "export default function Plain() {\n  return <Section />;\n}\n";
        let page = tree.write("plain/page.tsx", content);

        let summary = tree.pipeline().run();
        assert_eq!((summary.modified, summary.skipped), (0, 1));
        assert_eq!(
            summary.files[0].1,
            FileOutcome::Ineligible(Eligibility::MissingLegacyPattern)
        );
        assert_eq!(fs::read_to_string(page).unwrap(), content);
    }

    #[test]
    fn test_bad_file_does_not_stop_the_run() {
        let tree = Tree::new();
        tree.write("a/page.tsx", LEGACY_PAGE);
        let bad = tree.write("b/page.tsx", [0xff, 0xfe, b'<', 0x80]);
        tree.write("c/page.tsx", LEGACY_PAGE);

        let summary = tree.pipeline().run();
        assert_eq!(summary.modified, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        let failures: Vec<_> = summary.failures().map(|(path, _)| path.clone()).collect();
        assert_eq!(failures, vec![bad]);
    }

    #[test]
    fn test_malformed_markup_fails_only_that_file() {
        let tree = Tree::new();
        let broken = tree.write("broken/page.tsx", "<PageLayout header={<Nav />\n");
        tree.write("ok/page.tsx", LEGACY_PAGE);

        let summary = tree.pipeline().run();
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.failed, 1);
        let (_, msg) = summary.failures().next().unwrap();
        assert!(msg.starts_with("layout-import failed"), "{msg}");
        assert_eq!(
            fs::read_to_string(broken).unwrap(),
            "<PageLayout header={<Nav />\n"
        );
    }

    #[test]
    fn test_exclusions_are_reported() {
        let tree = Tree::new();
        tree.write("page.tsx", LEGACY_PAGE);
        tree.write("projects/[id]/page.tsx", LEGACY_PAGE);
        // Pruned during the walk, never visited
        tree.write("auth/login/page.tsx", LEGACY_PAGE);

        let summary = tree.pipeline().run();
        let outcomes: Vec<_> = summary.files.iter().map(|(_, o)| o.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                FileOutcome::Ineligible(Eligibility::Excluded(Exclusion::RootIndex)),
                FileOutcome::Ineligible(Eligibility::Excluded(Exclusion::DynamicRoute)),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tree = Tree::new();
        let summary = tree.pipeline().run();
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_check_mode_writes_nothing() {
        let tree = Tree::new();
        let page = tree.write("procurement/freight-tracking/page.tsx", LEGACY_PAGE);

        let summary = tree.pipeline().with_mode(Mode::Check).run();
        assert_eq!((summary.modified, summary.pending), (0, 1));
        assert_eq!(fs::read_to_string(&page).unwrap(), LEGACY_PAGE);

        let FileOutcome::WouldModify { diff } = &summary.files[0].1 else {
            panic!("expected a pending migration");
        };
        assert!(diff.contains("-    <PageLayout background=\"black\""));
        assert!(diff.contains("+    <AtlvsAppLayout background=\"black\">"));
    }

    #[test]
    fn test_custom_chain_and_callback() {
        struct Shout;
        impl Codemod for Shout {
            fn name(&self) -> &'static str {
                "shout"
            }
            fn apply(&self, _: &MigrateContext, _: &Path, content: &str) -> Result<Option<String>> {
                Ok(Some(content.to_uppercase()))
            }
        }

        let tree = Tree::new();
        let page = tree.write("crm/page.tsx", "<SectionHeader title=\"x\" />");
        let mut seen = Vec::new();
        let summary = tree
            .pipeline()
            .with_codemods(vec![Box::new(Shout)])
            .run_with(|path, outcome| seen.push((path.to_path_buf(), outcome.clone())));

        assert_eq!(summary.files, seen);
        assert_eq!(fs::read_to_string(page).unwrap(), "<SECTIONHEADER TITLE=\"X\" />");
    }
}
