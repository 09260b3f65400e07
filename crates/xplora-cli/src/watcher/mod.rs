// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for hot reload.
//!
//! [`FileWatcher`] turns debounced notify events into batches of
//! project-relative paths. [`HotReloader`] consumes those batches, refreshes
//! the shared site state and tells browsers what to do.
//!
//! # Batch handling
//!
//! - stylesheet changes rebuild the CSS and send one `css` notification
//! - layout changes reload the layout and then count as a source change
//! - any source change reloads every page and sends one `reload`
//!
//! A batch that has both style and source changes only sends `reload`, since
//! the full reload picks up the new stylesheet anyway.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use tokio::sync::mpsc;
use xplora::pages::LAYOUT_FILE;
use xplora::SiteState;

use crate::css::CssBuilder;
use crate::server::livereload::{Notification, NotificationSender};

const DEBOUNCE: Duration = Duration::from_millis(100);

const IGNORED: &[&str] = &["**/.*", "**/.*/**", "**/node_modules/**"];

/// Builds the set of paths the watcher never reports.
pub fn ignore_set() -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in IGNORED {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Watches a directory tree and reports changed files in batches.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl FileWatcher {
    /// Starts watching `path` recursively.
    ///
    /// `on_change` receives each debounced batch, with paths relative to
    /// `base_path`, deduplicated and sorted. Dotfiles and `node_modules` are
    /// filtered out.
    pub fn new<F>(path: &Path, base_path: PathBuf, on_change: F) -> anyhow::Result<Self>
    where
        F: Fn(Vec<PathBuf>) + Send + 'static,
    {
        let ignored = ignore_set()?;

        let mut debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let mut changed: Vec<PathBuf> = events
                        .iter()
                        .filter(|e| !e.kind.is_access())
                        .flat_map(|e| e.paths.iter())
                        .map(|p| p.strip_prefix(&base_path).unwrap_or(p).to_path_buf())
                        .filter(|p| !ignored.is_match(p))
                        .collect();
                    changed.sort();
                    changed.dedup();

                    if !changed.is_empty() {
                        on_change(changed);
                    }
                }
                Err(errors) => {
                    for e in errors {
                        tracing::warn!("Watch error: {}", e);
                    }
                }
            }
        })?;

        debouncer.watch(path, RecursiveMode::Recursive)?;
        tracing::debug!("Watching {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
        })
    }

    /// Starts watching and forwards batches into an async channel.
    pub fn with_channel(
        path: &Path,
        base_path: PathBuf,
    ) -> anyhow::Result<(Self, mpsc::UnboundedReceiver<Vec<PathBuf>>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = Self::new(path, base_path, move |paths| {
            // Receiver gone means the server is shutting down
            let _ = tx.send(paths);
        })?;
        Ok((watcher, rx))
    }
}

/// What a changed file affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A stylesheet.
    Style,
    /// The shared layout.
    Layout,
    /// Anything else under the source tree.
    Source,
}

impl ChangeKind {
    /// Classifies a project-relative path.
    pub fn classify(path: &Path) -> Self {
        if path.extension().and_then(|e| e.to_str()) == Some("css") {
            ChangeKind::Style
        } else if path.to_string_lossy().replace('\\', "/") == LAYOUT_FILE {
            ChangeKind::Layout
        } else {
            ChangeKind::Source
        }
    }
}

/// Applies change batches to the site state and broadcasts notifications.
pub struct HotReloader {
    site: Arc<SiteState>,
    css: CssBuilder,
    tx: NotificationSender,
}

impl HotReloader {
    /// Creates a reloader.
    pub fn new(site: Arc<SiteState>, css: CssBuilder, tx: NotificationSender) -> Self {
        Self { site, css, tx }
    }

    /// Handles one batch and returns what was broadcast.
    pub async fn handle_changes(&self, paths: &[PathBuf]) -> Vec<Notification> {
        let mut style = false;
        let mut layout = false;
        let mut source = false;

        for path in paths {
            let kind = ChangeKind::classify(path);
            tracing::info!("Changed: {} ({:?})", path.display(), kind);
            match kind {
                ChangeKind::Style => style = true,
                ChangeKind::Layout => layout = true,
                ChangeKind::Source => source = true,
            }
        }

        if layout {
            let present = self.site.reload_layout().await;
            tracing::debug!("Layout reloaded (present: {})", present);
            source = true;
        }

        let mut notifications = Vec::new();

        if style {
            match self.css.build().await {
                Ok(outcome) => {
                    tracing::debug!("CSS step: {:?}", outcome);
                    if !source {
                        notifications.push(Notification::Css);
                    }
                }
                Err(e) => tracing::error!("CSS build failed: {}", e),
            }
        }

        if source {
            match self.site.reload_pages().await {
                Ok(count) => tracing::debug!("Reloaded {} pages", count),
                Err(e) => {
                    tracing::error!("Failed to reload pages: {}", e);
                    tracing::debug!("Still serving the previous route table");
                }
            }
            notifications.push(Notification::Reload);
        }

        for notification in &notifications {
            // No receivers just means no browser is connected
            let _ = self.tx.send(*notification);
        }

        notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::livereload::channel;
    use std::fs;
    use tempfile::tempdir;
    use xplora::config::ResolvedConfig;
    use xplora::TemplateLoader;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn reloader(root: &Path) -> (HotReloader, Arc<SiteState>, NotificationSender) {
        let site = Arc::new(SiteState::new(root, Arc::new(TemplateLoader::new())));
        let css = CssBuilder::new(root, &ResolvedConfig::default());
        let tx = channel();
        (HotReloader::new(site.clone(), css, tx.clone()), site, tx)
    }

    #[test]
    fn test_classify() {
        assert_eq!(ChangeKind::classify(Path::new("src/app/styles.css")), ChangeKind::Style);
        assert_eq!(ChangeKind::classify(Path::new("src/app/layout.html")), ChangeKind::Layout);
        assert_eq!(ChangeKind::classify(Path::new("src/app/about/page.html")), ChangeKind::Source);
        assert_eq!(ChangeKind::classify(Path::new("src/lib/util.ts")), ChangeKind::Source);
    }

    #[test]
    fn test_ignore_set() {
        let set = ignore_set().unwrap();
        assert!(set.is_match("src/app/.page.html.swp"));
        assert!(set.is_match("src/.cache/x.html"));
        assert!(set.is_match("src/node_modules/pkg/index.js"));
        assert!(!set.is_match("src/app/page.html"));
    }

    #[tokio::test]
    async fn test_watcher_reports_relative_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        let (_watcher, mut rx) =
            FileWatcher::with_channel(&dir.path().join("src"), dir.path().to_path_buf()).unwrap();

        write(dir.path(), "src/app/page.html", "<p>home</p>");

        let batch = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(batch.iter().all(|p| p.is_relative()));
        assert!(batch.contains(&PathBuf::from("src/app/page.html")));
    }

    #[tokio::test]
    async fn test_failed_page_reload_still_sends_reload() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/app/page.html", "<p>home</p>");
        let (reloader, site, _tx) = reloader(dir.path());
        site.reload_pages().await.unwrap();
        assert_eq!(site.pages().len(), 1);

        // A file where the manifest directory belongs makes the reload fail
        fs::remove_dir_all(dir.path().join(".xplora")).unwrap();
        fs::write(dir.path().join(".xplora"), "").unwrap();
        write(dir.path(), "src/app/about/page.html", "<p>about</p>");
        let sent = reloader.handle_changes(&[PathBuf::from("src/app/about/page.html")]).await;

        assert_eq!(sent, vec![Notification::Reload]);
        assert_eq!(site.pages().len(), 1);
    }

    #[tokio::test]
    async fn test_style_change_sends_one_css() {
        let dir = tempdir().unwrap();
        let (reloader, _, tx) = reloader(dir.path());
        let mut rx = tx.subscribe();

        let sent = reloader
            .handle_changes(&[PathBuf::from("src/app/a.css"), PathBuf::from("src/app/b.css")])
            .await;

        assert_eq!(sent, vec![Notification::Css]);
        assert_eq!(rx.try_recv().unwrap(), Notification::Css);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_source_change_reloads_pages_once() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/app/page.html", "<p>home</p>");
        let (reloader, site, tx) = reloader(dir.path());
        let mut rx = tx.subscribe();
        assert!(site.pages().is_empty());

        write(dir.path(), "src/app/about/page.html", "<p>about</p>");
        let sent = reloader
            .handle_changes(&[
                PathBuf::from("src/app/page.html"),
                PathBuf::from("src/app/about/page.html"),
                PathBuf::from("src/app/styles.css"),
            ])
            .await;

        assert_eq!(sent, vec![Notification::Reload]);
        assert_eq!(rx.try_recv().unwrap(), Notification::Reload);
        assert!(rx.try_recv().is_err());
        assert_eq!(site.pages().len(), 2);
    }

    #[tokio::test]
    async fn test_layout_change_reloads_layout_and_pages() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/app/page.html", "<p>home</p>");
        let (reloader, site, _tx) = reloader(dir.path());
        assert!(site.layout().is_none());

        write(dir.path(), LAYOUT_FILE, "<main>{{ children }}</main>");
        let sent = reloader.handle_changes(&[PathBuf::from(LAYOUT_FILE)]).await;

        assert_eq!(sent, vec![Notification::Reload]);
        assert!(site.layout().is_some());
        assert_eq!(site.pages().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_css_sends_nothing() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/app/styles.css", "body {}");
        let site = Arc::new(SiteState::new(dir.path(), Arc::new(TemplateLoader::new())));
        let css = CssBuilder::new(dir.path(), &ResolvedConfig::default())
            .with_command("xplora-definitely-not-a-css-compiler");
        let reloader = HotReloader::new(site, css, channel());

        let sent = reloader.handle_changes(&[PathBuf::from("src/app/styles.css")]).await;
        assert!(sent.is_empty());
    }
}
