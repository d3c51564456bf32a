//! Graph execution.
//!
//! Each phase of a [`TaskGraph`] runs as one parallel batch on the rayon
//! pool. Inside a transform, files are processed in parallel and then
//! fingerprinted and written serially, so each task owns its partial
//! manifest and no lock is needed. Partial manifests merge into the
//! [`BuildContext`] between phases, before html reads them.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;

use crate::asset::{AssetKind, AssetRoute, Manifest, Processed, minify::MinifyError, process, scan};
use crate::logger::ProgressLine;
use crate::utils::plural_count;
use crate::{debug, log};

use super::{BuildContext, Task, TaskGraph};

/// Result of one transform task.
#[derive(Debug)]
pub struct TaskReport {
    pub task: Task,
    pub written: usize,
    /// Files that produced no output; the task still succeeded.
    pub skipped: Vec<MinifyError>,
    manifest: Manifest,
}

/// Result of a whole graph run.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub reports: Vec<TaskReport>,
}

impl BuildSummary {
    pub fn written(&self) -> usize {
        self.reports.iter().map(|r| r.written).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports.iter().map(|r| r.skipped.len()).sum()
    }

    pub fn ran(&self, task: Task) -> bool {
        self.reports.iter().any(|r| r.task == task)
    }
}

/// Run `graph` phase by phase.
///
/// `clean` and the transforms are executed here; `watch` and `serve` are
/// long-running and left to the caller. The first failing phase stops the
/// run, and the error lists every task that failed in it.
pub fn run_graph(ctx: &mut BuildContext, graph: &TaskGraph) -> Result<BuildSummary> {
    let hashing = ctx.hashing();

    // Without clean, a hashing run extends the mapping of the last hashing build
    if hashing && !graph.contains(Task::Clean) && ctx.manifest().is_empty() {
        ctx.load_manifest()?;
        debug!("build"; "loaded manifest with {}", plural_count(ctx.manifest().len(), "entry"));
    }

    let mut summary = BuildSummary::default();
    for phase in graph.phases() {
        if phase.contains(&Task::Clean) {
            ctx.clean()?;
            log!("clean"; "removed {}", ctx.config().root_relative(&ctx.config().build.dist));
        }

        let kinds: Vec<AssetKind> = phase.iter().filter_map(|t| t.asset_kind()).collect();
        if kinds.is_empty() {
            continue;
        }

        let reports = run_phase(ctx, &kinds)?;
        for mut report in reports {
            ctx.merge(std::mem::take(&mut report.manifest));
            summary.reports.push(report);
        }
    }

    if hashing && (summary.ran(Task::Css) || summary.ran(Task::Js)) {
        ctx.save_manifest()?;
        debug!("build"; "saved {}", ctx.config().root_relative(ctx.config().manifest_path()));
    }

    for report in &summary.reports {
        for error in &report.skipped {
            log!("warning"; "{}: skipped {}", report.task, error);
        }
    }

    if !summary.reports.is_empty() {
        let ran: Vec<AssetKind> = summary
            .reports
            .iter()
            .filter_map(|r| r.task.asset_kind())
            .collect();
        let clients = ctx.notify(&ran);
        if clients > 0 {
            debug!("reload"; "notified {}", plural_count(clients, "client"));
        }
    }

    Ok(summary)
}

/// Run several transforms in parallel and collect their reports.
fn run_phase(ctx: &BuildContext, kinds: &[AssetKind]) -> Result<Vec<TaskReport>> {
    let work: Vec<(AssetKind, Vec<AssetRoute>)> = kinds
        .iter()
        .map(|&kind| (kind, scan(kind, &ctx.config().task_source(kind))))
        .collect();

    let counters: Vec<(&'static str, usize)> = work
        .iter()
        .map(|(kind, routes)| (kind.name(), routes.len()))
        .collect();
    let progress = ProgressLine::new(&counters);

    let results: Vec<(AssetKind, Result<TaskReport>)> = work
        .par_iter()
        .map(|(kind, routes)| (*kind, run_transform(ctx, *kind, routes, &progress)))
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (kind, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => failures.push(format!("{kind}: {e:#}")),
        }
    }

    if !failures.is_empty() {
        drop(progress);
        bail!("{}", failures.join("\n"));
    }
    progress.finish();
    Ok(reports)
}

/// Process every route of one kind and write the outputs.
fn run_transform(
    ctx: &BuildContext,
    kind: AssetKind,
    routes: &[AssetRoute],
    progress: &ProgressLine,
) -> Result<TaskReport> {
    let options = ctx.process_options(kind);
    let output_dir = ctx.config().task_source(kind).output;
    let fingerprint = ctx.hashing() && kind.is_hashable();

    let processed: Vec<Result<Processed>> = routes
        .par_iter()
        .map(|route| {
            let result = process(route, &options);
            progress.inc(kind.name());
            result
        })
        .collect();

    let mut report = TaskReport {
        task: Task::for_kind(kind),
        written: 0,
        skipped: Vec::new(),
        manifest: Manifest::new(),
    };

    for (route, result) in routes.iter().zip(processed) {
        let file = match result.with_context(|| format!("{}", route.source.display()))? {
            Processed::Output(file) => file,
            Processed::Skipped(e) => {
                report.skipped.push(e);
                continue;
            }
        };
        let file = if fingerprint {
            report.manifest.add_hash(file)
        } else {
            file
        };
        let path = file.write_into(&output_dir)?;
        debug!(kind.name(); "{}", ctx.config().root_relative(&path));
        report.written += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    const HTML: &str = "<html>\n<head>\n  <link href=\"css/app.min.css\" rel=\"stylesheet\">\n</head>\n<body>\n  <script src=\"js/main.min.js\"></script>\n</body>\n</html>\n";

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn site(root: &Path) {
        write(root, "src/index.html", HTML);
        write(root, "src/css/app.css", ".btn {\n  color: #ff0000;\n}\n");
        write(root, "src/js/main.js", "function hello(name) { return 'hi ' + name; }\nhello('x');\n");
        write(root, "src/fonts/Inter.woff2", "font");
    }

    fn context(root: &Path, content: &str) -> BuildContext {
        BuildContext::new(Arc::new(test_config_at(root, content))).unwrap()
    }

    fn dist_files(root: &Path, sub: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root.join("dist").join(sub))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_plain_build() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "");
        let summary = run_graph(&mut ctx, &TaskGraph::build(false)).unwrap();

        assert_eq!(summary.written(), 4);
        assert_eq!(dist_files(root, "css"), vec!["app.min.css", "app.min.css.map"]);
        assert_eq!(dist_files(root, "js"), vec!["main.min.js", "main.min.js.map"]);
        assert_eq!(dist_files(root, "fonts"), vec!["Inter.woff2"]);
        assert!(!root.join("dist/manifest.json").exists());

        let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(html.contains("href=\"css/app.min.css\""));
        assert!(!html.contains('\n'));
    }

    #[test]
    fn test_hashing_build_rewrites_html() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nhash = true");
        run_graph(&mut ctx, &TaskGraph::build(true)).unwrap();

        let css = ctx.manifest().get("app.min.css").unwrap().to_string();
        let js = ctx.manifest().get("main.min.js").unwrap().to_string();
        assert_eq!(ctx.manifest().get("app.min"), Some(css.as_str()));
        assert_eq!(dist_files(root, "css"), vec![css.clone(), format!("{css}.map")]);
        assert_eq!(dist_files(root, "js"), vec![js.clone(), format!("{js}.map")]);

        let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(html.contains(&format!("href=\"css/{css}\"")));
        assert!(html.contains(&format!("src=\"js/{js}\"")));
        assert!(root.join("dist/manifest.json").exists());
    }

    #[test]
    fn test_identical_content_identical_names() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        site(first.path());
        site(second.path());

        let mut a = context(first.path(), "[build]\nhash = true");
        let mut b = context(second.path(), "[build]\nhash = true");
        run_graph(&mut a, &TaskGraph::build(true)).unwrap();
        run_graph(&mut b, &TaskGraph::build(true)).unwrap();
        assert_eq!(a.manifest(), b.manifest());
    }

    #[test]
    fn test_standalone_html_reads_saved_manifest() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nhash = true");
        run_graph(&mut ctx, &TaskGraph::build(true)).unwrap();
        let css = ctx.manifest().get("app.min.css").unwrap().to_string();
        fs::remove_file(root.join("dist/index.html")).unwrap();

        let mut fresh = context(root, "[build]\nhash = true");
        run_graph(&mut fresh, &TaskGraph::single(Task::Html)).unwrap();
        let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(html.contains(&format!("href=\"css/{css}\"")));
    }

    #[test]
    fn test_clean_graph_empties_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nhash = true");
        run_graph(&mut ctx, &TaskGraph::build(true)).unwrap();
        assert!(!ctx.manifest().is_empty());

        let summary = run_graph(&mut ctx, &TaskGraph::single(Task::Clean)).unwrap();
        assert!(summary.reports.is_empty());
        assert!(ctx.manifest().is_empty());
        assert!(!root.join("dist").exists());
    }

    #[test]
    fn test_bad_stylesheet_skipped_build_succeeds() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/css/broken.css", ".a..b { color: red }");

        let mut ctx = context(root, "");
        let summary = run_graph(&mut ctx, &TaskGraph::build(false)).unwrap();
        assert_eq!(summary.skipped(), 1);
        assert_eq!(dist_files(root, "css"), vec!["app.min.css", "app.min.css.map"]);
    }

    #[test]
    fn test_scss_sources_build_and_partials_are_skipped() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/css/_theme.scss", "$c: red;");
        write(root, "src/css/app.scss", "@use 'theme';\n.btn { .icon { color: theme.$c; } }\n");
        write(root, "src/css/broken.scss", ".a { color: $missing; }");

        let mut ctx = context(root, "");
        let summary = run_graph(&mut ctx, &TaskGraph::single(Task::Css)).unwrap();
        assert_eq!(summary.written(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(dist_files(root, "css"), vec!["app.min.css", "app.min.css.map"]);

        let css = fs::read_to_string(root.join("dist/css/app.min.css")).unwrap();
        assert!(css.starts_with(".btn .icon{color:red}"));
    }

    #[test]
    fn test_sourcemaps_follow_hashed_names() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nhash = true");
        run_graph(&mut ctx, &TaskGraph::build(true)).unwrap();

        let js = ctx.manifest().get("main.min.js").unwrap().to_string();
        let code = fs::read_to_string(root.join("dist/js").join(&js)).unwrap();
        assert!(code.ends_with(&format!("//# sourceMappingURL={js}.map")));
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(root.join("dist/js").join(format!("{js}.map"))).unwrap())
                .unwrap();
        assert_eq!(map["sources"][0], "main.js");

        let css = ctx.manifest().get("app.min.css").unwrap().to_string();
        let code = fs::read_to_string(root.join("dist/css").join(&css)).unwrap();
        assert!(code.ends_with(&format!("/*# sourceMappingURL={css}.map */")));
    }

    #[test]
    fn test_sourcemaps_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nsourcemap = false");
        run_graph(&mut ctx, &TaskGraph::build(false)).unwrap();
        assert_eq!(dist_files(root, "js"), vec!["main.min.js"]);
        let code = fs::read_to_string(root.join("dist/js/main.min.js")).unwrap();
        assert!(!code.contains("sourceMappingURL"));
    }

    #[test]
    fn test_bad_script_fails_before_html() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);
        write(root, "src/js/broken.js", "function (");

        let mut ctx = context(root, "[build]\nhash = true");
        let err = run_graph(&mut ctx, &TaskGraph::build(true)).unwrap_err();
        assert!(err.to_string().contains("js"));
        assert!(!root.join("dist/index.html").exists());
    }

    #[test]
    fn test_rerun_css_with_hashing_updates_html() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        site(root);

        let mut ctx = context(root, "[build]\nhash = true");
        run_graph(&mut ctx, &TaskGraph::build(true)).unwrap();
        let before = ctx.manifest().get("app.min.css").unwrap().to_string();

        write(root, "src/css/app.css", ".btn { color: blue; }");
        run_graph(&mut ctx, &TaskGraph::rerun(&[Task::Css], true)).unwrap();
        let after = ctx.manifest().get("app.min.css").unwrap().to_string();
        assert_ne!(before, after);

        let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(html.contains(&format!("href=\"css/{after}\"")));
    }
}
