//! Per-build context.
//!
//! Owns the filename manifest for one build invocation (or one dev session),
//! so no manifest state outlives the context that created it.

use anyhow::{Context, Result, anyhow};
use lightningcss::targets::Targets;
use std::fs;
use std::sync::Arc;

use crate::asset::{AssetKind, Manifest, ProcessOptions, minify::css_targets};
use crate::config::SiteConfig;
use crate::reload::{ReloadHandle, ReloadMessage};

pub struct BuildContext {
    config: Arc<SiteConfig>,
    manifest: Manifest,
    targets: Targets,
    reload: Option<ReloadHandle>,
}

impl BuildContext {
    pub fn new(config: Arc<SiteConfig>) -> Result<Self> {
        let browsers = config
            .build
            .browser_targets()
            .map_err(|e| anyhow!("build.targets: {e}"))?;
        Ok(Self {
            targets: css_targets(&browsers),
            config,
            manifest: Manifest::new(),
            reload: None,
        })
    }

    /// Broadcast reload messages after each run.
    pub fn with_reload(mut self, handle: ReloadHandle) -> Self {
        self.reload = Some(handle);
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn hashing(&self) -> bool {
        self.config.build.hash
    }

    /// Remove the output tree and forget every manifest entry.
    pub fn clean(&mut self) -> Result<()> {
        let dist = &self.config.build.dist;
        if dist.exists() {
            fs::remove_dir_all(dist)
                .with_context(|| format!("Failed to remove {}", dist.display()))?;
        }
        self.manifest.clear();
        Ok(())
    }

    /// Merge entries produced by a css or js task.
    pub fn merge(&mut self, entries: Manifest) {
        self.manifest.extend(entries);
    }

    /// Replace the manifest with the one on disk from the last hashing build.
    pub fn load_manifest(&mut self) -> Result<()> {
        self.manifest = Manifest::load(&self.config.manifest_path())?;
        Ok(())
    }

    pub fn save_manifest(&self) -> Result<()> {
        self.manifest.save(&self.config.manifest_path())
    }

    pub(super) fn process_options(&self, kind: AssetKind) -> ProcessOptions<'_> {
        let rewrite = (kind == AssetKind::Markup && self.hashing()).then_some(&self.manifest);
        ProcessOptions {
            min_suffix: &self.config.build.min_suffix,
            source_maps: self.config.build.sourcemap,
            targets: self.targets,
            rewrite,
        }
    }

    /// Tell connected browsers what changed.
    ///
    /// Stylesheet-only changes swap stylesheets in place unless names are
    /// fingerprinted, in which case the page must reload to pick up new markup.
    pub fn notify(&self, kinds: &[AssetKind]) -> usize {
        let Some(reload) = &self.reload else {
            return 0;
        };
        if kinds.is_empty() {
            return 0;
        }
        let css_only = kinds.iter().all(|k| *k == AssetKind::Stylesheet);
        let message = if css_only && !self.hashing() {
            ReloadMessage::Css
        } else {
            ReloadMessage::Reload
        };
        reload.broadcast(message)
    }
}
