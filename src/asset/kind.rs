//! Asset kind definitions.

/// Kind of source asset, one per transform task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Markup,
    Stylesheet,
    Script,
    Image,
    Font,
}

impl AssetKind {
    pub const ALL: [Self; 5] = [
        Self::Markup,
        Self::Stylesheet,
        Self::Script,
        Self::Image,
        Self::Font,
    ];

    /// Task name, also used as the progress counter label.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Stylesheet => "css",
            Self::Script => "js",
            Self::Image => "images",
            Self::Font => "fonts",
        }
    }

    /// Source directory relative to `build.src`.
    pub const fn default_source(self) -> &'static str {
        match self {
            Self::Markup => "",
            Self::Stylesheet => "css",
            Self::Script => "js",
            Self::Image => "images",
            Self::Font => "fonts",
        }
    }

    /// Extension filter; empty accepts every file.
    pub const fn default_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Markup => &["html", "htm"],
            Self::Stylesheet => &["css", "scss"],
            Self::Script => &["js", "mjs"],
            Self::Image | Self::Font => &[],
        }
    }

    /// Output directory relative to `build.dist`.
    pub const fn default_output(self) -> &'static str {
        self.default_source()
    }

    /// Stylesheets and scripts get the `.min` suffix and, when enabled, a fingerprint.
    pub const fn is_hashable(self) -> bool {
        matches!(self, Self::Stylesheet | Self::Script)
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_css_and_js_are_hashable() {
        let hashable: Vec<_> = AssetKind::ALL
            .into_iter()
            .filter(|k| k.is_hashable())
            .collect();
        assert_eq!(hashable, vec![AssetKind::Stylesheet, AssetKind::Script]);
    }

    #[test]
    fn test_names() {
        let names: Vec<_> = AssetKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["html", "css", "js", "images", "fonts"]);
    }
}
