//! Source assets and their transforms.
//!
//! - `kind` / `route` / `scan` - what to process and where it goes
//! - `process` - per-kind transform chains
//! - `scss` / `minify` / `markup` / `image` - format-specific operations
//! - `manifest` / `rewrite` - fingerprinting and markup reference updates

mod image;
mod kind;
mod manifest;
mod markup;
pub mod minify;
mod output;
mod process;
mod rewrite;
mod route;
mod scan;
mod scss;

pub use kind::AssetKind;
pub use manifest::Manifest;
pub use output::OutputFile;
pub use process::{ProcessOptions, Processed, process};
pub use rewrite::update_html_references;
pub use route::AssetRoute;
pub use scan::scan;
