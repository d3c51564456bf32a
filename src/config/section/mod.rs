//! Configuration section definitions.
//!
//! Each module corresponds to a section in `lander.toml`:
//!
//! | Module     | TOML Section   | Purpose                                 |
//! |------------|----------------|-----------------------------------------|
//! | `build`    | `[build]`      | Source/output trees, hashing, targets   |
//! | `serve`    | `[serve]`      | Development server and live reload      |
//! | `identity` | `[identity]`   | Signup/login endpoint and session file  |

pub mod build;
mod identity;
mod serve;

pub use build::{Browser, BuildConfig, TaskSource, TaskSourceConfig};
pub use identity::IdentityConfig;
pub use serve::ServeConfig;
