//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Asset pipeline and dev server for static landing sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: lander.toml)
    #[arg(short = 'C', long, global = true, default_value = "lander.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand; `dev` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Remove the output directory
    Clean,

    /// Minify markup into the output directory
    Html {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Prefix and minify stylesheets
    Css {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Minify and mangle scripts
    Js {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Optimize images
    Images,

    /// Copy fonts
    Fonts,

    /// Clean, then run every asset task
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then serve the output with watch and live reload
    #[command(visible_alias = "d")]
    Dev {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Open the site in the default browser
        #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        open: Option<bool>,
    },

    /// Log in or register against the identity endpoint
    #[command(visible_alias = "a")]
    Auth {
        #[command(flatten)]
        args: AuthArgs,
    },
}

/// Shared arguments for commands that write css/js/html
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Fingerprint css/js filenames and rewrite html references
    #[arg(short = 'H', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub hash: Option<bool>,
}

/// Auth command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Account email
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Forget the stored session and exit
    #[arg(long)]
    pub logout: bool,
}

/// Subcommand used when none is given.
static DEFAULT_COMMAND: Commands = Commands::Dev {
    build_args: BuildArgs { hash: None },
    interface: None,
    port: None,
    watch: None,
    open: None,
};

impl Cli {
    /// The requested subcommand, defaulting to `dev`.
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&DEFAULT_COMMAND)
    }

    pub fn is_dev(&self) -> bool {
        matches!(self.command(), Commands::Dev { .. })
    }
}

impl Commands {
    /// Build arguments, for commands that take them.
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match self {
            Self::Html { build_args }
            | Self::Css { build_args }
            | Self::Js { build_args }
            | Self::Build { build_args }
            | Self::Dev { build_args, .. } => Some(build_args),
            Self::Clean | Self::Images | Self::Fonts | Self::Auth { .. } => None,
        }
    }
}
