//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use qtbuild::util::shell::ColorChoice;

/// qtbuild - Build Qt-based Python extension modules and bundle Qt into wheels
#[derive(Parser)]
#[command(name = "qtbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to use colours
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the .pro files and Makefiles for a project and build it
    Build(BuildArgs),

    /// Build a project and install it
    Install(InstallArgs),

    /// Bundle a Qt installation with a wheel
    Bundle(BundleArgs),

    /// Create a wheel containing the parts of Qt a package needs
    QtWheel(QtWheelArgs),

    /// Show what qmake reports about a Qt installation
    Query(QueryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments shared by `build` and `install`.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Path to QtBuild.toml (default: search from the current directory)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Path to qmake
    #[arg(long, env = "QTBUILD_QMAKE")]
    pub qmake: Option<PathBuf>,

    /// The qmake spec to build with
    #[arg(long)]
    pub spec: Option<String>,

    /// Number of parallel make jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extra `NAME += VALUE` line for every .pro file (may be repeated)
    #[arg(long = "qmake-setting", value_name = "SETTING")]
    pub qmake_settings: Vec<String>,

    /// Directory the modules are installed into (default: `install` next to
    /// the manifest)
    #[arg(long)]
    pub target_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Generate the Makefiles but don't run make
    #[arg(long)]
    pub no_make: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments controlling the DLLs bundled on Windows.
#[derive(Args, Debug)]
pub struct WindowsArgs {
    /// Don't bundle the MSVC runtime
    #[arg(long)]
    pub no_msvc_runtime: bool,

    /// Don't bundle OpenSSL
    #[arg(long)]
    pub no_openssl: bool,

    /// Bundle the OpenSSL DLLs from this directory
    #[arg(long)]
    pub openssl_dir: Option<PathBuf>,

    /// Directory containing the default MSVC runtime and OpenSSL DLLs
    #[arg(long)]
    pub dlls_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// The wheel to bundle Qt with
    pub wheel: PathBuf,

    /// The Qt installation, eg. ~/Qt/6.5.2/gcc_64
    #[arg(long)]
    pub qt_dir: PathBuf,

    /// Directory to write the new wheel to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Appended to the Qt version to form the build tag
    #[arg(long)]
    pub build_tag_suffix: Option<String>,

    /// Qt component not to bundle (may be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Ignore files missing from the Qt installation
    #[arg(long)]
    pub ignore_missing: bool,

    /// Thin a universal2 wheel to this architecture (arm64 or x86_64)
    #[arg(long)]
    pub arch: Option<String>,

    #[command(flatten)]
    pub windows: WindowsArgs,
}

#[derive(Args, Debug)]
pub struct QtWheelArgs {
    /// The package the wheel is for, eg. PyQt6
    pub package: String,

    /// The Qt installation, eg. ~/Qt/6.5.2/gcc_64
    #[arg(long)]
    pub qt_dir: PathBuf,

    /// Directory to write the wheel to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// The build tag of the wheel
    #[arg(long)]
    pub build_tag: Option<String>,

    /// Qt component not to include (may be repeated)
    #[arg(long)]
    pub exclude: Vec<String>,

    #[command(flatten)]
    pub windows: WindowsArgs,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Path to qmake
    #[arg(long, env = "QTBUILD_QMAKE")]
    pub qmake: Option<PathBuf>,

    /// Print the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
