use anyhow::Result;
use aurl_tap::commands::{self, config::Config};
use aurl_tap::platform::{BitWidth, Host};
use clap::Parser;
use std::path::PathBuf;

/// aurl-tap - Homebrew tap definitions for aurl
///
/// Resolve which release artifact a host should install, render the Cask and
/// Formula files, and run the post-install check.
///
/// Examples:
///   aurl-tap resolve aurl-v2-alpha                    # Artifact for this machine
///   aurl-tap resolve aurl-v2-alpha --os linux --arch i686
///   aurl-tap render --output ./tap                    # Regenerate the tap files
#[derive(Parser, Debug)]
#[command(author, version = env!("AURL_TAP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with extra definitions, merged over the built-in ones
    #[arg(
        long = "definitions",
        short = 'd',
        env = "AURL_TAP_DEFINITIONS",
        value_name = "FILE",
        global = true
    )]
    pub definitions: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List all definitions
    List,

    /// Show the release artifact a definition provides for a host
    Resolve(ResolveArgs),

    /// Render definitions as Homebrew Ruby files
    Render(RenderArgs),

    /// Run the post-install check against an installed binary
    Check(CheckArgs),
}

/// Target host; each part defaults to the current machine
#[derive(clap::Args, Debug)]
pub struct HostArgs {
    /// Operating system (macos, darwin, linux)
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// CPU architecture (arm64, aarch64, x86_64, amd64, i386, i686)
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Bit width, overriding the one implied by --arch
    #[arg(long, value_name = "32|64")]
    pub bits: Option<BitWidth>,
}

impl HostArgs {
    fn host(&self) -> Result<Host> {
        Host::detect_with_overrides(self.os.as_deref(), self.arch.as_deref(), self.bits)
    }
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Definition id, e.g. "aurl-v2-alpha"
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub host: HostArgs,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Definitions to render (default: all)
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    /// Write files in tap layout under this directory instead of printing
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Definition id, e.g. "aurl-v2-alpha"
    #[arg(value_name = "ID")]
    pub id: String,

    /// Directory the binary was installed into
    #[arg(long, value_name = "DIR")]
    pub bin_dir: PathBuf,

    #[command(flatten)]
    pub host: HostArgs,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = aurl_tap::runtime::RealRuntime;
    let config = Config::new(runtime, cli.definitions)?;

    match cli.command {
        Commands::List => commands::list(&config.catalog)?,
        Commands::Resolve(args) => {
            let host = args.host.host()?;
            commands::resolve(&config.catalog, &args.id, &host, args.json)?
        }
        Commands::Render(args) => {
            commands::render(
                &config.runtime,
                &config.catalog,
                &args.ids,
                args.output.as_deref(),
            )?;
        }
        Commands::Check(args) => {
            let host = args.host.host()?;
            commands::check(
                &config.runtime,
                &config.catalog,
                &args.id,
                &host,
                &args.bin_dir,
            )?
        }
    }
    Ok(())
}
