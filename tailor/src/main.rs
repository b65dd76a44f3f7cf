use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;
mod format;
mod metadata;

/// Tailor - Image Metadata Resolver
///
/// Resolves a docker image reference against a v1 registry and writes what a
/// container started from the image would run to a result file.
#[derive(Parser, Debug)]
#[command(name = "tailor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Image to resolve: docker://[host[:port]]/path[#tag] or name[:tag]
    image: String,

    /// Result file [default: /tmp/result/result.json]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// YAML config file [default: ~/.config/tailor/config.yaml]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Registry host reached over plain HTTP (can be repeated)
    #[arg(long = "insecure-registry", value_name = "HOST")]
    insecure_registries: Vec<String>,

    /// Transport timeout in seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, default_value = "auto")]
    color: String,
}

impl Cli {
    fn overrides(&self) -> context::CliOverrides {
        context::CliOverrides {
            config_path: self.config.clone(),
            output: self.output.clone(),
            insecure_registries: self.insecure_registries.clone(),
            timeout: self.timeout,
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the `-v` count.
fn init_tracing(verbosity: context::VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    init_tracing(verbosity);

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = match context::AppContext::build(
        format::ColorChoice::from(cli.color.as_str()),
        verbosity,
        &cli.overrides(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("✗ {}", format::error_chain(&e));
            return ExitCode::from(1);
        }
    };

    let formatter = format::create_formatter(&ctx);
    match commands::resolve::handle_resolve(&ctx, formatter.as_ref(), &cli.image) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
