use tracing::error;
use tracing_subscriber::EnvFilter;
use xmltree2xml::cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = Cli::run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
