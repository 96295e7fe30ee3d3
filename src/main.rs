use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("atsaver=info,warn"),
            1 => EnvFilter::new("atsaver=debug,info"),
            _ => EnvFilter::new("atsaver=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = atsaver::cli::Args::parse();
    setup_logging(args.verbose, args.quiet);
    if let Err(e) = atsaver::cli::run(&args) {
        tracing::error!("{}", e);
        if args.verbose > 0 {
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  cause: {}", s);
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
