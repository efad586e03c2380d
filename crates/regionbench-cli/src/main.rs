use clap::{Arg, Command};
use regionbench_cli::{logging, run, Settings};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = Command::new("regionbench")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Benchmark a ledger-backed spatial index")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Settings file (defaults to $REGIONBENCH_CONFIG, then ./regionbench.toml)"),
        )
        .get_matches();

    logging::init();

    let settings = match Settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:?}");
            return ExitCode::FAILURE;
        }
    };

    match run(&settings).await {
        Ok(report) => {
            println!("{}", report.config);
            for output in &report.outputs {
                println!("  {:<20} {:>6} rows  {}", output.kind.label(), output.rows, output.path.display());
            }
            println!("{} rows in {}ms", report.total_rows(), report.elapsed_ms);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
