use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use pbc_stage_trainer::{config, controller, worker};

fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    // Stdout belongs to the progress line; logs go to stderr.
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} - {l} - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))?;

    log4rs::init_config(config)?;

    Ok(())
}

fn main() {
    // Check for worker mode BEFORE building the tokio runtime.
    // The worker is fully synchronous and must not inherit one.
    let args: Vec<String> = std::env::args().collect();
    if config::worker_mode(&args) {
        std::process::exit(worker::runner::run_worker());
    }

    if let Err(e) = setup_logging() {
        eprintln!("Failed to set up logging: {e}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(controller::run());
    std::process::exit(code);
}
