use mdl_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Panics map to a distinct exit code so wrappers can tell them apart
    // from operational failures.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(2);
    }));

    // Initialize logging as early as possible; stdout stays free for the
    // progress renderer.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match CliCommand::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("mdl error: {:#}", err);
            std::process::exit(1);
        }
    }
}
