use std::process::ExitCode;

use log::{debug, info};
use waiter::server::config::Cli;
use waiter::server::error::ServerError;
use waiter::server::resolver::Resolver;
use waiter::server::HttpServer;

fn main() -> ExitCode {
    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    waiter::logger::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Fatal: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ServerError> {
    let config = Resolver::default().resolve(&cli)?;
    info!("Starting Waiter with config: {:?}", config);

    let server = HttpServer::new(&config)?;
    println!("\n☕ Serving on http://localhost:{} ☕", server.local_addr()?.port());

    server.run();
    Ok(())
}
