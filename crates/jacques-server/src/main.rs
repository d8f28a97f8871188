mod cli;
mod commands;
mod logging;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    #[cfg(unix)]
    reset_sigpipe();

    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::run(&cli, args),
        Commands::Scan => commands::scan::run(&cli),
        Commands::Archive(args) => commands::archive::run(&cli, args),
        Commands::Search(args) => commands::search::run(&cli, args),
        Commands::Doctor => commands::doctor::run(&cli),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
