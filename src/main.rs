//! boq-tools CLI entry point.

use clap::Parser;

use boq_tools::cli::{
    handle_clear_command, handle_export_command, handle_list_command, handle_process_command,
    handle_status_command, init_tracing, Cli, Commands,
};
use boq_tools::config::load_config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(ref path) = cli.config {
        std::env::set_var("BOQ_TOOLS_CONFIG", path);
    }

    let config = load_config();

    let result = match cli.command {
        Commands::Process { file, batch, output } => handle_process_command(file, batch, output, &config),
        Commands::Export { key, path, format } => handle_export_command(key, path, format),
        Commands::List => handle_list_command(),
        Commands::Status => handle_status_command(),
        Commands::Clear => handle_clear_command(),
    };

    if let Err(e) = result {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}
