use clap::Parser;
use host_inventory::cli::Cli;
use host_inventory::commands::handle_hardware_command;
use host_inventory::output::print_error;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = cli.host_options();

    match handle_hardware_command(&cli.command, &opts) {
        Ok(rendered) => print!("{}", rendered),
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
