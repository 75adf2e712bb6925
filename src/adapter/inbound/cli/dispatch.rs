//! Routes parsed commands to their handlers.

use crate::adapter::inbound::cli::command::{
    CheckCommand, Cli, ColorChoice, Commands, ConfigCommand,
};
use crate::adapter::inbound::cli::output::{self, OutputConfig};
use crate::adapter::inbound::cli::session::SessionOptions;
use crate::adapter::inbound::cli::{
    apod, catalog, characters, check, config, favorites, gifs, serve,
};
use crate::error::Result;

/// Output settings implied by the global flags.
#[must_use]
pub fn output_config(cli: &Cli) -> OutputConfig {
    let config = OutputConfig::new(cli.json, cli.quiet, cli.verbose);
    match cli.color {
        ColorChoice::Auto => config,
        ColorChoice::Always => config.with_color(true),
        ColorChoice::Never => config.with_color(false),
    }
}

/// Run one command to completion.
///
/// # Errors
///
/// Returns whatever the handler fails with; the binary prints it and exits
/// non-zero.
pub async fn run(cli: Cli) -> Result<()> {
    output::configure(output_config(&cli));
    let session = SessionOptions::from_cli(&cli);
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Serve(args) => serve::execute(config_path, args).await,
        Commands::Apod(args) => apod::execute(&session, args).await,
        Commands::Characters(args) => characters::list(&session, args).await,
        Commands::Character { ids } => characters::show(&session, ids).await,
        Commands::Locations(args) => characters::locations(&session, args).await,
        Commands::Episodes(args) => characters::episodes(&session, args).await,
        Commands::Gifs(command) => gifs::execute(&session, command).await,
        Commands::Favorites(command) => favorites::execute(&session, command).await,
        Commands::Catalog(args) => catalog::execute(&session, args).await,
        Commands::Config(ConfigCommand::Init { path, force }) => {
            config::execute_init(path.as_deref(), *force)
        }
        Commands::Config(ConfigCommand::Show) => config::execute_show(config_path),
        Commands::Check(CheckCommand::Config) => check::execute_config(config_path),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn color_flag_overrides_detection() {
        let cli = Cli::try_parse_from(["grabapis", "--color", "always", "catalog"]).unwrap();
        assert!(output_config(&cli).color);

        let cli = Cli::try_parse_from(["grabapis", "--color", "never", "--json", "catalog"]).unwrap();
        let config = output_config(&cli);
        assert!(!config.color);
        assert!(config.json);
    }
}
