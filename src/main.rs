use clap::Parser;

use grabapis::adapter::inbound::cli::command::Cli;
use grabapis::adapter::inbound::cli::{dispatch, operator, output};
use grabapis::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if operator::install(Box::new(Operator::new())).is_err() {
        eprintln!("operator already installed");
        std::process::exit(1);
    }

    let cli = Cli::parse();
    if let Err(e) = dispatch::run(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
