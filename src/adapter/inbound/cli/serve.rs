//! Handler for the `serve` command.

use std::path::Path;

use crate::adapter::inbound::cli::command::ServeArgs;
use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::serve::{ServeRequest, ServeStartupSnapshot};

/// Run the backend proxy in the foreground.
pub async fn execute(config: Option<&Path>, args: &ServeArgs) -> Result<()> {
    let config_toml = operator::read_config_toml(config)?;
    let request = build_request(args, config_toml, output::is_json());
    let service = operator::operator()?;

    let startup = service.prepare_serve(&request)?;
    if !output::is_quiet() || output::is_json() {
        print_startup(&startup);
    }

    service.execute_serve(request).await
}

fn build_request(args: &ServeArgs, config_toml: Option<String>, force_json_logs: bool) -> ServeRequest {
    ServeRequest {
        config_toml,
        host: args.host.clone(),
        port: args.port,
        log_level: args.log_level.clone(),
        json_logs: args.json_logs || force_json_logs,
    }
}

fn print_startup(snapshot: &ServeStartupSnapshot) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Listening", format!("http://{}", snapshot.bind_addr));
    output::field("CORS", snapshot.cors_origins.join(", "));
    output::field(
        "GIPHY",
        if snapshot.giphy_enabled {
            "enabled"
        } else {
            "disabled"
        },
    );

    if snapshot.nasa_demo_key {
        output::warning("Using NASA DEMO_KEY - requests are heavily rate limited");
    }
    if !snapshot.giphy_enabled {
        output::hint("set GIPHY_API_KEY to enable the GIF routes");
    }
}
