use clap::Parser;
use hakim_cli::exit_codes::{EXIT_ERROR, for_class};
use hakim_cli::{Cli, commands, telemetry};
use hakim_rag::RagError;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init(cli.global.log_format, cli.global.verbose);

    let code = match commands::run(&cli.global, cli.command).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("error: {err:#}");
            err.downcast_ref::<RagError>().map_or(EXIT_ERROR, |rag| for_class(rag.class()))
        }
    };
    std::process::exit(code);
}
