use clap::Parser;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{info, error};

mod cli;
mod tui;

use cli::{Cli, Commands, TokenAction};
use formfetch::{
    config::Config,
    token::{FileTokenStore, TokenProvider},
    FetchController, Method, RequestDescriptor, RequestOutcome,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "formfetch=info");
    }

    let cli = Cli::parse();

    // The terminal form owns the screen, so it only logs to the file
    init_logging(!matches!(cli.command, Commands::Form { .. }));

    let config = Config::from_env()?;
    config.validate()?;

    match &cli.command {
        Commands::Fetch { path, method, data, base } => {
            let config = match base {
                Some(base) => config.with_api_base(base),
                None => config,
            };

            let mut descriptor = RequestDescriptor::new(Method::parse(method)?);
            if let Some(raw) = data {
                descriptor = descriptor.with_body(
                    RequestDescriptor::parse_body(raw).context("Invalid --data")?,
                );
            }

            let controller: FetchController<Value> = FetchController::from_config(path, &config)?;
            info!("{} {}", descriptor.method.as_str(), config.api_base.url_for(path));

            controller.trigger(Some(descriptor));
            let state = controller.settled().await;

            if let Some(output) = fetch_output(state.outcome())? {
                println!("{}", output);
            }
        }

        Commands::Token { action } => {
            let store = FileTokenStore::from_config(&config.token);

            match action {
                TokenAction::Set { token } => {
                    store.set_token(token)?;
                    info!("Token stored in {}", store.path().display());
                }
                TokenAction::Show => match store.token() {
                    Some(token) => println!("{}", token),
                    None => println!("No token stored"),
                },
                TokenAction::Clear => {
                    store.clear_token()?;
                    info!("Token cleared from {}", store.path().display());
                }
            }
        }

        Commands::Form { path, fields, required, base } => {
            let config = match base {
                Some(base) => config.with_api_base(base),
                None => config,
            };

            info!("Launching form for {}", path);

            match tui::run_form(&config, path, fields, required).await {
                Ok(_) => info!("Form exited successfully"),
                Err(e) => error!("Form failed: {}", e),
            }
        }
    }

    Ok(())
}

/// What `fetch` prints; a failed request becomes an error after its payload is printed
fn fetch_output(outcome: Option<RequestOutcome<Value>>) -> Result<Option<String>> {
    match outcome {
        Some(RequestOutcome::Success(data)) => Ok(Some(serde_json::to_string_pretty(&data)?)),
        Some(RequestOutcome::Failure(err)) => {
            if let Some(ref errors) = err.errors {
                println!("{}", serde_json::to_string_pretty(errors)?);
            }
            bail!("Request failed: {}", err)
        }
        Some(RequestOutcome::Pending) | None => Ok(None),
    }
}

fn init_logging(to_stderr: bool) {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let file_appender = tracing_appender::rolling::never(".", "formfetch.log");

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env())
        )
        .init();
}
