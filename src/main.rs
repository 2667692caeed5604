use std::path::Path;

use clap::Parser;
use tracing::{error, info, Level};

use cdp_etl::{
    cli::{init_config, run_migrate, Cli, Commands},
    configuration::{AppState, State},
    error::Error,
    provider::Event,
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve { events: None }) {
        Commands::Migrate => run_migrate().await,
        Commands::Ingest { file } => {
            let app_state = init().await?;
            ingest_task(&app_state, Some(file.as_path())).await
        },
        Commands::Serve { events } => {
            let app_state = init().await?;
            let (_, _) = tokio::try_join!(
                ingest_task(&app_state, events.as_deref()),
                server::server_task(&app_state),
            )?;
            Ok(())
        },
    }
}

async fn init() -> Result<AppState<State>, Error> {
    let config = init_config()?;
    let state = State::new(config).await?;
    Ok(AppState::new(state))
}

async fn ingest_task(
    app_state: &AppState<State>,
    file: Option<&Path>,
) -> Result<(), Error> {
    let Some(file) = file else {
        return Ok(());
    };

    let mut event_manager =
        Event::new(&app_state.store, &app_state.http, &app_state.config.settings);
    let applied = event_manager.run_file(file).await?;
    info!("Feed {} replayed: {} events", file.display(), applied);

    Ok(())
}
