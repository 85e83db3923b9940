use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::apply_migrations;
use super::serve::run_server;
use crate::config::{Settings, initialize_app_state};
use crate::router::create_router;

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    let state = match initialize_app_state(settings).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Migrate over the same pool the server will use
    apply_migrations(&state.db).await?;
    debug!("Database is up to date");

    run_server(create_router(state), &settings.bind_address).await
}
