use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::{pruvo, supabase};
use anyhow::{Context, Result};
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, origin } => {
            let store = supabase::Client::new(globals)?;

            // Startup probe, a dead store aborts the process
            store
                .ping()
                .await
                .context("Failed to connect to Supabase")?;

            info!("Supabase connection successful");

            pruvo::new(port, &origin, store).await?;
        }
    }

    Ok(())
}
