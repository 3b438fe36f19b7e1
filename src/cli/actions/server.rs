use crate::api::{self, store::UserStore};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
}

/// Execute the server action.
///
/// Builds the in-memory store, seeds the demo fixture, and runs the HTTP
/// server until shutdown.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    let store = UserStore::new();
    store.seed_test_user().await;

    api::new(args.port, store).await
}
