use mongodb::{Client, bson::doc};
use std::time::{Duration, Instant};

use crate::common::{DatabaseError, DatabaseResult};

/// Run `{ ping: 1 }` against the admin database
pub(crate) async fn ping(client: &Client) -> mongodb::error::Result<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
}

/// Readiness probe: ping and report the round-trip time
pub async fn check_health(client: &Client) -> DatabaseResult<Duration> {
    let start = Instant::now();

    ping(client)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(start.elapsed())
}
