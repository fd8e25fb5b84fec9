use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use invite_swarm::client::types::{
    Credential, GroupRef, InviteOutcome, JoinOutcome, Target,
};
use invite_swarm::client::{Connector, GroupClient};
use invite_swarm::engine::{RunConfig, RunController, RunRegistry};
use invite_swarm::progress::types::ProgressSnapshot;
use invite_swarm::progress::ProgressSink;

/// Simulated connection for one account. Deterministic: the account whose
/// label matches `flood_label` hits a rate limit after `flood_after`
/// successful invites; targets ending in "0" resolve to no account.
struct SimClient {
    label: String,
    invited: AtomicU64,
    flood_after: Option<u64>,
}

#[async_trait]
impl GroupClient for SimClient {
    async fn join_group(&mut self, group: &GroupRef) -> Result<JoinOutcome> {
        tracing::debug!("{} joining {}", self.label, group);
        Ok(JoinOutcome::Joined)
    }

    async fn invite(&mut self, _group: &GroupRef, target: &Target) -> InviteOutcome {
        if let Some(limit) = self.flood_after {
            if self.invited.load(Ordering::Relaxed) >= limit {
                return InviteOutcome::RateLimited { wait_secs: 300 };
            }
        }
        if target.0.ends_with('0') {
            return InviteOutcome::NotFound;
        }
        self.invited.fetch_add(1, Ordering::Relaxed);
        InviteOutcome::Invited
    }

    async fn disconnect(&mut self) {
        tracing::debug!("{} disconnected", self.label);
    }
}

struct SimConnector {
    flood_label: Option<String>,
    flood_after: u64,
}

#[async_trait]
impl Connector for SimConnector {
    type Client = SimClient;

    async fn connect(&self, credential: &Credential) -> Result<SimClient> {
        let floods = self.flood_label.as_deref() == Some(credential.label.as_str());
        Ok(SimClient {
            label: credential.label.clone(),
            invited: AtomicU64::new(0),
            flood_after: floods.then_some(self.flood_after),
        })
    }
}

/// Forwards every published progress render to the log.
struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn publish(&self, text: &str, _snapshot: &ProgressSnapshot) {
        for line in text.lines() {
            tracing::info!("{}", line);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut workers = 3usize;
    let mut targets = 30usize;
    let mut delay_ms = 200u64;
    let mut flood_after: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--workers" => {
                workers = args[i + 1].parse()?;
                i += 2;
            }
            "--targets" => {
                targets = args[i + 1].parse()?;
                i += 2;
            }
            "--delay-ms" => {
                delay_ms = args[i + 1].parse()?;
                i += 2;
            }
            "--flood-after" => {
                flood_after = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                eprintln!(
                    "Usage: {} [--workers N] [--targets N] [--delay-ms N] [--flood-after N]",
                    args[0]
                );
                std::process::exit(1);
            }
        }
    }

    let credentials: Vec<Credential> = (1..=workers)
        .map(|n| Credential {
            label: format!("+3460000{:04}", n),
            session: format!("session-{}", n),
        })
        .collect();

    let target_list: Vec<Target> = (1..=targets)
        .map(|n| Target(format!("+4917000{:05}", n)))
        .collect();

    tracing::info!(
        "Simulated run: {} workers, {} targets, {}ms delay",
        workers,
        targets,
        delay_ms
    );

    let connector = Arc::new(SimConnector {
        // The first account floods, if requested, to exercise redistribution.
        flood_label: flood_after.and(credentials.first().map(|c| c.label.clone())),
        flood_after: flood_after.unwrap_or(0),
    });

    let config = RunConfig::new(
        GroupRef("@demo_group".to_string()),
        Duration::from_millis(delay_ms),
    );
    let controller = RunController::new(connector, config);

    let registry = RunRegistry::new();
    let (run_id, cancel) = registry.begin();

    let report = controller
        .run(credentials, target_list, Arc::new(LogSink), cancel)
        .await?;
    registry.finish(&run_id);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
