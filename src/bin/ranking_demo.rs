use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use ranking_builder::telemetry::init_tracing;
use ranking_builder::{Credentials, MemoryIdentityProvider, MemoryStore, NewRecord, RankingBuilder, RankingConfig};

fn random_score(min: u32, max: u32) -> anyhow::Result<f64> {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let span = max - min + 1;
    Ok(f64::from(min + u32::from_le_bytes(buf) % span))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let mut config = RankingConfig::from_env();
    if std::env::var("RANKING_TOP_N").is_err() {
        config.default_top_n = 10;
    }
    let creds = config.credentials.get_or_insert_with(|| Credentials::new("test@test.com", "123456")).clone();
    info!(target: "ranking_demo", "starting: collection='{}', top={}", config.collection, config.default_top_n);

    let provider = Arc::new(MemoryIdentityProvider::new());
    provider.register_account(&creds.email_address, &creds.password)?;
    let store = Arc::new(MemoryStore::new());
    let rb = RankingBuilder::connect(config, provider, store).await?;

    let sub = rb
        .list_data(|view| {
            println!("--- top {} ---", view.total);
            for (pos, r) in view.entries.iter().enumerate() {
                println!("{:>3}. {:<12} {:>5} {}", pos + 1, r.name, r.score, r.time.display());
            }
        })
        .await?;

    let mut names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        names = ["ann", "bob", "cid", "dee"].iter().map(|s| s.to_string()).collect();
    }
    for name in names {
        rb.create_user(NewRecord::new(name, random_score(0, 100)?, "00:05:00")).await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    sub.unsubscribe();
    rb.sign_out().await;
    Ok(())
}
