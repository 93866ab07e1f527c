//! Watch the health of an HTTP endpoint from the command line.
//!
//! ```text
//! cargo run --example watch -- example.com [port] [path]
//! ```

use std::time::Duration;

use pulse_probe::{Probe, ProbeConfig};
use pulse_probe_http::{HttpPerformer, HttpPerformerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse_probe=debug".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost".to_string());
    let port = args.next().map(|p| p.parse()).transpose()?;
    let path = args.next();

    let performer = HttpPerformer::new(HttpPerformerConfig {
        host,
        port,
        path,
        ..Default::default()
    })?;
    println!("probing {}", performer.url());

    let probe = Probe::new(
        ProbeConfig::builder(performer.into_performer())
            .period(Duration::from_secs(2))
            .timeout(Duration::from_secs(1))
            .success_threshold(1)
            .failure_threshold(3)
            .build()?,
    );

    let mut stream = probe.observe();
    while let Some(status) = stream.recv().await {
        println!("status: {status}");
    }
    Ok(())
}
