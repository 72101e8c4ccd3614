// Write the sample station record to a Realtime Database path (drives the push subscription).
//
// Usage: cargo run --example push_dummy -- DATABASE_URL [PATH] [AUTH]
//   DATABASE_URL  e.g. https://<project>.firebaseio.com
//   PATH          default: telemetry

use std::env;
use weatherdash::config::PushConfig;
use weatherdash::source::{self, FirebaseStream, push};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let database_url = args
        .get(1)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("usage: push_dummy DATABASE_URL [PATH] [AUTH]"))?;
    let config = PushConfig {
        enabled: true,
        database_url,
        path: args.get(2).cloned().unwrap_or_else(|| "telemetry".into()),
        auth: args.get(3).cloned(),
        ..PushConfig::default()
    };

    let stream = FirebaseStream::new(source::http_client(10_000)?, &config);
    let record = push::sample_record();
    stream.write_record(&record).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
