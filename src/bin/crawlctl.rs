use clap::{Parser, Subcommand};
use tonic::Request;

use crawlkit::proto::crawl_coordinator_client::CrawlCoordinatorClient;
use crawlkit::proto::{EnqueueRequest, ResponseStatus, StatsRequest};

#[derive(Debug, Parser)]
#[command(name = "crawlctl", about = "Control client for a running crawld")]
struct Cli {
    #[arg(long, default_value = "http://[::1]:50061")]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed a URL into the frontier.
    Enqueue { url: String },
    /// Print current pool/queue counters.
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = CrawlCoordinatorClient::connect(cli.addr).await?;

    match cli.command {
        Command::Enqueue { url } => {
            let response = client
                .enqueue(Request::new(EnqueueRequest { url: url.clone() }))
                .await?;
            match response.get_ref().status() {
                ResponseStatus::Ok => println!("enqueued {url}"),
                ResponseStatus::Error => {
                    return Err(format!(
                        "failed to enqueue {url}: {}",
                        response.get_ref().message.clone().unwrap_or_default()
                    )
                    .into())
                }
            }
        }
        Command::Stats => {
            let response = client.stats(Request::new(StatsRequest {})).await?;
            let stats = response.get_ref();
            println!("pool_size={} pool_in_use={}", stats.pool_size, stats.pool_in_use);
        }
    }

    Ok(())
}
