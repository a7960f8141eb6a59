use std::time::Instant;

use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "content-cli")]
#[command(about = "Command-line client for the content gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single entry
    Entry {
        content_type: String,
        entry_id: String,
        /// Reference field to expand
        #[arg(short, long)]
        reference: Option<String>,
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Fetch a page of entries, newest first
    Entries {
        content_type: String,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        take: Option<u32>,
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Show gate and cache status
    Status,
    /// Drop stale cache entries now
    Purge,
    /// Fire concurrent entry requests and report timings
    Burst {
        content_type: String,
        entry_id: String,
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Entry { content_type, entry_id, reference, locale } => {
            let mut query = Vec::new();
            if let Some(reference) = reference {
                query.push(("reference", reference));
            }
            if let Some(locale) = locale {
                query.push(("locale", locale));
            }
            let res = client
                .get(format!("{}/content/entry/{}/{}", cli.url, content_type, entry_id))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Entries { content_type, skip, take, locale } => {
            let mut query = Vec::new();
            if let Some(skip) = skip {
                query.push(("skip", skip.to_string()));
            }
            if let Some(take) = take {
                query.push(("take", take.to_string()));
            }
            if let Some(locale) = locale {
                query.push(("locale", locale));
            }
            let res = client
                .get(format!("{}/content/entries/{}", cli.url, content_type))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client.get(format!("{}/admin/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Purge => {
            let res = client.post(format!("{}/admin/cache/purge", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Burst { content_type, entry_id, count } => {
            let url = format!("{}/content/entry/{}/{}", cli.url, content_type, entry_id);
            let start = Instant::now();

            let requests = (0..count).map(|i| {
                let client = client.clone();
                let url = url.clone();
                async move {
                    let sent = Instant::now();
                    let status = client.get(&url).send().await.map(|r| r.status());
                    (i, status, sent.elapsed())
                }
            });

            for (i, status, elapsed) in join_all(requests).await {
                match status {
                    Ok(status) => println!("#{:<3} {} in {:?}", i, status, elapsed),
                    Err(e) => println!("#{:<3} error: {}", i, e),
                }
            }
            println!("Total: {} requests in {:?}", count, start.elapsed());

            let res = client.get(format!("{}/admin/status", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
