use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "comments-cli")]
#[command(about = "Moderation CLI for the comment server", long_about = None)]
struct Cli {
    #[arg(short, long, env = "COMMENTS_URL", default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "ADMIN_TOKEN", default_value = "change-me")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent comments, pending ones included
    List,
    /// Approve a pending comment
    Approve { id: i64 },
    /// Delete a comment
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
    );

    let res = match cli.command {
        Commands::List => {
            client
                .get(format!("{}/api/admin/comments", base))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Approve { id } => {
            client
                .post(format!("{}/api/admin/approve", base))
                .headers(headers)
                .json(&json!({ "id": id }))
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .post(format!("{}/api/admin/delete", base))
                .headers(headers)
                .json(&json!({ "id": id }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
