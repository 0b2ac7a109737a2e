use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;
use std::error::Error;

#[derive(Parser)]
#[command(name = "chapter-cli")]
#[command(about = "Chapter directory CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CHAPTER_DIR_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    /// Tenant (chapter) the command applies to
    #[arg(short, long, env = "CHAPTER_DIR_TENANT", default_value = "default")]
    tenant: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Search participants by keyword
    Search {
        #[arg(value_name = "TERM")]
        term: String,

        #[arg(short, long)]
        limit: Option<usize>,

        /// Comma separated statuses, e.g. member,visitor
        #[arg(short, long)]
        status: Option<String>,

        /// Also match by business category name
        #[arg(short, long)]
        categories: bool,
    },

    /// Register a participant
    Register {
        #[arg(short = 'n', long)]
        name: String,

        #[arg(long)]
        nickname: Option<String>,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,

        /// Comma separated tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(short, long, default_value = "prospect")]
        status: String,

        #[arg(short = 'b', long)]
        business_type: Option<String>,
    },

    /// Get participant details
    Get {
        #[arg(value_name = "PARTICIPANT_ID")]
        id: String,
    },

    /// Change a participant's status
    Status {
        #[arg(value_name = "PARTICIPANT_ID")]
        id: String,

        #[arg(value_name = "STATUS")]
        status: String,
    },

    /// List business categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();
    let tenant_url = format!("{}/v1/tenants/{}", cli.endpoint, cli.tenant);

    let response = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.endpoint)).send().await?,

        Commands::Search {
            term,
            limit,
            status,
            categories,
        } => {
            let mut query = vec![("q", term)];
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(status) = status {
                query.push(("status", status));
            }
            if categories {
                query.push(("categories", "true".to_string()));
            }

            client
                .get(format!("{}/search", tenant_url))
                .query(&query)
                .send()
                .await?
        }

        Commands::Register {
            name,
            nickname,
            company,
            phone,
            tags,
            status,
            business_type,
        } => {
            let tags: Option<Vec<String>> = tags.map(|t| {
                t.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            });

            client
                .post(format!("{}/participants", tenant_url))
                .json(&json!({
                    "full_name_th": name,
                    "nickname_th": nickname,
                    "company": company,
                    "phone": phone,
                    "tags": tags,
                    "status": status.to_lowercase(),
                    "business_type_code": business_type,
                }))
                .send()
                .await?
        }

        Commands::Get { id } => {
            client
                .get(format!("{}/participants/{}", tenant_url, id))
                .send()
                .await?
        }

        Commands::Status { id, status } => {
            client
                .post(format!("{}/participants/{}/status", tenant_url, id))
                .json(&json!({ "status": status.to_lowercase() }))
                .send()
                .await?
        }

        Commands::Categories => {
            client
                .get(format!("{}/v1/categories", cli.endpoint))
                .send()
                .await?
        }
    };

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
