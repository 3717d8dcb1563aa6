use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "aggregator-cli")]
#[command(about = "Client and management CLI for the user aggregation service", long_about = None)]
struct Cli {
    /// Aggregation service base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Department service base URL.
    #[arg(long, default_value = "http://localhost:8082")]
    departments_url: String,

    /// Admin API key.
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user
    CreateUser {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        department_id: String,
    },
    /// Fetch a user together with their department
    GetUser {
        id: u64,
    },
    /// Create a department in the department service
    CreateDepartment {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        code: Option<String>,
    },
    /// Check service status
    Status,
    /// Show circuit breaker state
    Breaker,
    /// Inspect the department cache
    Cache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::CreateUser { first_name, last_name, email, department_id } => {
            client.post(format!("{}/api/users", cli.url))
                .json(&json!({
                    "firstName": first_name,
                    "lastName": last_name,
                    "email": email,
                    "departmentId": department_id,
                }))
                .send()
                .await?
        }
        Commands::GetUser { id } => {
            client.get(format!("{}/api/users/{}", cli.url, id))
                .send()
                .await?
        }
        Commands::CreateDepartment { name, address, code } => {
            client.post(format!("{}/api/departments", cli.departments_url))
                .json(&json!({
                    "name": name,
                    "address": address,
                    "code": code,
                }))
                .send()
                .await?
        }
        Commands::Status => {
            client.get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Breaker => {
            client.get(format!("{}/admin/breaker", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Cache => {
            client.get(format!("{}/admin/cache", cli.url))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
