use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "metaplane-cli")]
#[command(about = "Management CLI for the Metaplane admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9443")]
    url: String,

    #[arg(short, long, default_value = "change-me")]
    key: String,

    /// Caller identity forwarded to the platform security verifier
    #[arg(long, default_value = "admin")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Platform status summary
    Status,
    /// List servers with a stored configuration
    Servers,
    /// List currently active servers
    Active,
    /// Show one server's stored configuration document
    Config { server: String },
    /// Show one server's known/active status
    ServerStatus { server: String },
    /// Activate a server from its stored configuration
    Activate { server: String },
    /// Deactivate a server, keeping its configuration
    Deactivate { server: String },
    /// Deactivate a server and delete its configuration
    Remove { server: String },
    /// Show the configuration the active instance was started from
    ActiveConfig { server: String },
    /// Install default repository services on a server
    InitRepository { server: String },
    /// Configure one access service by URL marker
    AddAccessService { server: String, marker: String },
    /// Load an open metadata archive into a running server
    LoadArchive { server: String, file: String },
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
    headers.insert("x-user-id", HeaderValue::from_str(&cli.user)?);

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Servers => {
            let res = client
                .get(format!("{}/admin/servers", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Active => {
            let res = client
                .get(format!("{}/admin/servers/active", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Config { server } => {
            let res = client
                .get(format!("{}/admin/servers/{}/configuration", cli.url, server))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ServerStatus { server } => {
            let res = client
                .get(format!("{}/admin/servers/{}/status", cli.url, server))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Activate { server } => {
            let res = client
                .post(format!("{}/admin/servers/{}/instance", cli.url, server))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Deactivate { server } => {
            let res = client
                .delete(format!("{}/admin/servers/{}/instance", cli.url, server))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Remove { server } => {
            let res = client
                .delete(format!("{}/admin/servers/{}", cli.url, server))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ActiveConfig { server } => {
            let res = client
                .get(format!(
                    "{}/admin/servers/{}/instance/configuration",
                    cli.url, server
                ))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::InitRepository { server } => {
            let res = client
                .post(format!(
                    "{}/admin/servers/{}/repository-services/defaults",
                    cli.url, server
                ))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::AddAccessService { server, marker } => {
            let res = client
                .post(format!(
                    "{}/admin/servers/{}/access-services/{}",
                    cli.url, server, marker
                ))
                .headers(headers)
                .json(&json!({}))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::LoadArchive { server, file } => {
            let res = client
                .post(format!(
                    "{}/admin/servers/{}/instance/open-metadata-archives/file",
                    cli.url, server
                ))
                .headers(headers)
                .json(&json!({ "file_name": file }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
