use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "datawatch-cli")]
#[command(about = "Command-line client for the datawatchman API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Origin header sent with every request; must be on the server's allow-list.
    #[arg(short, long, default_value = "https://datawatchman.dev")]
    origin: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gigabit availability for an 8-digit USRN
    Usrn {
        usrn: String,
        #[arg(short, long, env = "USRN_ACCESS_PASSWORD")]
        password: Option<String>,
    },
    /// Reverse geocode a point
    Geocode {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },
    /// Active employers on the street of an address
    Companies { address: String },
    /// BD TOPO road sections of the street of an address
    Bdtopo {
        address: String,
        /// gauche or droite
        #[arg(short, long)]
        side: Option<String>,
    },
    /// Paris street works
    Works {
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(short, long)]
        arrondissement: Option<String>,
        /// Only works in progress today
        #[arg(long)]
        active: bool,
    },
    /// Whether USRN lookups require a password
    AuthConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(ORIGIN, HeaderValue::from_str(&cli.origin)?);

    let request = match cli.command {
        Commands::Usrn { usrn, password } => client
            .post(format!("{}/api/usrn-lookup", cli.url))
            .json(&json!({ "usrn": usrn, "password": password })),
        Commands::Geocode { lat, lon } => client
            .get(format!("{}/api/geocode", cli.url))
            .query(&[("lat", lat.to_string()), ("lon", lon.to_string())]),
        Commands::Companies { address } => client
            .get(format!("{}/api/companies", cli.url))
            .query(&[("address", address)]),
        Commands::Bdtopo { address, side } => {
            let mut query = vec![("address", address)];
            if let Some(side) = side {
                query.push(("side", side));
            }
            client.get(format!("{}/api/bdtopo", cli.url)).query(&query)
        }
        Commands::Works {
            limit,
            offset,
            arrondissement,
            active,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(offset) = offset {
                query.push(("offset", offset.to_string()));
            }
            if let Some(arrondissement) = arrondissement {
                query.push(("arrondissement", arrondissement));
            }
            if active {
                query.push(("activeOnly", "true".to_string()));
            }
            client
                .get(format!("{}/api/french-street-works", cli.url))
                .query(&query)
        }
        Commands::AuthConfig => client.get(format!("{}/api/auth-config", cli.url)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => {
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
