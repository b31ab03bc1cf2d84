#![deny(missing_docs)]
//! Hangar command-line interface.
//!
//! Lists, counts, and edits ships held by a Hangar server.

mod client;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use client::ShipClient;
use hangar_core::{
    PageParams, Ship, ShipFilter, ShipPayload, ShipType, render_json, render_ship_text,
    render_ships_markdown, render_ships_text, start_of_year_millis,
};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "hangar", version, about = "Hangar ship registry CLI")]
struct Cli {
    /// Base URL of the Hangar server.
    #[arg(long, global = true, env = "HANGAR_API_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Clone, Debug, Default)]
struct FilterArgs {
    /// Substring of the ship name.
    #[arg(long)]
    name: Option<String>,
    /// Substring of the planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship class (TRANSPORT, MILITARY, MERCHANT).
    #[arg(long)]
    ship_type: Option<String>,
    /// Earliest production date, epoch milliseconds.
    #[arg(long)]
    after: Option<i64>,
    /// Latest production date, epoch milliseconds.
    #[arg(long)]
    before: Option<i64>,
    /// Only used (`true`) or new (`false`) ships.
    #[arg(long)]
    used: Option<bool>,
    /// Minimum speed.
    #[arg(long)]
    min_speed: Option<f64>,
    /// Maximum speed.
    #[arg(long)]
    max_speed: Option<f64>,
    /// Minimum crew size.
    #[arg(long)]
    min_crew_size: Option<i32>,
    /// Maximum crew size.
    #[arg(long)]
    max_crew_size: Option<i32>,
    /// Minimum rating.
    #[arg(long)]
    min_rating: Option<f64>,
    /// Maximum rating.
    #[arg(long)]
    max_rating: Option<f64>,
}

impl From<FilterArgs> for ShipFilter {
    fn from(args: FilterArgs) -> Self {
        ShipFilter {
            name: args.name,
            planet: args.planet,
            ship_type: args.ship_type,
            after: args.after,
            before: args.before,
            is_used: args.used,
            min_speed: args.min_speed,
            max_speed: args.max_speed,
            min_crew_size: args.min_crew_size,
            max_crew_size: args.max_crew_size,
            min_rating: args.min_rating,
            max_rating: args.max_rating,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
struct PageArgs {
    /// Sort key: ID, SPEED, DATE or RATING.
    #[arg(long)]
    order: Option<String>,
    /// Zero-based page number.
    #[arg(long)]
    page_number: Option<i64>,
    /// Page size.
    #[arg(long)]
    page_size: Option<i64>,
}

impl From<PageArgs> for PageParams {
    fn from(args: PageArgs) -> Self {
        PageParams {
            order: args.order,
            page_number: args.page_number,
            page_size: args.page_size,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
#[command(group(ArgGroup::new("production").args(&["year", "prod_date"])))]
struct ShipFieldArgs {
    /// Ship name.
    #[arg(long)]
    name: Option<String>,
    /// Home planet.
    #[arg(long)]
    planet: Option<String>,
    /// Ship class (TRANSPORT, MILITARY, MERCHANT).
    #[arg(long)]
    ship_type: Option<ShipType>,
    /// Production year; sent as January 1st of that year.
    #[arg(long)]
    year: Option<i32>,
    /// Production date, epoch milliseconds.
    #[arg(long)]
    prod_date: Option<i64>,
    /// Whether the ship has been used.
    #[arg(long)]
    used: Option<bool>,
    /// Speed.
    #[arg(long)]
    speed: Option<f64>,
    /// Crew size.
    #[arg(long)]
    crew_size: Option<i32>,
}

impl ShipFieldArgs {
    fn into_payload(self) -> CliResult<ShipPayload> {
        let prod_date = match (self.year, self.prod_date) {
            (Some(year), _) => Some(
                start_of_year_millis(year)
                    .ok_or_else(|| format!("year {year} is out of range"))?,
            ),
            (None, prod_date) => prod_date,
        };
        Ok(ShipPayload {
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date,
            is_used: self.used,
            speed: self.speed,
            crew_size: self.crew_size,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List ships matching filters, one page at a time.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Count ships matching filters.
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show a single ship.
    Get {
        /// Ship identifier.
        id: i64,
    },
    /// Register a new ship.
    Create {
        #[command(flatten)]
        fields: ShipFieldArgs,
    },
    /// Change some fields of a ship.
    Update {
        /// Ship identifier.
        id: i64,
        #[command(flatten)]
        fields: ShipFieldArgs,
    },
    /// Remove a ship.
    Delete {
        /// Ship identifier.
        id: i64,
    },
}

fn render_ships(ships: &[Ship], format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Text => render_ships_text(ships),
        OutputFormat::Json => render_json(ships)?,
        OutputFormat::Markdown => render_ships_markdown(ships),
    })
}

fn render_ship(ship: &Ship, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Text => render_ship_text(ship),
        OutputFormat::Json => render_json(ship)?,
        OutputFormat::Markdown => render_ships_markdown(std::slice::from_ref(ship)),
    })
}

/// Run one command against the server and render its result.
async fn execute(
    command: Commands,
    format: OutputFormat,
    client: &ShipClient,
) -> CliResult<String> {
    match command {
        Commands::List { filter, page } => {
            let ships = client.list(&filter.into(), &page.into()).await?;
            render_ships(&ships, format)
        }
        Commands::Count { filter } => {
            let total = client.count(&filter.into()).await?;
            Ok(match format {
                OutputFormat::Json => render_json(&total)?,
                OutputFormat::Text | OutputFormat::Markdown => total.to_string(),
            })
        }
        Commands::Get { id } => render_ship(&client.get(id).await?, format),
        Commands::Create { fields } => {
            let ship = client.create(&fields.into_payload()?).await?;
            render_ship(&ship, format)
        }
        Commands::Update { id, fields } => {
            let ship = client.update(id, &fields.into_payload()?).await?;
            render_ship(&ship, format)
        }
        Commands::Delete { id } => {
            client.delete(id).await?;
            Ok(match format {
                OutputFormat::Json => render_json(&serde_json::json!({ "deleted": id }))?,
                OutputFormat::Text | OutputFormat::Markdown => format!("Deleted ship {id}."),
            })
        }
    }
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = ShipClient::new(&cli.server_url)?;
    let output = execute(cli.command, cli.format, &client).await?;
    println!("{}", output.trim_end());
    Ok(())
}

#[cfg(test)]
fn main() {}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, POST};
    use httpmock::MockServer;

    fn ship_json(id: i64, name: &str, year: i32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "planet": "Europa",
            "shipType": "MILITARY",
            "prodDate": start_of_year_millis(year).expect("year"),
            "isUsed": true,
            "speed": 0.75,
            "crewSize": 300,
            "rating": 0.37
        })
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hangar").chain(args.iter().copied()))
            .expect("parse args")
    }

    #[test]
    fn parses_list_filters_and_paging() {
        let cli = parse(&[
            "list",
            "--min-speed",
            "0.5",
            "--used",
            "true",
            "--order",
            "RATING",
            "--page-size",
            "5",
            "--format",
            "json",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::List { filter, page } = cli.command else {
            panic!("expected list command");
        };
        let filter = ShipFilter::from(filter);
        assert_eq!(filter.min_speed, Some(0.5));
        assert_eq!(filter.is_used, Some(true));
        let page = PageParams::from(page);
        assert_eq!(page.order.as_deref(), Some("RATING"));
        assert_eq!(page.page_size, Some(5));
    }

    #[test]
    fn create_converts_year_to_first_day() {
        let cli = parse(&[
            "create",
            "--name",
            "Ares",
            "--ship-type",
            "MILITARY",
            "--year",
            "2900",
        ]);
        let Commands::Create { fields } = cli.command else {
            panic!("expected create command");
        };
        let payload = fields.into_payload().expect("payload");
        assert_eq!(payload.ship_type, Some(ShipType::Military));
        assert_eq!(payload.prod_date, start_of_year_millis(2900));
        assert_eq!(payload.planet, None);
    }

    #[test]
    fn year_and_prod_date_conflict() {
        let result = Cli::try_parse_from([
            "hangar",
            "create",
            "--year",
            "2900",
            "--prod-date",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_ship_type() {
        let result = Cli::try_parse_from(["hangar", "create", "--ship-type", "YACHT"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_renders_markdown() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/ships");
                then.status(200)
                    .json_body(serde_json::json!([ship_json(2, "Ares", 2950)]));
            })
            .await;
        let client = ShipClient::new(&server.base_url()).expect("client");

        let output = execute(
            Commands::List {
                filter: FilterArgs::default(),
                page: PageArgs::default(),
            },
            OutputFormat::Markdown,
            &client,
        )
        .await
        .expect("list");

        assert!(output.contains("# Hangar Ships"));
        assert!(
            output.contains("| 2 | Ares | Europa | MILITARY | 2950 | yes | 0.75 | 300 | 0.37 |")
        );
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let server = MockServer::start_async().await;
        let update = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/ships/3")
                    .json_body(serde_json::json!({ "crewSize": 300 }));
                then.status(200).json_body(ship_json(3, "Ares", 2950));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/rest/ships/3");
                then.status(200);
            })
            .await;
        let client = ShipClient::new(&server.base_url()).expect("client");

        let fields = ShipFieldArgs {
            crew_size: Some(300),
            ..ShipFieldArgs::default()
        };
        let output = execute(
            Commands::Update { id: 3, fields },
            OutputFormat::Text,
            &client,
        )
        .await
        .expect("update");
        assert!(output.starts_with("Ship #3: Ares"));

        let output = execute(Commands::Delete { id: 3 }, OutputFormat::Json, &client)
            .await
            .expect("delete");
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(parsed["deleted"], 3);

        update.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn count_prints_plain_number() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/ships/count");
                then.status(200).body("12");
            })
            .await;
        let client = ShipClient::new(&server.base_url()).expect("client");

        let output = execute(
            Commands::Count {
                filter: FilterArgs::default(),
            },
            OutputFormat::Text,
            &client,
        )
        .await
        .expect("count");
        assert_eq!(output, "12");
    }
}
