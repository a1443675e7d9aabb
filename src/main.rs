// Main entry point for the LightBnB command line
// Runs listing searches and lookups against a configured database file

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use lightbnb::{
    Config, Database, GuestReservation, Property, PropertySearch, Row, RowSet, SearchCriteria,
    SearchForm, SqliteStore, User, Value,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LightBnB - query users, reservations and property listings
#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file (overrides the configuration)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search property listings
    Search {
        /// Part of the city name
        #[arg(long)]
        city: Option<String>,

        /// Only listings of this owner
        #[arg(long)]
        owner_id: Option<String>,

        /// Minimum nightly price, in dollars
        #[arg(long = "min-price")]
        minimum_price_per_night: Option<String>,

        /// Maximum nightly price, in dollars
        #[arg(long = "max-price")]
        maximum_price_per_night: Option<String>,

        /// Minimum average rating
        #[arg(long = "min-rating")]
        minimum_rating: Option<String>,

        /// Maximum number of listings
        #[arg(short, long)]
        limit: Option<i64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Print the generated SQL and parameters without running it
        #[arg(long)]
        explain: bool,
    },

    /// Look up a user by email or id
    User {
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        email: Option<String>,

        #[arg(long)]
        id: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// List a guest's reservations
    Reservations {
        #[arg(long)]
        guest_id: i64,

        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = args.database {
        config.database.path = path;
    }

    match args.command {
        Command::Search {
            city,
            owner_id,
            minimum_price_per_night,
            maximum_price_per_night,
            minimum_rating,
            limit,
            json,
            explain,
        } => {
            let form = SearchForm {
                city,
                owner_id,
                minimum_price_per_night,
                maximum_price_per_night,
                minimum_rating,
            };
            let criteria = SearchCriteria::try_from(form)?;
            let limit = limit.unwrap_or(config.search.default_limit);

            if explain {
                return explain_search(&criteria, limit);
            }

            let db = open(&config)?;
            let properties = db.search_properties(&criteria, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else {
                println!("{}", properties_table(&properties).format());
            }
        }

        Command::User { email, id, json } => {
            let db = open(&config)?;
            let user = if let Some(email) = email {
                db.user_with_email(&email)?
            } else if let Some(id) = id {
                db.user_with_id(id)?
            } else {
                anyhow::bail!("either --email or --id is required");
            };

            match (user, json) {
                (Some(user), true) => println!("{}", serde_json::to_string_pretty(&user)?),
                (Some(user), false) => println!("{}", users_table(&[user]).format()),
                (None, true) => println!("null"),
                (None, false) => println!("No user found"),
            }
        }

        Command::Reservations {
            guest_id,
            limit,
            json,
        } => {
            let db = open(&config)?;
            let limit = limit.unwrap_or(config.search.default_limit);
            let reservations = db.reservations_for_guest(guest_id, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reservations)?);
            } else {
                println!("{}", reservations_table(&reservations).format());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open(config: &Config) -> Result<Database<SqliteStore>> {
    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.path.display()))?;
    Ok(Database::with_search_config(store, config.search.clone()))
}

/// Print the query a search would run, and what the SQL parser makes of it
fn explain_search(criteria: &SearchCriteria, limit: i64) -> Result<()> {
    let query = PropertySearch::new(criteria, limit)?.build();
    let shape = query.check().context("generated query failed inspection")?;

    println!("{}", query.sql);
    println!();
    println!("parameters: {}", serde_json::to_string(&query.params)?);
    println!("shape: {}", serde_json::to_string(&shape)?);
    Ok(())
}

fn properties_table(properties: &[Property]) -> RowSet {
    let rows = properties
        .iter()
        .map(|p| {
            Row::new(vec![
                Value::Integer(p.id),
                Value::from(p.title.as_str()),
                Value::from(p.city.as_str()),
                Value::Text(format!("{:.2}", p.price_per_night())),
                p.average_rating
                    .map(|r| Value::Text(format!("{:.2}", r)))
                    .unwrap_or(Value::Null),
            ])
        })
        .collect();

    RowSet::new(columns(&["id", "title", "city", "price", "rating"]), rows)
}

fn users_table(users: &[User]) -> RowSet {
    let rows = users
        .iter()
        .map(|u| {
            Row::new(vec![
                Value::Integer(u.id),
                Value::from(u.name.as_str()),
                Value::from(u.email.as_str()),
            ])
        })
        .collect();

    RowSet::new(columns(&["id", "name", "email"]), rows)
}

fn reservations_table(reservations: &[GuestReservation]) -> RowSet {
    let rows = reservations
        .iter()
        .map(|r| {
            Row::new(vec![
                Value::Integer(r.id),
                Value::from(r.start_date.as_str()),
                Value::from(r.end_date.as_str()),
                Value::from(r.property.title.as_str()),
                Value::Text(format!("{:.2}", r.property.price_per_night())),
            ])
        })
        .collect();

    RowSet::new(columns(&["id", "start", "end", "property", "price"]), rows)
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
