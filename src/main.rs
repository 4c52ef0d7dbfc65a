use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use auraxis::{Client, Config, Query};

#[derive(Parser, Debug)]
#[command(name = "auraxis")]
#[command(about = "Query the Daybreak Games Census API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/auraxis/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Census service id (overrides config)
  #[arg(short, long)]
  service_id: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Look up a character by name
  Character { name: String },
  /// Look up an outfit by tag and list its roster size
  Outfit { alias: String },
  /// Run a raw query against a collection with field=value filters
  Query {
    collection: String,
    /// Filters in field=value form
    filters: Vec<String>,
    #[arg(short, long, default_value_t = 10)]
    limit: u32,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = Config::load(args.config.as_deref())?;
  let config = if let Some(service_id) = args.service_id {
    Config {
      service_id,
      ..config
    }
  } else {
    config
  };

  let client = Client::new(&config);

  match args.command {
    Command::Character { name } => show_character(&client, &name).await,
    Command::Outfit { alias } => show_outfit(&client, &alias).await,
    Command::Query {
      collection,
      filters,
      limit,
    } => run_raw_query(&client, &collection, &filters, limit).await,
  }
}

async fn show_character(client: &Client, name: &str) -> Result<()> {
  let Some(character) = client.characters.get_by_name(name).await? else {
    return Err(eyre!("No character named {:?}", name));
  };

  println!("{}", character.name.first);
  println!("  battle rank: {}", character.battle_rank.value);
  println!("  prestige:    {}", character.prestige_level);
  println!("  playtime:    {} h", character.times.minutes_played / 60);

  if let Some(faction) = character.faction(client).resolve().await? {
    println!("  faction:     {} [{}]", faction.name.en(), faction.tag());
  }

  Ok(())
}

async fn show_outfit(client: &Client, alias: &str) -> Result<()> {
  let query = auraxis::ps2::Outfit::alias_query(alias)?;
  let records = client.run(&query).await?;
  let Some(record) = records.into_iter().next() else {
    return Err(eyre!("No outfit with tag {:?}", alias));
  };
  let outfit: auraxis::ps2::Outfit = serde_json::from_value(record)?;

  println!("[{}] {}", outfit.alias, outfit.name);
  println!("  members: {}", outfit.member_count);
  if let Some(leader) = outfit.leader(client).resolve().await? {
    println!("  leader:  {}", leader.name.first);
  }

  Ok(())
}

async fn run_raw_query(
  client: &Client,
  collection: &str,
  filters: &[String],
  limit: u32,
) -> Result<()> {
  let mut query = Query::new(collection);
  query.limit(limit);
  for filter in filters {
    let (field, value) = filter
      .split_once('=')
      .ok_or_else(|| eyre!("Filter must be field=value, got {:?}", filter))?;
    query.filter(field, value)?;
  }

  let records = client.run(&query).await?;
  println!("{}", serde_json::to_string_pretty(&records)?);
  Ok(())
}
