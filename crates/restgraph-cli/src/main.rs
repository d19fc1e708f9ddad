//! CLI entry point for inspecting a graph database over its REST API.
//!
//! Every command performs one request and prints the decoded result as JSON
//! on stdout.

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use restgraph_client::{Algorithm, Client, PathFinder, Query};
use restgraph_core::{ClientConfig, Direction, Node};

#[derive(Parser)]
#[command(name = "restgraph")]
#[command(about = "Inspect a graph database through its REST API")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the REST endpoint (e.g. http://localhost:7474/db/data).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file prefix (default: restgraph).
    #[arg(short, long, default_value = "restgraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Show the server root document and version.
    Info,
    /// List relationship types.
    Types,
    /// Fetch a node's properties.
    Node { id: i64 },
    /// Fetch a relationship.
    Relationship { id: i64 },
    /// List relationships attached to a node.
    Relationships {
        node_id: i64,
        /// all, in, or out (default: all).
        #[arg(long)]
        direction: Option<Direction>,
        /// Relationship type filter; repeat for several types.
        #[arg(long = "type")]
        types: Vec<String>,
    },
    /// Search for paths between two nodes.
    Path {
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
        #[arg(long = "type")]
        rel_type: Option<String>,
        #[arg(long)]
        direction: Option<Direction>,
        #[arg(long)]
        max_depth: Option<u32>,
        /// Use Dijkstra instead of shortest path (requires --cost-property).
        #[arg(long)]
        dijkstra: bool,
        #[arg(long)]
        cost_property: Option<String>,
        #[arg(long)]
        default_cost: Option<serde_json::Number>,
        /// Return only one path.
        #[arg(long)]
        single: bool,
    },
    /// Run a Cypher query with positional `?` parameters.
    Cypher {
        template: String,
        /// Parameter value as JSON; bare words are taken as strings.
        #[arg(long = "param")]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let config = load_client_config(&cli)?;
    let client = Client::connect(&config)?;

    let output = match cli.command {
        Command::Info => serde_json::to_value(client.get_server_info().await?)?,
        Command::Types => serde_json::to_value(client.get_relationship_types().await?)?,
        Command::Node { id } => match client.get_node(id, false).await? {
            Some(node) => serde_json::to_value(node)?,
            None => anyhow::bail!("node {id} not found"),
        },
        Command::Relationship { id } => match client.get_relationship(id, false).await? {
            Some(rel) => serde_json::to_value(rel)?,
            None => anyhow::bail!("relationship {id} not found"),
        },
        Command::Relationships {
            node_id,
            direction,
            ref types,
        } => {
            let rels = client
                .get_node_relationships(&Node::stub(node_id), types.as_slice(), direction)
                .await?;
            serde_json::to_value(rels)?
        }
        Command::Path {
            from,
            to,
            ref rel_type,
            direction,
            max_depth,
            dijkstra,
            ref cost_property,
            default_cost,
            single,
        } => {
            let finder = PathFinder {
                rel_type: rel_type.clone(),
                direction,
                max_depth,
                algorithm: if dijkstra {
                    Algorithm::Dijkstra
                } else {
                    Algorithm::ShortestPath
                },
                cost_property: cost_property.clone(),
                default_cost: default_cost.map(Value::Number),
                ..PathFinder::between(Node::stub(from), Node::stub(to))
            };
            if single {
                match client.get_single_path(&finder).await? {
                    Some(path) => serde_json::to_value(path)?,
                    None => anyhow::bail!("no path from node {from} to node {to}"),
                }
            } else {
                serde_json::to_value(client.get_paths(&finder).await?)?
            }
        }
        Command::Cypher {
            ref template,
            ref params,
        } => {
            let params = params.iter().map(String::as_str).map(parse_param).collect();
            let query = Query::new(template.clone(), params);
            serde_json::to_value(client.execute_cypher_query(&query).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn load_client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(&cli.config)?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
        config.validate()?;
    }
    tracing::debug!(endpoint = %config.endpoint, "Loaded client configuration");
    Ok(config)
}
