//! Command-line front end for the card store.
//!
//! Each invocation resolves configuration, opens the database and runs one
//! request through the core handlers, printing the JSON body on stdout.

use cards_core::db::open_db;
use cards_core::{
    init_from_config, ApiRequest, CardApi, CardService, CoreConfig, SqliteCardRepository,
};
use clap::{Parser, Subcommand};
use log::error;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cards")]
#[command(about = "Manage task, note and goal cards", version)]
struct Cli {
    /// Database file (overrides CARDS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the store is reachable
    Health,

    /// List cards, most recently updated first
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text in title or content
        #[arg(short, long)]
        q: Option<String>,

        /// task | note | goal
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// todo | doing | done
        #[arg(short, long)]
        status: Option<String>,

        /// Exact tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Create a card from a JSON object
    #[command(alias = "n")]
    Create {
        /// e.g. '{"title":"Ship v1","tags":["release"]}'
        json: String,
    },

    /// Update the supplied fields of a card
    Update {
        id: String,
        /// Fields to change; use null to clear content or dueDate
        json: String,
    },

    /// Permanently delete a card
    #[command(alias = "rm")]
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("cards: {message}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = cli.db.as_ref() {
        config = config.with_db_path(db);
    }
    init_from_config(&config)?;

    let request = build_request(cli.command)?;
    let conn = open_db(&config.db_path).map_err(|err| {
        error!("event=cli_open module=cli status=error error={err}");
        format!("cannot open `{}`: {err}", config.db_path.display())
    })?;
    let repo = SqliteCardRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let api = CardApi::new(CardService::new(repo));

    let response = api.handle(&request);
    if let Some(body) = response.body.as_ref() {
        let rendered = serde_json::to_string_pretty(body).map_err(|err| err.to_string())?;
        println!("{rendered}");
    }

    Ok(if response.status < 400 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_request(command: Command) -> Result<ApiRequest, String> {
    let request = match command {
        Command::Health => ApiRequest::new("GET", "/health"),
        Command::List {
            q,
            kind,
            status,
            tag,
        } => {
            let mut request = ApiRequest::new("GET", "/cards");
            let filters = [
                ("q", q),
                ("type", kind),
                ("status", status),
                ("tag", tag),
            ];
            for (name, value) in filters {
                if let Some(value) = value {
                    request = request.with_query(name, value);
                }
            }
            request
        }
        Command::Create { json } => {
            ApiRequest::new("POST", "/cards").with_body(parse_body(&json)?)
        }
        Command::Update { id, json } => {
            ApiRequest::new("PATCH", format!("/cards/{id}")).with_body(parse_body(&json)?)
        }
        Command::Delete { id } => ApiRequest::new("DELETE", format!("/cards/{id}")),
    };
    Ok(request)
}

fn parse_body(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("request body is not valid JSON: {err}"))
}
