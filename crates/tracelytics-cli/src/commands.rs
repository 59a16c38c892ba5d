use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use tracelytics_crypto::{checksum, SigningKey};
use tracelytics_sdk::{Action, Contract, QueryConfig, TableQuery};
use tracelytics_store::InMemoryTableStore;
use tracing::info;

use crate::cli::*;
use crate::config::TracelyticsConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = TracelyticsConfig::load(cli.config.as_deref())?;
    let data_file = cli.data.clone().unwrap_or_else(|| config.data_file.clone());
    match cli.command {
        Command::Exec(args) => cmd_exec(args, &data_file, config.query(), &cli.format),
        Command::Query(args) => cmd_query(args, &data_file, config.query(), &cli.format),
        Command::Checksum(args) => cmd_checksum(args, &cli.format),
        Command::Schema => cmd_schema(&cli.format),
        Command::Keygen => cmd_keygen(&cli.format),
        Command::Sign(args) => cmd_sign(args),
    }
}

type Opened = (Arc<InMemoryTableStore>, Contract<InMemoryTableStore>);

fn open(data_file: &Path, query: QueryConfig) -> anyhow::Result<Opened> {
    let store = Arc::new(
        InMemoryTableStore::load(data_file)
            .with_context(|| format!("loading {}", data_file.display()))?,
    );
    let contract = Contract::with_config(Arc::clone(&store), query);
    Ok((store, contract))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
    }
}

/// Accept a single action object or an array of them.
fn parse_actions(text: &str) -> anyhow::Result<Vec<Action>> {
    let doc: Value = serde_json::from_str(text).context("actions are not valid JSON")?;
    let actions = match doc {
        Value::Array(_) => serde_json::from_value(doc)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(actions)
}

fn cmd_exec(
    args: ExecArgs,
    data_file: &Path,
    query: QueryConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let actions = parse_actions(&read_input(&args.input)?)?;
    let (store, contract) = open(data_file, query)?;

    let mut results = Vec::with_capacity(actions.len());
    let mut failure = None;
    for (i, action) in actions.iter().enumerate() {
        match contract.execute(action) {
            Ok(row) => {
                if let OutputFormat::Text = format {
                    println!("{} {}", "✓".green().bold(), action.name.yellow());
                    println!("  {}", row);
                }
                results.push(row);
            }
            Err(err) => {
                let kind = format!("{:?}", err.kind());
                failure = Some(
                    anyhow::Error::new(err)
                        .context(format!("action #{i} ({}) failed: {kind}", action.name)),
                );
                break;
            }
        }
    }

    if args.dry_run {
        info!(applied = results.len(), "dry run, snapshot not written");
    } else {
        store
            .save(data_file)
            .with_context(|| format!("saving {}", data_file.display()))?;
        if let OutputFormat::Text = format {
            println!(
                "{} rows saved to {}",
                store.total_rows()?.to_string().bold(),
                data_file.display()
            );
        }
    }

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn cmd_query(
    args: QueryArgs,
    data_file: &Path,
    query: QueryConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let (_, contract) = open(data_file, query)?;
    let request = TableQuery {
        scope: args.company,
        table: args.table,
        lower_bound: args.lower_bound,
        limit: args.limit,
    };
    let rows = contract.get_table_rows(&request)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No rows in {}/{}.", request.scope, request.table);
            }
            for row in &rows {
                println!("{}", row);
            }
        }
    }
    Ok(())
}

fn cmd_checksum(args: ChecksumArgs, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, Value> = args
                .values
                .iter()
                .map(|v| (v.clone(), Value::String(checksum(v).to_hex())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Text => {
            for value in &args.values {
                println!("{}  {}", checksum(value).to_hex().cyan(), value);
            }
        }
    }
    Ok(())
}

fn cmd_schema(format: &OutputFormat) -> anyhow::Result<()> {
    let tables = tracelytics_sdk::schema();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tables)?),
        OutputFormat::Text => {
            for table in &tables {
                println!("{} (index: {})", table.name.to_string().bold(), table.index);
                for field in &table.fields {
                    match field.default {
                        Some(default) => {
                            println!("  {:<20} {:<10} = {}", field.name, field.ty, default.dimmed())
                        }
                        None => println!("  {:<20} {}", field.name, field.ty),
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_keygen(format: &OutputFormat) -> anyhow::Result<()> {
    let key = SigningKey::generate();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "signing_key": key.to_hex(),
                "public_key": key.verifying_key().to_hex(),
            })
        ),
        OutputFormat::Text => {
            println!("Signing key: {}", key.to_hex().red());
            println!("Public key:  {}", key.verifying_key().to_hex().green());
        }
    }
    Ok(())
}

fn cmd_sign(args: SignArgs) -> anyhow::Result<()> {
    let key = SigningKey::from_hex(args.key.trim()).context("invalid signing key")?;
    let signature = key.sign_checksum(&checksum(&args.nonce.to_string()));
    println!("{}", signature.to_hex());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tracelytics_sdk::{Scope, TableName};

    fn write_actions(dir: &Path, doc: Value) -> String {
        let path = dir.join("actions.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{doc}").unwrap();
        path.to_string_lossy().into_owned()
    }

    fn new_site(id: &str) -> Value {
        json!({"name": "newsite", "data": {"args": [
            {"key": "company", "value": ["name", "raptor"]},
            {"key": "siteId",  "value": ["string", id]}
        ]}})
    }

    fn site_count(data_file: &Path) -> usize {
        let (_, contract) = open(data_file, QueryConfig::default()).unwrap();
        contract
            .get_table_rows(&TableQuery::new(Scope::new("raptor").unwrap(), TableName::Site))
            .unwrap()
            .len()
    }

    #[test]
    fn parses_one_or_many_actions() {
        assert_eq!(parse_actions(&new_site("S1").to_string()).unwrap().len(), 1);
        let many = json!([new_site("S1"), new_site("S2")]).to_string();
        assert_eq!(parse_actions(&many).unwrap().len(), 2);
        assert!(parse_actions("not json").is_err());
    }

    #[test]
    fn exec_persists_rows() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("store.json");
        let input = write_actions(dir.path(), json!([new_site("S1"), new_site("S2")]));

        let args = ExecArgs { input, dry_run: false };
        cmd_exec(args, &data, QueryConfig::default(), &OutputFormat::Json).unwrap();
        assert_eq!(site_count(&data), 2);
    }

    #[test]
    fn exec_keeps_work_before_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("store.json");
        let input = write_actions(
            dir.path(),
            json!([new_site("S1"), new_site("S1"), new_site("S2")]),
        );

        let args = ExecArgs { input, dry_run: false };
        let err = cmd_exec(args, &data, QueryConfig::default(), &OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("action #1 (newsite) failed"));
        assert_eq!(site_count(&data), 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("store.json");
        let input = write_actions(dir.path(), new_site("S1"));

        let args = ExecArgs { input, dry_run: true };
        cmd_exec(args, &data, QueryConfig::default(), &OutputFormat::Text).unwrap();
        assert!(!data.exists());
    }
}
