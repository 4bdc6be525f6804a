//! Placeseek CLI - Query a full-text place database from the command line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use placeseek_core::Feature;
use placeseek_search::{new_database, FullTextDatabase};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Used when neither the flag nor the environment names a database
const DEFAULT_DATABASE_URI: &str = "null://";

/// Environment variable consulted when `--database-uri` is absent
const DATABASE_URI_ENV: &str = "PLACESEEK_DATABASE_URI";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    database_uri: Option<String>,
    index: Vec<PathBuf>,
    terms: Vec<String>,
    help: bool,
}

impl CliArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--database-uri" | "--fulltext-database-uri" | "-fulltext-database-uri" => {
                    let Some(uri) = args.next() else {
                        bail!("{} requires a value", arg);
                    };
                    parsed.database_uri = Some(uri);
                }
                "--index" => {
                    let Some(path) = args.next() else {
                        bail!("--index requires a path");
                    };
                    parsed.index.push(PathBuf::from(path));
                }
                "--" => parsed.terms.extend(args.by_ref()),
                _ => {
                    if let Some(uri) = arg.strip_prefix("--database-uri=") {
                        parsed.database_uri = Some(uri.to_string());
                    } else {
                        parsed.terms.push(arg);
                    }
                }
            }
        }

        Ok(parsed)
    }

    /// Flag, then environment, then the null backend
    fn resolve_database_uri(&self, env_uri: Option<String>) -> String {
        self.database_uri
            .clone()
            .or(env_uri.filter(|uri| !uri.is_empty()))
            .unwrap_or_else(|| DEFAULT_DATABASE_URI.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("placeseek=info".parse()?))
        .init();

    let args = CliArgs::parse(std::env::args().skip(1))?;

    if args.help || (args.terms.is_empty() && args.index.is_empty()) {
        print_help();
        return Ok(());
    }

    let uri = args.resolve_database_uri(std::env::var(DATABASE_URI_ENV).ok());
    let db = new_database(&uri)
        .await
        .with_context(|| format!("Failed to open database {}", uri))?;

    for path in &args.index {
        index_file(db.as_ref(), path).await?;
    }

    for term in &args.terms {
        let results = db
            .query_string(term, &[])
            .await
            .with_context(|| format!("Query {:?} failed", term))?;

        println!("{}", serde_json::to_string(&results)?);
    }

    db.close().await?;
    Ok(())
}

async fn index_file(db: &dyn FullTextDatabase, path: &Path) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let feature = Feature::from_slice(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    db.index_feature(&feature).await?;
    info!("Indexed {} from {}", feature.id(), path.display());
    Ok(())
}

fn print_help() {
    println!(
        r#"Placeseek - full-text search over place records

USAGE:
    placeseek [OPTIONS] <TERM>...

OPTIONS:
    --database-uri <URI>    Database to query (env: {env}, default: {default})
    --index <FILE>          Index a GeoJSON feature before querying (repeatable)
    -h, --help              Show this help message

Each term prints one line of JSON: {{"places":[...]}}

EXAMPLES:
    placeseek --database-uri 'sqlite://?dsn=places.db' golden
    placeseek --database-uri 'sqlite://?dsn=:memory:' --index 101.geojson golden
"#,
        env = DATABASE_URI_ENV,
        default = DEFAULT_DATABASE_URI,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        CliArgs::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_parse_terms_and_uri() {
        let args = parse(&["--database-uri", "sqlite://?dsn=x.db", "golden", "gate"]).unwrap();
        assert_eq!(args.database_uri.as_deref(), Some("sqlite://?dsn=x.db"));
        assert_eq!(args.terms, vec!["golden", "gate"]);
        assert!(!args.help);
    }

    #[test]
    fn test_parse_legacy_flag_and_index() {
        let args = parse(&[
            "-fulltext-database-uri",
            "null://",
            "--index",
            "a.geojson",
            "--index",
            "b.geojson",
            "park",
        ])
        .unwrap();
        assert_eq!(args.database_uri.as_deref(), Some("null://"));
        assert_eq!(args.index, vec![PathBuf::from("a.geojson"), PathBuf::from("b.geojson")]);
        assert_eq!(args.terms, vec!["park"]);
    }

    #[test]
    fn test_parse_equals_form_and_separator() {
        let args = parse(&["--database-uri=null://", "--", "--index"]).unwrap();
        assert_eq!(args.database_uri.as_deref(), Some("null://"));
        assert_eq!(args.terms, vec!["--index"]);
    }

    #[test]
    fn test_missing_flag_value() {
        assert!(parse(&["--database-uri"]).is_err());
        assert!(parse(&["--index"]).is_err());
    }

    #[test]
    fn test_uri_resolution_order() {
        let flagged = parse(&["--database-uri", "sqlite://?dsn=a.db"]).unwrap();
        assert_eq!(
            flagged.resolve_database_uri(Some("sqlite://?dsn=b.db".to_string())),
            "sqlite://?dsn=a.db"
        );

        let bare = parse(&["golden"]).unwrap();
        assert_eq!(
            bare.resolve_database_uri(Some("sqlite://?dsn=b.db".to_string())),
            "sqlite://?dsn=b.db"
        );
        assert_eq!(bare.resolve_database_uri(None), DEFAULT_DATABASE_URI);
        assert_eq!(bare.resolve_database_uri(Some(String::new())), DEFAULT_DATABASE_URI);
    }
}
