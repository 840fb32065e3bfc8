use std::process::ExitCode;

use arxiv_scout::{ArxivClient, Config, QueryOptions};
use clap::Parser;
use tracing::{error, info};

/// Search arXiv with LLM query rewriting and semantic reranking.
#[derive(Parser)]
#[command(name = "arxiv-scout", version)]
struct Cli {
    /// Free-text query
    #[arg(default_value = "Retrieval Augmented Generation")]
    query: String,

    /// Offset of the first feed entry
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Number of entries requested from arXiv
    #[arg(long, default_value_t = 100)]
    max_results: usize,

    /// Number of reranked results to keep
    #[arg(long, default_value_t = 10)]
    top_n: usize,

    /// Send the query to arXiv as-is instead of rewriting it
    #[arg(long)]
    no_rewrite: bool,

    /// Look up these arXiv ids (comma separated) instead of searching
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with_all = ["query", "start", "max_results", "top_n", "no_rewrite"]
    )]
    ids: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arxiv_scout=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let client = ArxivClient::new(Config::from_env()?)?;

    let output = if cli.ids.is_empty() {
        info!(query = %cli.query, rewrite = !cli.no_rewrite, "searching arXiv");
        let options = QueryOptions {
            start: cli.start,
            max_results: cli.max_results,
            top_n: cli.top_n,
            rewrite: !cli.no_rewrite,
        };
        client
            .query(&cli.query, &options)
            .await?
            .map(|ranked| serde_json::to_string_pretty(&ranked))
            .transpose()?
    } else {
        info!(ids = cli.ids.len(), "looking up arXiv ids");
        client
            .fetch_by_ids(cli.ids.as_slice())
            .await?
            .map(|results| serde_json::to_string_pretty(&results))
            .transpose()?
    };

    match output {
        Some(json) => {
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            error!("arXiv request failed, no results");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_alone_parses() {
        let cli = Cli::try_parse_from(["arxiv-scout", "--ids", "2005.11401,1706.03762"]).unwrap();
        assert_eq!(cli.ids, ["2005.11401", "1706.03762"]);
        assert_eq!(cli.start, 0);
    }

    #[test]
    fn ids_rejects_search_options() {
        let extras: [&[&str]; 5] = [
            &["--start", "5"],
            &["--max-results", "3"],
            &["--top-n", "2"],
            &["--no-rewrite"],
            &["all:electron"],
        ];
        for extra in extras {
            let args = ["arxiv-scout", "--ids", "2005.11401"].iter().chain(extra);
            let err = Cli::try_parse_from(args).err();
            assert!(
                matches!(err.as_ref().map(|e| e.kind()), Some(clap::error::ErrorKind::ArgumentConflict)),
                "{extra:?} should conflict with --ids"
            );
        }
    }

    #[test]
    fn search_mode_keeps_defaults() {
        let cli = Cli::try_parse_from(["arxiv-scout"]).unwrap();
        assert_eq!(cli.query, "Retrieval Augmented Generation");
        assert_eq!((cli.start, cli.max_results, cli.top_n), (0, 100, 10));
        assert!(cli.ids.is_empty());
    }
}
