use std::sync::Arc;

use clap::Parser;

use saloon_core::config::Config;
use saloon_indexer::{SearchFacade, SearchOutcome};
use saloon_text::TantivyIndexStore;

/// Query the forum search index.
#[derive(Debug, Parser)]
#[command(name = "saloon-search", version)]
struct Args {
    /// Query string, e.g. `hello` or `title:welcome`.
    query: String,

    /// Maximum number of hits (defaults to `search.limit`).
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_highlight: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    saloon_cli::init_logging(false, true);

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let index = TantivyIndexStore::open_read_only(settings.index.resolved_path())?;

    let facade = SearchFacade::new(Arc::new(index))
        .with_limit(args.limit.unwrap_or(settings.search.limit))
        .with_highlight(settings.search.highlight && !args.no_highlight);
    let outcome = facade.search(&args.query)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match outcome {
        SearchOutcome::Blank => println!("Nothing to search for."),
        SearchOutcome::Invalid(message) => {
            eprintln!("Invalid query: {}", message);
            std::process::exit(2);
        }
        SearchOutcome::Results(results) => {
            println!("Found {} results for \"{}\" in {:.2?}", results.total_hits, args.query, results.took);
            for (i, hit) in results.hits.iter().enumerate() {
                println!("\n  {}. score={:.4}  {}", i + 1, hit.score, hit.id);
                for (field, fragment) in &hit.fragments {
                    println!("     {}: {}", field, fragment);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn query_is_required_and_limit_parses() {
        Args::command().debug_assert();
        assert!(Args::try_parse_from(["saloon-search"]).is_err());
        let args = Args::parse_from(["saloon-search", "title:hello", "--limit", "5", "--json"]);
        assert_eq!((args.query.as_str(), args.limit, args.json), ("title:hello", Some(5), true));
    }
}
