use anyhow::Context;
use catalogue_index::cli::Cli;
use catalogue_index::{Catalogue, FileSource, Item, RankItem, Settings};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalogue_index::tracing::init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.match_config.fuzzy |= cli.fuzzy;
    if cli.case_sensitive {
        settings.match_config.ignore_case = false;
    }

    let mut source = FileSource::new(&cli.root).with_hidden(cli.hidden);
    if let Some(depth) = cli.max_depth {
        source = source.with_max_depth(depth);
    }
    tracing::info!("Indexing {}", source.root().display());

    let catalogue = Catalogue::new("files", source.into_producer(), settings);
    catalogue.rebuild();
    catalogue.wait_idle().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read query")? {
        let output = render(&catalogue, &line, cli.limit);
        stdout
            .write_all(output.as_bytes())
            .await
            .context("Failed to write results")?;
        stdout.flush().await?;
    }

    catalogue.shutdown().await;
    Ok(())
}

fn render(catalogue: &Catalogue, query: &str, limit: usize) -> String {
    let results: Vec<RankItem> = catalogue.query(query).into_iter().take(limit).collect();
    if results.is_empty() {
        let suggestions = catalogue.suggest(query, 3);
        if suggestions.is_empty() {
            return String::from("No matches\n");
        }
        let names: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        return format!("No matches. Did you mean: {}?\n", names.join(", "));
    }

    results
        .iter()
        .map(|r| format!("{:.3}  {}  ({})\n", r.score, r.item.text(), r.item.id()))
        .collect()
}
