mod offline;

use std::sync::Arc;
use std::{env, fs, process};

use anyhow::{Context, Result, bail};
use revisekit_config::Config;
use revisekit_engine::{IssueKind, KindFilter};
use revisekit_session::{Services, Session, SessionConfig, StaticIdentity};

use offline::{JsonLinesHistory, RecordedAnalysis, RecordedOptimization};

const USAGE: &str = "<text-file> <analysis.json> [kind|all] [optimization.json]";

/// `all`, or an issue kind such as `homophone_word`
fn parse_filter(raw: &str) -> Result<KindFilter> {
    if raw == "all" {
        return Ok(KindFilter::Any);
    }
    match serde_json::from_value(serde_json::Value::String(raw.to_string())) {
        Ok(IssueKind::Other) | Err(_) => bail!("Unknown issue kind '{raw}'"),
        Ok(kind) => Ok(KindFilter::Only(kind)),
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!(
                "No config file at {}, using defaults",
                Config::config_path().display()
            );
            Config::default()
        }
        Err(e) => {
            log::warn!("Ignoring unreadable config: {e}");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if !(3..=5).contains(&args.len()) {
        eprintln!("Usage: {} {USAGE}", args[0]);
        process::exit(1);
    }

    let text = fs::read_to_string(&args[1])
        .with_context(|| format!("Failed to read text from '{}'", args[1]))?;
    let analysis = fs::read_to_string(&args[2])
        .with_context(|| format!("Failed to read analysis from '{}'", args[2]))?;
    let filter = parse_filter(args.get(3).map_or("homophone_word", String::as_str))?;
    let optimization = args
        .get(4)
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read optimization from '{path}'"))
        })
        .transpose()?;

    let config = load_config();
    let mut services = Services::new(
        Arc::new(RecordedAnalysis::new(analysis)),
        Arc::new(RecordedOptimization::new(optimization.clone())),
        Arc::new(StaticIdentity::from_config(&config)),
    );
    if let Some(path) = &config.history_path {
        log::info!("Recording history to {}", path.display());
        services = services.with_history(Arc::new(JsonLinesHistory::new(path.clone())));
    }
    let session = Session::new(services, SessionConfig::from(&config));

    let summary = session.submit_analysis(&text).await?;
    log::info!(
        "{} issues, content score {}",
        summary.issue_count,
        summary.content_score
    );
    for note in &summary.notes {
        println!("note [{}] {}: {}", note.priority, note.title, note.description);
    }

    if optimization.is_some() {
        let result = session.submit_optimization(&filter).await?;
        println!(
            "score {} -> {} ({} issues applied)",
            result.scores.before,
            result.scores.after,
            result.applied.len()
        );
        for suggestion in &result.suggestions {
            println!("suggestion {}: {}", suggestion.suggestion, suggestion.description);
        }
    } else {
        let report = session.with_engine(|engine| engine.apply_batch(&filter))?;
        log::info!(
            "Applied {} replacements, skipped {}",
            report.applied.len(),
            report.skipped.len()
        );
    }

    println!("{}", session.text());
    session.with_engine(|engine| {
        for tracked in engine.store().open() {
            let issue = tracked.issue();
            println!(
                "open {} {:?} at {}: {} (risk {:?})",
                tracked.id(),
                issue.kind,
                tracked.span(),
                issue.word,
                issue.risk_level
            );
        }
    });

    Ok(())
}
