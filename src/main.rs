mod cache;
mod cli;
mod config;
mod error;
mod github;
mod languages;
mod progress;
mod report;
mod scoring;
mod types;

use crate::error::Result;
use crate::types::config::ScoringConfig;
use crate::types::record::{RepositoryRecord, RunBatch};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const NO_DATA: i32 = 1;
    pub const RUNTIME_FAILURE: i32 = 2;
}

fn run() -> Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        cli::Commands::Analyze(cmd) => run_analyze(cmd),
        cli::Commands::Fetch(cmd) => run_fetch(cmd),
        cli::Commands::Rescore(cmd) => run_rescore(cmd),
        cli::Commands::Languages => {
            for language in languages::supported_languages() {
                println!("{language}");
            }
            Ok(exit_code::SUCCESS)
        }
    }
}

fn run_analyze(cmd: cli::AnalyzeCommand) -> Result<i32> {
    let scoring_config = config::load_scoring_config(cmd.config.as_deref());
    let started = Utc::now();

    let mut records = collect_batch(&cmd.api, &cmd.collection, &scoring_config, cmd.no_progress)?;
    if records.is_empty() {
        eprintln!("No repositories found or analyzed.");
        return Ok(exit_code::NO_DATA);
    }

    for record in &mut records {
        scoring::apply(record, &scoring_config);
    }

    std::fs::create_dir_all(&cmd.output_dir)?;
    let base_name = output_base_name(&cmd.api.org);
    let batch = RunBatch::new(cmd.api.org.clone(), records);
    let batch_path = cmd.output_dir.join(format!("{base_name}_batch.json"));
    cache::save_batch(&batch_path, &batch)?;

    let paths = report::write_all(
        &batch.repositories,
        &scoring_config,
        &cmd.output_dir,
        &base_name,
    )?;
    print_summary(&batch, started, &paths, Some(&batch_path));
    Ok(exit_code::SUCCESS)
}

fn run_fetch(cmd: cli::FetchCommand) -> Result<i32> {
    let scoring_config = config::load_scoring_config(cmd.config.as_deref());

    let records = collect_batch(&cmd.api, &cmd.collection, &scoring_config, cmd.no_progress)?;
    if records.is_empty() {
        eprintln!("No repositories found or analyzed.");
        return Ok(exit_code::NO_DATA);
    }

    std::fs::create_dir_all(&cmd.output_dir)?;
    let base_name = output_base_name(&cmd.api.org);
    let batch = RunBatch::new(cmd.api.org.clone(), records);
    let batch_path = cmd.output_dir.join(format!("{base_name}_batch.json"));
    cache::save_batch(&batch_path, &batch)?;

    println!("Fetched {} repositories for {}.", batch.repository_count, batch.organization);
    println!("Cache batch: {}", batch_path.display());
    println!("Re-score without network access via: repoqual rescore --cache {}", batch_path.display());
    Ok(exit_code::SUCCESS)
}

fn run_rescore(cmd: cli::RescoreCommand) -> Result<i32> {
    let scoring_config = config::load_scoring_config(cmd.config.as_deref());
    let started = Utc::now();

    let mut batch = cache::load_batch_or_empty(&cmd.cache)?;
    if batch.repositories.is_empty() {
        eprintln!("No repositories loaded from cache.");
        return Ok(exit_code::NO_DATA);
    }

    for record in &mut batch.repositories {
        scoring::apply(record, &scoring_config);
    }

    std::fs::create_dir_all(&cmd.output_dir)?;
    let base_name = output_base_name(&batch.organization);
    let paths = report::write_all(
        &batch.repositories,
        &scoring_config,
        &cmd.output_dir,
        &base_name,
    )?;
    print_summary(&batch, started, &paths, None);
    Ok(exit_code::SUCCESS)
}

/// Sequentially collect one record per repository. A failing repository is
/// logged and skipped; it never aborts the rest of the batch.
fn collect_batch(
    api: &cli::ApiArgs,
    collection: &cli::CollectionArgs,
    scoring_config: &ScoringConfig,
    no_progress: bool,
) -> Result<Vec<RepositoryRecord>> {
    let client = github::GitHubClient::new(
        api.token.clone(),
        api.api_url.clone(),
        !api.no_ssl_verify,
    );
    let limits = github::CollectorLimits::from_config(scoring_config);
    let collector = github::Collector::new(&client, api.org.clone(), limits);

    println!("Fetching repositories for organization: {}", api.org);
    let repos = collector.list_repositories(&collection.languages)?;
    println!("Total repositories found: {}", repos.len());
    let repos = github::filter_repositories(repos, &collection.repos, collection.limit);

    let progress = progress::create(no_progress);
    progress.begin(repos.len() as u64);
    let mut records = Vec::with_capacity(repos.len());
    for repo in &repos {
        progress.advance(&repo.name);
        match collector.collect(repo) {
            Ok(record) => records.push(record),
            Err(err) => warn!("skipping {}: {err}", repo.full_name),
        }
    }
    progress.finish();
    Ok(records)
}

fn output_base_name(org: &str) -> String {
    format!("{org}_repos_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

fn print_summary(
    batch: &RunBatch,
    started: DateTime<Utc>,
    paths: &report::ReportPaths,
    batch_path: Option<&Path>,
) {
    let duration = Utc::now() - started;

    println!("\n{}", "=".repeat(50));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(50));
    println!("Organization: {}", batch.organization);
    println!("Repositories analyzed: {}", batch.repository_count);
    println!("Duration: {}s", duration.num_seconds());

    println!("\nOutput files generated:");
    println!("  - JSON:  {}", paths.json.display());
    println!("  - CSV:   {}", paths.csv.display());
    println!("  - Excel: {}", paths.xlsx.display());
    println!("  - HTML:  {}", paths.html.display());
    if let Some(batch_path) = batch_path {
        println!("  - Cache: {}", batch_path.display());
    }

    let mut code_type_counts: HashMap<&str, usize> = HashMap::new();
    let mut total_prs = 0u64;
    let mut total_commits = 0u64;
    for record in &batch.repositories {
        for code_type in &record.code_types {
            *code_type_counts.entry(code_type.as_str()).or_default() += 1;
        }
        total_prs += record.total_prs;
        total_commits += record.total_commits;
    }

    if !code_type_counts.is_empty() {
        let mut ranked: Vec<(&str, usize)> = code_type_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        println!("\nTop code types:");
        for (code_type, count) in ranked.iter().take(5) {
            println!("  - {code_type}: {count} repositories");
        }
    }

    println!("\nTotal PRs across all repositories: {total_prs}");
    println!("Total commits across all repositories: {total_commits}");
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
