use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use replay_core::ExtractedPost;
use replay_engine::{
    clean_posts, cleaned_path_for, read_raw_posts, write_cleaned_posts, write_raw_posts,
    CuratedCollector, CuratedLink, DiscoverySettings, FetchSettings, NormalizeOptions, Normalizer,
    Orchestrator, ReadabilityExtractor, ReqwestFetcher, RetryPolicy, RetryingFetcher, SiteContext,
    ThemedIndex,
};

use crate::Command;

pub(crate) async fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Scrape { url, output } => scrape(&url, &output).await,
        Command::ScrapeCurated { links_file, output } => scrape_curated(&links_file, &output).await,
        Command::ScrapeIndex { index_url, output } => scrape_index(&index_url, &output).await,
        Command::Clean {
            input,
            base_url,
            cdn_url,
            output,
            stylesheet,
        } => {
            let stylesheet = stylesheet
                .map(|path| {
                    fs::read_to_string(&path)
                        .with_context(|| format!("reading stylesheet {}", path.display()))
                })
                .transpose()?;
            let options = NormalizeOptions {
                base_url,
                cdn_url,
                stylesheet,
            };
            let output = output.unwrap_or_else(|| cleaned_path_for(&input));
            clean(&input, &output, options)
        }
    }
}

fn build_fetcher() -> Result<RetryingFetcher<ReqwestFetcher>> {
    let fetcher =
        ReqwestFetcher::new(FetchSettings::default()).context("building the HTTP client")?;
    Ok(RetryingFetcher::new(fetcher, RetryPolicy::default()))
}

async fn scrape(url: &str, output: &Path) -> Result<ExitCode> {
    println!("Extracting posts from {url}...");
    let fetcher = build_fetcher()?;
    let settings = DiscoverySettings::default();
    let site = SiteContext::new(url, &fetcher, &ReadabilityExtractor, &settings)?;

    let report = Orchestrator::standard().run(&site).await;
    save_posts(&report.posts, output, "No posts found!")
}

async fn scrape_curated(links_file: &Path, output: &Path) -> Result<ExitCode> {
    let content = fs::read_to_string(links_file)
        .with_context(|| format!("reading {}", links_file.display()))?;
    let links: Vec<CuratedLink> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", links_file.display()))?;
    println!("Extracting {} articles from curated list...", links.len());

    let fetcher = build_fetcher()?;
    let posts = CuratedCollector::new(&fetcher, &ReadabilityExtractor)
        .collect(&links)
        .await;
    save_posts(&posts, output, "No articles extracted!")
}

async fn scrape_index(index_url: &str, output: &Path) -> Result<ExitCode> {
    println!("Extracting themed posts from {index_url}...");
    let fetcher = build_fetcher()?;
    let delay = DiscoverySettings::default().polite_delay;
    let posts = ThemedIndex::new(&fetcher, &ReadabilityExtractor, delay)
        .collect(index_url)
        .await?;
    save_posts(&posts, output, "No posts found!")
}

fn save_posts(posts: &[ExtractedPost], output: &Path, empty_message: &str) -> Result<ExitCode> {
    if posts.is_empty() {
        println!("{empty_message}");
        return Ok(ExitCode::FAILURE);
    }
    let path = write_raw_posts(output, posts)?;
    println!("Saved {} posts to {}", posts.len(), path.display());
    Ok(ExitCode::SUCCESS)
}

fn clean(input: &Path, output: &Path, options: NormalizeOptions) -> Result<ExitCode> {
    let raw = read_raw_posts(input)?;
    println!("Cleaning {} posts...", raw.len());

    let cleaned = clean_posts(&Normalizer::new(options), raw);
    let export = write_cleaned_posts(output, &cleaned)?;
    println!(
        "Saved {} cleaned posts to {}",
        export.post_count,
        export.output_path.display()
    );
    if let Some(images_path) = &export.images_path {
        println!(
            "Saved {} image URLs to {}",
            export.image_count,
            images_path.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}
