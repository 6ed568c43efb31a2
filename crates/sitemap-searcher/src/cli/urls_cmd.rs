//! `sitemap-searcher urls <base_url>`: list every resolved canonical URL.

use crate::cli::output::{self, Styled};
use crate::config::SearcherConfig;
use crate::search::HttpSitemapSearcher;
use anyhow::{Context, Result};

/// Run the urls command.
pub async fn run(base_url: &str, config: SearcherConfig) -> Result<()> {
    let s = Styled::new();
    let searcher = HttpSitemapSearcher::from_config(config).context("failed to build HTTP client")?;
    let site = searcher
        .resolve_site(base_url)
        .await
        .with_context(|| format!("cannot resolve {base_url}"))?;

    let mut urls: Vec<&String> = site.urls.iter().collect();
    urls.sort();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "base_url": site.base_url,
            "seeds": site.seeds.urls,
            "urls": urls,
            "failures": site.failures,
        }));
        return Ok(());
    }

    for url in &urls {
        println!("{url}");
    }

    if !output::is_quiet() {
        eprintln!(
            "  {} {} URL(s) from {} leaf sitemap(s)",
            s.ok_sym(),
            urls.len(),
            site.leaf_sitemaps.len()
        );
        for failure in &site.failures {
            eprintln!("  {} {}", s.fail_sym(), s.red(&failure.to_string()));
        }
    }

    Ok(())
}
