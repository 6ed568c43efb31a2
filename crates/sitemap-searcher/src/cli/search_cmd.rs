//! `sitemap-searcher search <base_url> <keyword>...`: keyword coverage of a site's sitemap URLs.

use crate::cli::output::{self, Styled};
use crate::config::SearcherConfig;
use crate::search::{HttpSitemapSearcher, SearchReport};
use anyhow::{Context, Result};

/// Run the search command.
pub async fn run(
    base_url: &str,
    keywords: &[String],
    case_sensitive: bool,
    config: SearcherConfig,
) -> Result<()> {
    let case_insensitive = !case_sensitive && config.case_insensitive;
    let searcher = HttpSitemapSearcher::from_config(config).context("failed to build HTTP client")?;

    if !output::is_quiet() && !output::is_json() {
        eprintln!("  Resolving sitemaps for {base_url}...");
    }

    let report = searcher
        .search_report(base_url, keywords, case_insensitive)
        .await
        .with_context(|| format!("cannot search {base_url}"))?;

    if output::is_json() {
        output::print_json(&report);
        return Ok(());
    }

    print_report(&Styled::new(), &report);
    Ok(())
}

/// Print keyword coverage in aligned columns.
fn print_report(s: &Styled, report: &SearchReport) {
    let width = report
        .results
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max(7);

    if !output::is_quiet() {
        eprintln!();
        eprintln!("  {}", s.bold(&report.base_url));
        eprintln!(
            "  URLs:      {} from {} leaf sitemap(s){}",
            report.resolved_urls,
            report.leaf_sitemaps,
            if report.from_cache { " (cached)" } else { "" }
        );
        eprintln!("  Elapsed:   {}", output::format_elapsed(report.elapsed_ms));
        eprintln!();
    }

    for (keyword, fraction) in &report.results {
        let pct = output::format_percent(*fraction);
        let pct = if *fraction > 0.0 { s.green(&pct) } else { s.dim(&pct) };
        println!(
            "  {keyword:<width$}  {}  {pct}",
            output::fraction_bar(*fraction, 20)
        );
    }

    if report.failures.is_empty() || output::is_quiet() {
        return;
    }

    eprintln!();
    eprintln!(
        "  {} {} sitemap(s) skipped:",
        s.warn_sym(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("    {} {}", s.fail_sym(), s.yellow(&failure.to_string()));
    }
}
