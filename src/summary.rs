use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::models::TopCountry;

pub const SUMMARY_FILE: &str = "summary.svg";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Renders the fixed-layout summary card: title, stat lines, ranked top-5
/// list. Pure string assembly; a missing estimated GDP renders as N/A.
pub fn render(total: i64, top: &[TopCountry], refreshed: DateTime<Utc>) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    );
    let _ = write!(
        svg,
        r##"<rect width="{WIDTH}" height="{HEIGHT}" fill="#f0f4f8"/>"##
    );
    let _ = write!(
        svg,
        r##"<text x="400" y="60" text-anchor="middle" font-size="36" font-weight="bold" fill="#333">Country Data Summary</text>"##
    );
    let _ = write!(
        svg,
        r##"<text x="400" y="110" text-anchor="middle" font-size="20" fill="#555">Total Countries: {total}</text>"##
    );
    let _ = write!(
        svg,
        r##"<text x="400" y="140" text-anchor="middle" font-size="20" fill="#555">Last Refresh: {}</text>"##,
        refreshed.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = write!(
        svg,
        r##"<text x="400" y="210" text-anchor="middle" font-size="24" font-weight="bold" fill="#555">Top 5 Countries by Estimated GDP</text>"##
    );
    let mut y = 260;
    for (index, country) in top.iter().enumerate() {
        let gdp = match country.estimated_gdp {
            Some(value) => format!("~ ${:.2}B", value / 1_000_000_000.0),
            None => "N/A".to_string(),
        };
        let _ = write!(
            svg,
            r##"<text x="150" y="{y}" font-size="18" fill="#555">{}. {} ({gdp})</text>"##,
            index + 1,
            escape(&country.name),
        );
        y += 40;
    }
    svg.push_str("</svg>");
    svg
}

/// Writes the artifact to its well-known cache location, overwriting any
/// previous one.
pub async fn write_artifact(
    cache_dir: &Path,
    total: i64,
    top: &[TopCountry],
    refreshed: DateTime<Utc>,
) -> anyhow::Result<()> {
    let svg = render(total, top, refreshed);
    tokio::fs::create_dir_all(cache_dir)
        .await
        .with_context(|| format!("creating cache dir {}", cache_dir.display()))?;
    let path = cache_dir.join(SUMMARY_FILE);
    tokio::fs::write(&path, svg)
        .await
        .with_context(|| format!("writing summary artifact to {}", path.display()))?;
    tracing::info!("summary artifact written to {}", path.display());
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top() -> Vec<TopCountry> {
        vec![
            TopCountry {
                name: "Bigland".to_string(),
                estimated_gdp: Some(2_500_000_000.0),
            },
            TopCountry {
                name: "Trinidad & Tobago".to_string(),
                estimated_gdp: None,
            },
        ]
    }

    #[test]
    fn renders_stat_lines_and_ranking() {
        let svg = render(3, &top(), Utc::now());
        assert!(svg.contains("Country Data Summary"));
        assert!(svg.contains("Total Countries: 3"));
        assert!(svg.contains("1. Bigland (~ $2.50B)"));
    }

    #[test]
    fn missing_gdp_renders_as_not_available() {
        let svg = render(2, &top(), Utc::now());
        assert!(svg.contains("(N/A)"));
    }

    #[test]
    fn names_are_xml_escaped() {
        let svg = render(2, &top(), Utc::now());
        assert!(svg.contains("Trinidad &amp; Tobago"));
        assert!(!svg.contains("Trinidad & Tobago ("));
    }
}
