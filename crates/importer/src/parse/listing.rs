use scraper::Html;
use tracing::{debug, warn};

use super::selector;
use crate::class::GpClass;

pub const RIDER_LINKS: &str = "div[class*='rider-list__container'] a";

/// Selector of the grid holding one class's riders on the listing page.
pub fn grid_selector(class: GpClass) -> String {
    format!("div[class*='rider-grid__{}']", class.slug())
}

fn absolute(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Rider page URLs listed in `class`'s grid, absolute and de-duplicated in page order.
///
/// A page without the grid gives an empty list; the caller decides whether that is fatal.
pub fn rider_urls(html: &str, class: GpClass, base_url: &str) -> Vec<String> {
    let (Some(grid), Some(links)) = (selector(&grid_selector(class)), selector(RIDER_LINKS)) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let Some(grid) = document.select(&grid).next() else {
        warn!(class = %class, "rider grid not found on listing page");
        return Vec::new();
    };

    let mut urls: Vec<String> = Vec::new();
    for link in grid.select(&links) {
        let Some(href) = link.value().attr("href").map(str::trim) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        let url = absolute(base_url, href);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    debug!(class = %class, count = urls.len(), "discovered rider urls");
    urls
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::class::GpClass;

    /// Listing page with one grid per `(class, hrefs)` entry.
    pub fn listing_page(grids: &[(GpClass, Vec<&str>)]) -> String {
        let body: String = grids
            .iter()
            .map(|(class, hrefs)| {
                let cards: String = hrefs
                    .iter()
                    .map(|href| {
                        format!(
                            r#"<div class="rider-list__container"><a href="{href}">rider</a></div>"#
                        )
                    })
                    .collect();
                format!(
                    r#"<div class="rider-grid rider-grid__{}">{cards}</div>"#,
                    class.slug()
                )
            })
            .collect();
        format!("<html><body>{body}</body></html>")
    }
}
