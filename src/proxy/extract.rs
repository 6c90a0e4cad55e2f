//! Extraction strategies turning raw listing content into proxies
//!
//! A strategy is anything implementing [`ProxyExtractor`]: pure
//! text-in, records-out, no I/O. Providers accept any implementation,
//! so new listing formats plug in without touching the pipeline.

use crate::proxy::models::Proxy;
use crate::Result;
use anyhow::{bail, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Token listing sites use for an affirmative flag cell.
const AFFIRMATIVE: &str = "yes";

static HEADER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th").expect("valid selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("valid selector"));
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));

/// Regex pattern to match IP:PORT occurrences in plain text
static IP_PORT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}):(\d{1,5})\b")
        .expect("Invalid IP:PORT regex")
});

/// Turns raw listing content into proxies, in document order.
///
/// Implementations must not perform I/O and must leave unrecognized or
/// absent fields at their defaults rather than failing. Returning `Err`
/// means the content itself was malformed; the owning provider catches
/// that and keeps its previous result.
pub trait ProxyExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<Vec<Proxy>>;
}

/// Adapter letting a plain function or closure serve as an extractor.
pub fn from_fn<F>(f: F) -> FnExtractor<F>
where
    F: Fn(&str) -> Result<Vec<Proxy>> + Send + Sync,
{
    FnExtractor(f)
}

/// See [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnExtractor<F>(F);

impl<F> ProxyExtractor for FnExtractor<F>
where
    F: Fn(&str) -> Result<Vec<Proxy>> + Send + Sync,
{
    fn extract(&self, content: &str) -> Result<Vec<Proxy>> {
        (self.0)(content)
    }
}

/// Built-in extractor for listing sites that publish one HTML table
/// with a header row naming the columns.
///
/// Column headers are matched case-insensitively; columns this
/// extractor does not recognize are ignored so new site columns don't
/// break extraction. A row missing a cell leaves that field unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExtractor;

impl ProxyExtractor for TableExtractor {
    fn extract(&self, content: &str) -> Result<Vec<Proxy>> {
        let document = Html::parse_document(content);

        let headings: Vec<String> = document
            .select(&HEADER_SELECTOR)
            .map(|th| cell_text(&th).to_lowercase())
            .collect();
        if headings.is_empty() {
            bail!("listing has no table header row");
        }

        let mut proxies = Vec::new();
        for row in document.select(&ROW_SELECTOR) {
            let cells: Vec<String> = row.select(&CELL_SELECTOR).map(|td| cell_text(&td)).collect();

            let mut builder = Proxy::builder();
            for (i, name) in headings.iter().enumerate() {
                let Some(cell) = cells.get(i).map(String::as_str) else {
                    continue;
                };
                builder = match name.as_str() {
                    "ip address" => builder.host(cell),
                    "port" => builder.port(
                        cell.parse()
                            .with_context(|| format!("invalid port value {cell:?}"))?,
                    ),
                    "code" => builder.country_code(cell),
                    "country" => builder.country(cell),
                    "anonymity" => builder.anonymity(cell),
                    "google" => builder.google(cell == AFFIRMATIVE),
                    "https" => builder.https(cell == AFFIRMATIVE),
                    "last checked" => builder.last_checked(cell),
                    _ => builder,
                };
            }
            proxies.push(builder.build());
        }

        Ok(proxies)
    }
}

/// Extractor for sources that publish bare `ip:port` lines.
///
/// Scans the whole content for IP:PORT occurrences, keeping document
/// order. Entries with out-of-range octets or a zero port are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextListExtractor;

impl ProxyExtractor for TextListExtractor {
    fn extract(&self, content: &str) -> Result<Vec<Proxy>> {
        let proxies = IP_PORT_REGEX
            .captures_iter(content)
            .filter_map(|cap| {
                let host = cap.get(1)?.as_str();
                let port: u16 = cap.get(2)?.as_str().parse().ok()?;

                for octet in host.split('.') {
                    let value: u32 = octet.parse().ok()?;
                    if value > 255 {
                        return None;
                    }
                }
                if port == 0 {
                    return None;
                }

                Some(Proxy::new(host, port))
            })
            .collect();

        Ok(proxies)
    }
}

fn cell_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
