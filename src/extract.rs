//! Record extraction from feed snapshots.
//!
//! The feed markup carries no per-post join key in the default mode: the
//! author, timestamp, title and content-block lists are queried separately
//! and zipped by index. If the page omits one field for one post, every
//! later post in that list shifts by one. Setting a container selector
//! switches to [`Alignment::Container`], which queries each field inside
//! its own post element instead.
//!
//! # Default selectors
//!
//! | Field     | Selector                                   |
//! |-----------|--------------------------------------------|
//! | author    | `span[slot="authorName"]`                  |
//! | timestamp | `time` (value from its `datetime` attribute) |
//! | title     | `a[slot="title"]`                          |
//! | content   | `div` with the exact feed-card class string |
//! | paragraph | `p` (inside a content block)               |

use clap::ValueEnum;
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::models::{Record, Snapshot};
use crate::utils::truncate_for_log;

pub const UNKNOWN_USER: &str = "Unknown User";
pub const UNKNOWN_TIMESTAMP: &str = "Unknown Timestamp";
pub const NO_TITLE: &str = "No Title";
pub const NO_CONTENT: &str = "No Content";

/// How many records to build when the field lists differ in length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundPolicy {
    /// Stop at the shortest list; trailing unmatched posts are dropped.
    #[default]
    Conservative,
    /// Run to the longest list; missing fields get placeholder values.
    Permissive,
}

impl BoundPolicy {
    fn bound(self, lens: [usize; 4]) -> usize {
        match self {
            Self::Conservative => lens.into_iter().min().unwrap_or(0),
            Self::Permissive => lens.into_iter().max().unwrap_or(0),
        }
    }
}

/// CSS selectors for each post field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Selectors {
    pub author: String,
    pub timestamp: String,
    /// Attribute of the timestamp element holding the datetime value.
    pub timestamp_attr: String,
    pub title: String,
    pub content: String,
    pub paragraph: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            author: r#"span[slot="authorName"]"#.to_string(),
            timestamp: "time".to_string(),
            timestamp_attr: "datetime".to_string(),
            title: r#"a[slot="title"]"#.to_string(),
            content: r#"div[class="md feed-card-text-preview text-ellipsis line-clamp-3 xs:line-clamp-6 text-14"]"#
                .to_string(),
            paragraph: "p".to_string(),
        }
    }
}

/// How fields are matched up into records.
#[derive(Debug, Clone)]
pub enum Alignment {
    /// Zip the document-wide field lists by index.
    Positional(BoundPolicy),
    /// One record per container element, fields queried inside it.
    Container(Selector),
}

#[derive(Debug, Clone)]
struct Compiled {
    author: Selector,
    timestamp: Selector,
    title: Selector,
    content: Selector,
    paragraph: Selector,
}

/// Turns snapshots into records. Holds only compiled selectors, so
/// extraction has no hidden state.
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: Compiled,
    timestamp_attr: String,
    alignment: Alignment,
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|e| ScrapeError::Selector(format!("`{sel_str}`: {e}")))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl Extractor {
    /// Compile `selectors` and build an extractor.
    ///
    /// With `container` set, records come from per-post containers and
    /// `bound` is not consulted.
    pub fn new(selectors: &Selectors, bound: BoundPolicy, container: Option<&str>) -> Result<Self> {
        let compiled = Compiled {
            author: create_selector(&selectors.author)?,
            timestamp: create_selector(&selectors.timestamp)?,
            title: create_selector(&selectors.title)?,
            content: create_selector(&selectors.content)?,
            paragraph: create_selector(&selectors.paragraph)?,
        };
        let alignment = match container {
            Some(sel) => Alignment::Container(create_selector(sel)?),
            None => Alignment::Positional(bound),
        };
        Ok(Self {
            selectors: compiled,
            timestamp_attr: selectors.timestamp_attr.clone(),
            alignment,
        })
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Extract all records from one snapshot, in document order.
    ///
    /// An empty or unrelated page yields an empty vector. Mismatched field
    /// counts are handled by the bound policy and never fail.
    pub fn extract(&self, snapshot: &Snapshot) -> Vec<Record> {
        let doc = Html::parse_document(snapshot.markup());
        let records = match &self.alignment {
            Alignment::Positional(bound) => self.extract_positional(&doc, *bound),
            Alignment::Container(container) => self.extract_contained(&doc, container),
        };

        for record in &records {
            debug!(
                user = %record.user,
                timestamp = %record.timestamp,
                title = %record.title,
                content = %truncate_for_log(&record.content, 50),
                "Extracted record"
            );
        }
        records
    }

    fn extract_positional(&self, doc: &Html, bound: BoundPolicy) -> Vec<Record> {
        let authors: Vec<_> = doc.select(&self.selectors.author).collect();
        let times: Vec<_> = doc.select(&self.selectors.timestamp).collect();
        let titles: Vec<_> = doc.select(&self.selectors.title).collect();
        let blocks: Vec<_> = doc.select(&self.selectors.content).collect();

        debug!(
            authors = authors.len(),
            timestamps = times.len(),
            titles = titles.len(),
            content_blocks = blocks.len(),
            "Field lists found"
        );

        let n = bound.bound([authors.len(), times.len(), titles.len(), blocks.len()]);
        (0..n)
            .map(|idx| Record {
                user: authors
                    .get(idx)
                    .map_or_else(|| UNKNOWN_USER.to_string(), |el| text_of(*el)),
                timestamp: self.timestamp(times.get(idx).copied()),
                title: titles
                    .get(idx)
                    .map_or_else(|| NO_TITLE.to_string(), |el| text_of(*el)),
                content: self.content(blocks.get(idx).copied()),
            })
            .collect()
    }

    fn extract_contained(&self, doc: &Html, container: &Selector) -> Vec<Record> {
        let posts: Vec<_> = doc.select(container).collect();
        debug!(containers = posts.len(), "Post containers found");

        posts
            .into_iter()
            .map(|post| Record {
                user: post
                    .select(&self.selectors.author)
                    .next()
                    .map_or_else(|| UNKNOWN_USER.to_string(), text_of),
                timestamp: self.timestamp(post.select(&self.selectors.timestamp).next()),
                title: post
                    .select(&self.selectors.title)
                    .next()
                    .map_or_else(|| NO_TITLE.to_string(), text_of),
                content: self.content(post.select(&self.selectors.content).next()),
            })
            .collect()
    }

    fn timestamp(&self, element: Option<ElementRef<'_>>) -> String {
        element
            .and_then(|el| el.value().attr(&self.timestamp_attr))
            .map_or_else(|| UNKNOWN_TIMESTAMP.to_string(), |v| v.trim().to_string())
    }

    /// Paragraph texts joined by single spaces, else the block's own text.
    fn content(&self, block: Option<ElementRef<'_>>) -> String {
        let Some(block) = block else {
            return NO_CONTENT.to_string();
        };
        let paragraphs: Vec<_> = block.select(&self.selectors.paragraph).collect();
        if paragraphs.is_empty() {
            text_of(block)
        } else {
            paragraphs.into_iter().map(text_of).join(" ")
        }
    }
}
