use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use super::WebSearch;

pub const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";
const MAX_HITS: usize = 3;

/// One search result as handed to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
}

/// `title: body` blocks separated by blank lines.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| {
            if hit.body.is_empty() {
                hit.title.clone()
            } else {
                format!("{}: {}", hit.title, hit.body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

impl RelatedTopic {
    fn collect_into(&self, hits: &mut Vec<SearchHit>) {
        if hits.len() >= MAX_HITS {
            return;
        }
        match self {
            Self::Topic { text } if !text.trim().is_empty() => {
                let (title, body) = text.split_once(" - ").unwrap_or((text.as_str(), ""));
                hits.push(SearchHit {
                    title: title.trim().to_string(),
                    body: body.trim().to_string(),
                });
            }
            Self::Topic { .. } => {}
            Self::Group { topics } => {
                for topic in topics {
                    topic.collect_into(hits);
                }
            }
        }
    }
}

fn hits_from_answer(answer: &InstantAnswer) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    if !answer.abstract_text.trim().is_empty() {
        let title = if answer.heading.trim().is_empty() {
            "Summary"
        } else {
            answer.heading.trim()
        };
        hits.push(SearchHit {
            title: title.to_string(),
            body: answer.abstract_text.trim().to_string(),
        });
    }
    for topic in &answer.related_topics {
        topic.collect_into(&mut hits);
    }
    hits.truncate(MAX_HITS);
    hits
}

/// DuckDuckGo Instant Answer API: no key required, JSON over HTTPS.
pub struct DuckDuckGoSearch {
    endpoint: String,
    agent: ureq::Agent,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl WebSearch for DuckDuckGoSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let answer: InstantAnswer = self
            .agent
            .get(&self.endpoint)
            .query("q", query)
            .query("format", "json")
            .query("no_html", "1")
            .query("skip_disambig", "1")
            .call()
            .context("search request failed")?
            .into_json()
            .context("invalid search response")?;
        Ok(hits_from_answer(&answer))
    }
}

/// Stand-in when `--no-search` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

impl WebSearch for DisabledSearch {
    fn enabled(&self) -> bool {
        false
    }

    fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
}
