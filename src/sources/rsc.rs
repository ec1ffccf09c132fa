// src/sources/rsc.rs

//! Embedded-data-stream source.
//!
//! Some sites server-render their gallery into React flight payloads:
//! `<script>self.__next_f.push([1,"..."])</script>` blocks carrying both
//! prompt texts (bound to slot declarations like `25:T457,`) and video
//! payloads that reference them as `$25`. One document fetch yields the
//! whole listing for a category section.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::Result;
use crate::models::{EmbeddedClip, RawUnit};
use crate::sources::{Batch, SourceIterator};
use crate::utils::http::HttpSource;

/// Embedded-stream iterator: one document per category section.
pub struct RscStreamSource<'a> {
    http: &'a dyn HttpSource,
    doc_url: String,
    section: String,
    headers: Vec<(String, String)>,
    target: usize,
    fetched: bool,
}

impl<'a> RscStreamSource<'a> {
    pub fn new(
        http: &'a dyn HttpSource,
        doc_url: impl Into<String>,
        section: impl Into<String>,
        headers: Vec<(String, String)>,
        target: usize,
    ) -> Self {
        Self {
            http,
            doc_url: doc_url.into(),
            section: section.into(),
            headers,
            target,
            fetched: false,
        }
    }
}

#[async_trait]
impl SourceIterator for RscStreamSource<'_> {
    async fn next_batch(&mut self) -> Result<Batch> {
        if self.fetched {
            return Ok(Batch::exhausted());
        }
        self.fetched = true;

        let html = self.http.get_text(&self.doc_url, &self.headers).await?;
        let mut clips = parse_embedded_stream(&html, &self.section);
        debug!(
            section = %self.section,
            parsed = clips.len(),
            "parsed embedded stream"
        );
        clips.truncate(self.target);

        Ok(Batch {
            units: clips.into_iter().map(RawUnit::Embedded).collect(),
            exhausted: true,
        })
    }
}

/// Parse every flight push block in a document and return the clips
/// published under `section`.
pub fn parse_embedded_stream(html: &str, section: &str) -> Vec<EmbeddedClip> {
    let blocks = collect_push_blocks(html);
    let slots = build_slot_map(&blocks);
    extract_clips(&blocks, &slots, section)
}

/// Pull the JSON argument out of every `self.__next_f.push([...])` call.
fn collect_push_blocks(html: &str) -> Vec<String> {
    let push_re = Regex::new(r"(?s)self\.__next_f\.push\((\[.*?\])\)").expect("push pattern");
    let script_sel = Selector::parse("script").expect("static selector");

    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    for script in document.select(&script_sel) {
        let text: String = script.text().collect();
        for caps in push_re.captures_iter(&text) {
            blocks.push(caps[1].to_string());
        }
    }
    blocks
}

/// First pass: map slot references (`$25`) to their prompt texts.
///
/// A slot declaration (`25:T457,`) binds the next sufficiently long
/// non-structural payload.
fn build_slot_map(blocks: &[String]) -> std::collections::HashMap<String, String> {
    let slot_re = Regex::new(r"^(\w+):T[a-f0-9]+,?$").expect("slot pattern");

    let mut slots = std::collections::HashMap::new();
    let mut current_slot: Option<String> = None;
    for block in blocks {
        let Some(payload) = push_payload(block) else {
            continue;
        };

        if let Some(caps) = slot_re.captures(&payload) {
            current_slot = Some(caps[1].to_string());
            continue;
        }

        if let Some(slot) = &current_slot {
            if payload.len() > 80 && !payload.contains("http") && !payload.starts_with('[') {
                slots.insert(format!("${slot}"), unescape_text(&payload));
                current_slot = None;
            }
        }
    }
    slots
}

/// Second pass: pull video payloads and resolve their prompt references.
fn extract_clips(
    blocks: &[String],
    slots: &std::collections::HashMap<String, String>,
    section: &str,
) -> Vec<EmbeddedClip> {
    let uuid_re = Regex::new(r"/([a-f0-9-]{36})/").expect("uuid pattern");

    let mut clips = Vec::new();
    for block in blocks {
        let Some(payload) = push_payload(block) else {
            continue;
        };
        if !payload.contains("videos") {
            continue;
        }

        // Payload shape: `1c:["$","$L1a","<section>",{"videos":[...]}]`
        let json_part = payload
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(&payload);
        let cleaned = json_part.replace("\\\"", "\"");
        let Ok(inner) = serde_json::from_str::<serde_json::Value>(&cleaned) else {
            continue;
        };
        let Some(parts) = inner.as_array() else {
            continue;
        };
        if parts.len() < 4 {
            continue;
        }
        if parts.get(2).and_then(|v| v.as_str()) != Some(section) {
            continue;
        }
        let Some(videos) = parts
            .last()
            .and_then(|v| v.get("videos"))
            .and_then(|v| v.as_array())
        else {
            continue;
        };

        for video in videos {
            let Some(preview_url) = video
                .get("preview_url")
                .and_then(|v| v.as_str())
                .filter(|u| !u.is_empty())
            else {
                continue;
            };
            let Some(uuid) = uuid_re
                .captures(preview_url)
                .map(|caps| caps[1].to_string())
            else {
                continue;
            };

            let prompt = video
                .get("prompt")
                .and_then(|v| v.as_str())
                .and_then(|raw| resolve_prompt(raw, slots));

            clips.push(EmbeddedClip {
                uuid,
                preview_url: preview_url.to_string(),
                prompt,
                category: section.to_string(),
            });
        }
    }
    clips
}

/// Decode the second element of a push block as its string payload.
fn push_payload(block: &str) -> Option<String> {
    let outer: serde_json::Value = serde_json::from_str(block).ok()?;
    let parts = outer.as_array()?;
    if parts.len() < 2 {
        return None;
    }
    parts[1].as_str().map(|s| s.to_string())
}

/// A prompt field is either a `$slot` reference or inline text.
fn resolve_prompt(raw: &str, slots: &std::collections::HashMap<String, String>) -> Option<String> {
    if let Some(reference) = raw.strip_prefix('$') {
        return slots.get(&format!("${reference}")).cloned();
    }
    if raw.len() > 10 {
        return Some(raw.to_string());
    }
    None
}

/// Undo the escaping flight payload text arrives with.
fn unescape_text(text: &str) -> String {
    text.replace("\\n", "\n")
        .replace("\\/", "/")
        .replace("\\\"", "\"")
}
