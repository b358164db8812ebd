//! Display templates
//!
//! Re-serializes an extraction back into uniform display text, so results
//! from any upstream read the same. Two small templates (name and
//! description) compile from config blobs.
//!
//! Template syntax:
//! - `{{field}}` substitutes a field; list fields join with a fixed
//!   separator, `{{languages:emoji}}` / `{{languages:code}}` pick the
//!   language display form
//! - `{{#if field}} … {{else}} … {{/if}}` renders a branch on whether the
//!   field is non-empty (flags: set)
//!
//! Rendering is pure over the extraction; it rewrites the stream's display
//! fields only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::lang;
use crate::extract::Extraction;
use crate::models::Stream;

/// Template compile error
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown template field {0:?}")]
    UnknownField(String),
    #[error("unknown language format {0:?}")]
    UnknownFormat(String),
    #[error("unclosed {{#if}} block")]
    UnclosedIf,
    #[error("stray {0} tag")]
    StrayTag(&'static str),
}

/// Uncompiled template pair, as carried in config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBlob {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TemplateBlob {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }

    pub fn parse(&self) -> Result<Option<StreamTemplate>, RenderError> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(StreamTemplate {
            name: compile(&self.name)?,
            description: compile(&self.description)?,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AddonName,
    Title,
    Resolution,
    Quality,
    Codec,
    BitDepth,
    Hdr,
    Audio,
    Channels,
    Languages,
    Size,
    Site,
    Hash,
    FileName,
    FileSize,
    StoreCode,
    StoreName,
    Cached,
    Proxied,
    RawName,
    RawDescription,
}

impl Field {
    fn parse(name: &str) -> Result<Field, RenderError> {
        match name {
            "addon" => Ok(Field::AddonName),
            "title" => Ok(Field::Title),
            "resolution" => Ok(Field::Resolution),
            "quality" => Ok(Field::Quality),
            "codec" => Ok(Field::Codec),
            "bitdepth" => Ok(Field::BitDepth),
            "hdr" => Ok(Field::Hdr),
            "audio" => Ok(Field::Audio),
            "channels" => Ok(Field::Channels),
            "languages" => Ok(Field::Languages),
            "size" => Ok(Field::Size),
            "site" => Ok(Field::Site),
            "hash" => Ok(Field::Hash),
            "file_name" => Ok(Field::FileName),
            "file_size" => Ok(Field::FileSize),
            "store_code" => Ok(Field::StoreCode),
            "store_name" => Ok(Field::StoreName),
            "cached" => Ok(Field::Cached),
            "proxied" => Ok(Field::Proxied),
            "raw_name" => Ok(Field::RawName),
            "raw_description" => Ok(Field::RawDescription),
            other => Err(RenderError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LangFormat {
    Code,
    Emoji,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Value(Field, Option<LangFormat>),
    If {
        field: Field,
        then: Vec<Node>,
        els: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
struct Compiled {
    nodes: Vec<Node>,
}

/// A compiled template pair
#[derive(Debug, Clone)]
pub struct StreamTemplate {
    name: Compiled,
    description: Compiled,
}

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").unwrap());

impl StreamTemplate {
    /// Default display template: store/addon/resolution in the name, the
    /// remaining metadata lines in the description
    pub fn default_template() -> StreamTemplate {
        TemplateBlob {
            name: "{{#if proxied}}✨ {{/if}}{{#if store_code}}{{#if cached}}⚡️ {{/if}}[{{store_code}}] {{/if}}{{addon}}\n{{resolution}}".to_string(),
            description: concat!(
                "{{#if quality}}💿 {{quality}} {{/if}}{{#if codec}}🎞️ {{codec}} {{/if}}{{#if bitdepth}}{{bitdepth}}{{/if}}\n",
                "{{#if hdr}}📺 {{hdr}}{{/if}}\n",
                "{{#if audio}}🎧 {{audio}} {{/if}}{{#if channels}}🔊 {{channels}}{{/if}}\n",
                "{{#if size}}📦 {{size}} {{/if}}{{#if site}}🔗 {{site}}{{/if}}\n",
                "{{#if languages}}🌐 {{languages:emoji}}{{/if}}\n",
                "{{#if file_name}}📄 {{file_name}}{{else}}{{#if title}}📁 {{title}}{{/if}}{{/if}}",
            )
            .to_string(),
        }
        .parse()
        .expect("default template must compile")
        .expect("default template is not empty")
    }

    /// Render into the stream's display fields; the extraction is read-only
    pub fn render(&self, stream: &mut Stream, data: &Extraction) {
        let name = render_nodes(&self.name.nodes, data);
        stream.name = name.trim().to_string();

        let description = render_nodes(&self.description.nodes, data);
        let description = BLANK_RUNS.replace_all(description.trim(), "\n");
        stream.description = description.to_string();
        // description is now the single source of display text
        stream.title.clear();
    }
}

fn compile(source: &str) -> Result<Compiled, RenderError> {
    let mut stack: Vec<(Field, Vec<Node>, Option<Vec<Node>>)> = Vec::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut rest = source;

    fn push(
        stack: &mut [(Field, Vec<Node>, Option<Vec<Node>>)],
        nodes: &mut Vec<Node>,
        node: Node,
    ) {
        if let Some((_, then, els)) = stack.last_mut() {
            match els {
                Some(els) => els.push(node),
                None => then.push(node),
            }
        } else {
            nodes.push(node);
        }
    }

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            push(&mut stack, &mut nodes, Node::Text(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or(RenderError::StrayTag("{{"))?;
        let tag = after[..end].trim();
        rest = &after[end + 2..];

        if let Some(field) = tag.strip_prefix("#if ") {
            stack.push((Field::parse(field.trim())?, Vec::new(), None));
        } else if tag == "else" {
            let Some((_, _, els)) = stack.last_mut() else {
                return Err(RenderError::StrayTag("{{else}}"));
            };
            if els.is_some() {
                return Err(RenderError::StrayTag("{{else}}"));
            }
            *els = Some(Vec::new());
        } else if tag == "/if" {
            let Some((field, then, els)) = stack.pop() else {
                return Err(RenderError::StrayTag("{{/if}}"));
            };
            push(
                &mut stack,
                &mut nodes,
                Node::If {
                    field,
                    then,
                    els: els.unwrap_or_default(),
                },
            );
        } else {
            let (name, format) = match tag.split_once(':') {
                Some((name, format)) => {
                    let format = match format.trim() {
                        "code" => LangFormat::Code,
                        "emoji" => LangFormat::Emoji,
                        other => return Err(RenderError::UnknownFormat(other.to_string())),
                    };
                    (name.trim(), Some(format))
                }
                None => (tag, None),
            };
            push(
                &mut stack,
                &mut nodes,
                Node::Value(Field::parse(name)?, format),
            );
        }
    }
    if !rest.is_empty() {
        push(&mut stack, &mut nodes, Node::Text(rest.to_string()));
    }
    if !stack.is_empty() {
        return Err(RenderError::UnclosedIf);
    }
    Ok(Compiled { nodes })
}

fn field_is_set(field: Field, data: &Extraction) -> bool {
    match field {
        Field::Cached => data.store.is_cached,
        Field::Proxied => data.store.is_proxied,
        Field::Hdr => !data.hdr.is_empty(),
        Field::Audio => !data.audio.is_empty(),
        Field::Channels => !data.channels.is_empty(),
        Field::Languages => !data.languages.is_empty(),
        _ => !field_value(field, data, None).is_empty(),
    }
}

fn field_value(field: Field, data: &Extraction, format: Option<LangFormat>) -> String {
    match field {
        Field::AddonName => data.addon_name.clone(),
        Field::Title => data.title.clone(),
        Field::Resolution => data.resolution.clone(),
        Field::Quality => data.quality.clone(),
        Field::Codec => data.codec.clone(),
        Field::BitDepth => data.bit_depth.clone(),
        Field::Hdr => data.hdr.join(" "),
        Field::Audio => data.audio.join(", "),
        Field::Channels => data.channels.join(", "),
        Field::Languages => match format.unwrap_or(LangFormat::Code) {
            LangFormat::Code => data.languages.join(" "),
            LangFormat::Emoji => data
                .languages
                .iter()
                .map(|code| lang::code_to_emoji(code))
                .collect::<Vec<_>>()
                .join(" "),
        },
        Field::Size => data.size.clone(),
        Field::Site => data.site.clone(),
        Field::Hash => data.hash.clone(),
        Field::FileName => data.file.name.clone(),
        Field::FileSize => data.file.size.clone(),
        Field::StoreCode => data.store.code.clone(),
        Field::StoreName => data.store.name.clone(),
        Field::Cached => {
            if data.store.is_cached {
                "true".to_string()
            } else {
                String::new()
            }
        }
        Field::Proxied => {
            if data.store.is_proxied {
                "true".to_string()
            } else {
                String::new()
            }
        }
        Field::RawName => data.raw.name.clone(),
        Field::RawDescription => data.raw.description.clone(),
    }
}

fn render_nodes(nodes: &[Node], data: &Extraction) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Value(field, format) => out.push_str(&field_value(*field, data, *format)),
            Node::If { field, then, els } => {
                if field_is_set(*field, data) {
                    out.push_str(&render_nodes(then, data));
                } else {
                    out.push_str(&render_nodes(els, data));
                }
            }
        }
    }
    out
}
