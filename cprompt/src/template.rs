//! Handlebars-backed prompt templates with a `media` side channel.
//!
//! `{{media url=var}}` never reaches the text body. The helper writes the
//! referenced URL between two private-use markers and rendering lifts every
//! marked span into [`RenderedPrompt::media`]. Interpolated values have the
//! markers stripped, so variables cannot forge attachments.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::Value;

use crate::TemplateError;

const TEMPLATE_NAME: &str = "prompt";
const MEDIA_OPEN: char = '\u{E000}';
const MEDIA_CLOSE: char = '\u{E001}';

/// Binary or URI payload attached next to the rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub url: String,
    pub content_type: Option<String>,
}

impl MediaAttachment {
    /// Derives the content type from `data:` URIs; remote URLs carry none.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let content_type = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .map(ToString::to_string);

        Self { url, content_type }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedPrompt {
    pub text: String,
    pub media: Vec<MediaAttachment>,
}

impl RenderedPrompt {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.media.is_empty()
    }
}

/// A template compiled once; clones share the compiled registry.
#[derive(Clone)]
pub struct PromptTemplate {
    source: String,
    registry: Arc<Handlebars<'static>>,
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        check_media_tags(&source)?;

        let mut registry = Handlebars::new();
        registry.register_escape_fn(strip_media_markers);
        registry.register_helper("media", Box::new(media_helper));
        registry.register_template_string(TEMPLATE_NAME, &source)?;

        Ok(Self {
            source,
            registry: Arc::new(registry),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders against an object of variables. Missing variables render empty.
    pub fn render(&self, variables: &Value) -> Result<RenderedPrompt, TemplateError> {
        let rendered = self.registry.render(TEMPLATE_NAME, variables)?;
        Ok(lift_media(&rendered))
    }
}

impl Debug for PromptTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .finish()
    }
}

impl PartialEq for PromptTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn media_helper(
    helper: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let url = helper
        .hash_get("url")
        .and_then(|param| param.value().as_str())
        .map(strip_media_markers)
        .unwrap_or_default();

    if !url.trim().is_empty() {
        out.write(&format!("{MEDIA_OPEN}{}{MEDIA_CLOSE}", url.trim()))?;
    }
    Ok(())
}

fn strip_media_markers(text: &str) -> String {
    text.replace([MEDIA_OPEN, MEDIA_CLOSE], "")
}

/// Every `{{media ...}}` tag must name its variable with `url=`.
fn check_media_tags(source: &str) -> Result<(), TemplateError> {
    for (start, _) in source.match_indices("{{media") {
        let tag = &source[start + 2..];
        let tag = tag.split("}}").next().unwrap_or(tag);
        let names_url = tag
            .split_whitespace()
            .skip(1)
            .any(|argument| argument.len() > 4 && argument.starts_with("url="));
        if !names_url {
            return Err(TemplateError::invalid_directive(format!(
                "media directive requires 'url=<variable>' at byte {start}"
            )));
        }
    }
    Ok(())
}

fn lift_media(rendered: &str) -> RenderedPrompt {
    let mut prompt = RenderedPrompt::default();
    let mut rest = rendered;

    while let Some(open) = rest.find(MEDIA_OPEN) {
        prompt.text.push_str(&rest[..open]);
        let marked = &rest[open + MEDIA_OPEN.len_utf8()..];
        let Some(close) = marked.find(MEDIA_CLOSE) else {
            rest = marked;
            break;
        };
        prompt
            .media
            .push(MediaAttachment::from_url(&marked[..close]));
        rest = &marked[close + MEDIA_CLOSE.len_utf8()..];
    }

    prompt.text.push_str(rest);
    prompt
}
