//! Folds an article's content blocks into a single HTML body.
//!
//! Code and text blocks accumulate into a running body. An asset group
//! renders its images as the whole result, dropping whatever came before
//! it, and the next code or text block replaces that result with the
//! running body again. Published content depends on this, so the output
//! of an asset group only survives when it is the last renderable block.

use ps_core::{Asset, ContentBlock};

pub fn flatten_content(blocks: &[ContentBlock]) -> String {
    let mut text = String::new();
    let mut body = String::new();

    for block in blocks {
        match block {
            ContentBlock::Assets { items: Some(items), .. } => {
                body = render_assets(items);
            }
            ContentBlock::CodeBlock { code: Some(code), format: Some(format), .. } => {
                text.push_str(&render_code(code, format));
                body = text.clone();
            }
            ContentBlock::Text { body: Some(html), .. } => {
                text.push_str(html);
                body = text.clone();
            }
            ContentBlock::Assets { id, items: None }
            | ContentBlock::CodeBlock { id, .. }
            | ContentBlock::Text { id, body: None } => {
                tracing::warn!("Skipping content block {} with an empty payload", id);
            }
            ContentBlock::Unknown => {
                tracing::warn!("Skipping content block of unknown type");
            }
        }
    }

    body
}

fn render_assets(items: &[Asset]) -> String {
    items
        .iter()
        .filter_map(|asset| asset.url.as_deref())
        .map(|url| format!("<img href=\"{}\"/>", url))
        .collect()
}

fn render_code(code: &str, format: &str) -> String {
    format!("<pre lang={}><code>{}</code></pre>", format.to_lowercase(), code)
}
