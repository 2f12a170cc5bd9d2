// HTML fragment helpers

use std::borrow::Cow;

use crate::model::AssetRef;

pub fn text(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

pub fn attr(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// Links authored in the CMS: web, mail and site-relative targets only.
pub fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
        || (lower.starts_with('/') && !lower.starts_with("//"));
    allowed.then_some(url)
}

/// CSS colour values from the CMS: hex codes or plain keywords.
pub fn safe_color(color: &str) -> Option<&str> {
    let color = color.trim();
    let hex = color
        .strip_prefix('#')
        .map(|h| matches!(h.len(), 3 | 4 | 6 | 8) && h.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    let keyword = !color.is_empty() && color.len() <= 20 && color.chars().all(|c| c.is_ascii_alphabetic());
    (hex || keyword).then_some(color)
}

/// SVG markup that is safe to inline: a single `<svg>` element with no script,
/// event handler or foreign content.
pub fn inline_svg(svg: &str) -> Option<&str> {
    let svg = svg.trim();
    let lower = svg.to_ascii_lowercase();
    if !lower.starts_with("<svg") || !lower.ends_with("</svg>") {
        return None;
    }
    let forbidden = ["<script", "javascript:", "<foreignobject", "<iframe", "<use"];
    if forbidden.iter().any(|f| lower.contains(f)) || has_event_handler(&lower) {
        return None;
    }
    Some(svg)
}

fn has_event_handler(markup: &str) -> bool {
    markup.match_indices("on").any(|(idx, _)| {
        let at_attribute_start = markup[..idx].ends_with(|c: char| c.is_ascii_whitespace() || matches!(c, '/' | '"' | '\''));
        let rest = &markup[idx + 2..];
        let name_len = rest.chars().take_while(|c| c.is_ascii_alphabetic()).count();
        at_attribute_start && name_len > 0 && rest[name_len..].trim_start().starts_with('=')
    })
}

pub fn placeholder(class: &str) -> String {
    format!(r#"<span class="asset-placeholder {}" aria-hidden="true"></span>"#, attr(class))
}

/// Render an asset reference defensively: inline SVG, then image URL, then a
/// placeholder for anything unresolved or unusable.
pub fn asset(asset: Option<&AssetRef>, alt: &str, class: &str) -> String {
    let Some(resolved) = asset.and_then(AssetRef::resolved) else {
        return placeholder(class);
    };

    let style = resolved
        .color
        .as_deref()
        .and_then(safe_color)
        .map(|c| format!(r#" style="color: {}""#, c))
        .unwrap_or_default();

    if let Some(svg) = resolved.svg_data.as_deref().and_then(inline_svg) {
        return format!(r#"<span class="{}" role="img" aria-label="{}"{}>{}</span>"#, attr(class), attr(alt), style, svg);
    }

    if let Some(url) = resolved.url.as_deref().and_then(safe_url) {
        let alt = resolved.alt.as_deref().unwrap_or(alt);
        return format!(r#"<img class="{}" src="{}" alt="{}" loading="lazy">"#, attr(class), attr(url), attr(alt));
    }

    placeholder(class)
}

/// Plain text with blank-line separated paragraphs.
pub fn paragraphs(body: &str) -> String {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", text(p).replace('\n', "<br>")))
        .collect()
}

pub fn heading(level: u8, content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    format!("<h{level}>{}</h{level}>", text(content), level = level)
}
