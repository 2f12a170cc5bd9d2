use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use super::html;
use super::sections;
use super::{RenderContext, SectionProps, UnknownSectionPolicy};
use crate::model::unresolved_ref;

/// Renders the inner markup of one section from its fields.
pub type SectionRenderer = fn(&SectionProps<'_>, &RenderContext) -> String;

/// Built-in section kinds and their CMS discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Hero,
    Text,
    Skills,
    Experience,
    Projects,
    Gallery,
    Quote,
    CallToAction,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Hero,
        SectionKind::Text,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Gallery,
        SectionKind::Quote,
        SectionKind::CallToAction,
    ];

    pub fn discriminator(self) -> &'static str {
        match self {
            SectionKind::Hero => "heroSection",
            SectionKind::Text => "textSection",
            SectionKind::Skills => "skillsSection",
            SectionKind::Experience => "experienceSection",
            SectionKind::Projects => "projectsSection",
            SectionKind::Gallery => "gallerySection",
            SectionKind::Quote => "quoteSection",
            SectionKind::CallToAction => "ctaSection",
        }
    }

    pub fn from_discriminator(discriminator: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.discriminator() == discriminator)
    }

    pub fn renderer(self) -> SectionRenderer {
        match self {
            SectionKind::Hero => sections::hero,
            SectionKind::Text => sections::text,
            SectionKind::Skills => sections::skills,
            SectionKind::Experience => sections::experience,
            SectionKind::Projects => sections::projects,
            SectionKind::Gallery => sections::gallery,
            SectionKind::Quote => sections::quote,
            SectionKind::CallToAction => sections::call_to_action,
        }
    }
}

/// Result of dispatching one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Rendered(String),
    Placeholder(String),
    Skipped,
}

impl Dispatch {
    pub fn into_html(self) -> String {
        match self {
            Dispatch::Rendered(markup) | Dispatch::Placeholder(markup) => markup,
            Dispatch::Skipped => String::new(),
        }
    }
}

/// Discriminator → renderer table. Adding a section kind means registering one
/// entry; dispatch never changes.
#[derive(Clone, Default)]
pub struct SectionRegistry {
    renderers: HashMap<String, SectionRenderer>,
}

impl SectionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for kind in SectionKind::ALL {
            registry.register(kind.discriminator(), kind.renderer());
        }
        registry
    }

    /// Returns the renderer previously registered under `discriminator`, if any.
    pub fn register(&mut self, discriminator: &str, renderer: SectionRenderer) -> Option<SectionRenderer> {
        self.renderers.insert(discriminator.to_string(), renderer)
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.renderers.contains_key(discriminator)
    }

    pub fn discriminators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn dispatch(&self, section: &Value, ctx: &RenderContext) -> Dispatch {
        let Some(fields) = section.as_object() else {
            warn!("section is missing or did not resolve");
            return unknown("", ctx);
        };
        if let Some(reference) = unresolved_ref(section) {
            warn!(reference = %reference, "section reference did not resolve");
            return unknown("", ctx);
        }

        let discriminator = fields.get("_type").and_then(Value::as_str).unwrap_or("");
        let Some(renderer) = self.renderers.get(discriminator) else {
            warn!(section_type = %discriminator, "no renderer registered for section type");
            return unknown(discriminator, ctx);
        };

        let props = SectionProps::new(fields);
        let inner = renderer(&props, ctx);
        let key = props
            .key
            .map(|k| format!(r#" data-key="{}""#, html::attr(k)))
            .unwrap_or_default();
        Dispatch::Rendered(format!(
            r#"<section class="section section--{}"{}>{}</section>"#,
            html::attr(discriminator),
            key,
            inner
        ))
    }

    /// Render an ordered section array. Unknown entries are skipped or replaced
    /// by placeholders; the remaining order is preserved.
    pub fn render_all(&self, sections: &[Value], ctx: &RenderContext) -> String {
        sections
            .iter()
            .map(|section| self.dispatch(section, ctx).into_html())
            .collect()
    }
}

fn unknown(discriminator: &str, ctx: &RenderContext) -> Dispatch {
    match ctx.unknown_sections {
        UnknownSectionPolicy::Skip => Dispatch::Skipped,
        UnknownSectionPolicy::Placeholder => {
            let label = if discriminator.is_empty() { "unresolved" } else { discriminator };
            Dispatch::Placeholder(format!(
                r#"<div class="section-placeholder" data-section-type="{}">Unknown section type: {}</div>"#,
                html::attr(label),
                html::text(label)
            ))
        }
    }
}
