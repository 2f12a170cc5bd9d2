//! Server-side HTML rendering of CMS content.

pub mod html;
pub mod page;
pub mod registry;
pub mod sections;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::model::AssetRef;

pub use registry::{Dispatch, SectionKind, SectionRegistry, SectionRenderer};

/// What to emit for a section whose discriminator has no renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSectionPolicy {
    Skip,
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct RenderContext {
    pub locale: String,
    pub unknown_sections: UnknownSectionPolicy,
    pub base_url: String,
}

impl RenderContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            locale: config.render.locale.clone(),
            unknown_sections: config.render.unknown_sections,
            base_url: config.server.base_url.clone(),
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            unknown_sections: UnknownSectionPolicy::Placeholder,
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Localized lookup on an untyped field: `{ "en": .. }` or a bare string.
pub fn localized<'v>(value: Option<&'v Value>, locale: &str) -> &'v str {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Object(map)) => map.get(locale).and_then(Value::as_str).unwrap_or(""),
        _ => "",
    }
}

/// Borrowed view of a section's (or any embedded object's) fields.
#[derive(Debug, Clone, Copy)]
pub struct SectionProps<'a> {
    pub key: Option<&'a str>,
    pub fields: &'a Map<String, Value>,
}

impl<'a> SectionProps<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self {
            key: fields.get("_key").and_then(Value::as_str),
            fields,
        }
    }

    pub fn text(&self, field: &str, ctx: &RenderContext) -> &'a str {
        localized(self.fields.get(field), &ctx.locale)
    }

    pub fn str(&self, field: &str) -> Option<&'a str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Object items of an array field; nulls and scalars are skipped.
    pub fn items(&self, field: &str) -> Vec<SectionProps<'a>> {
        self.fields
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).map(SectionProps::new).collect())
            .unwrap_or_default()
    }

    pub fn asset(&self, field: &str) -> Option<AssetRef> {
        AssetRef::from_value(self.fields.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn localized_handles_every_shape() {
        assert_eq!(localized(Some(&json!({ "en": "Hi" })), "en"), "Hi");
        assert_eq!(localized(Some(&json!({ "en": "Hi" })), "de"), "");
        assert_eq!(localized(Some(&json!("Hi")), "de"), "Hi");
        assert_eq!(localized(Some(&json!(42)), "en"), "");
        assert_eq!(localized(None, "en"), "");
    }

    #[test]
    fn items_skip_non_objects() {
        let fields = json!({ "items": [ { "name": "a" }, null, 3, { "name": "b" } ] });
        let props = SectionProps::new(fields.as_object().unwrap());
        let names: Vec<_> = props.items("items").iter().filter_map(|i| i.str("name")).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(props.items("missing").is_empty());
    }
}
