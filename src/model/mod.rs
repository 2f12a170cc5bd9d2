//! Typed views over CMS documents. Every field is optional-safe: a document that
//! is missing fields still deserializes, and renderers fall back to empty output.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-locale text, `{ "en": "..." }`. A bare string counts for every locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizedText {
    values: BTreeMap<String, String>,
    fallback: Option<String>,
}

impl LocalizedText {
    /// Text for `locale`, or the empty string when absent.
    pub fn get(&self, locale: &str) -> &str {
        self.values
            .get(locale)
            .map(String::as_str)
            .or(self.fallback.as_deref())
            .unwrap_or("")
    }

    /// Read localized text out of an untyped field.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self {
                values: BTreeMap::new(),
                fallback: Some(s.clone()),
            },
            Some(Value::Object(map)) => Self {
                values: map
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect(),
                fallback: None,
            },
            _ => Self::default(),
        }
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Self::from_value(value.as_ref()))
    }
}

/// Asset pointer as it appears in fetched content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetRef {
    Resolved(ResolvedAsset),
    Reference {
        #[serde(rename = "_ref")]
        reference: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAsset {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub svg_data: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl AssetRef {
    /// Lenient read: null, strings and malformed objects give `None`.
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value {
            Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).ok(),
            _ => None,
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedAsset> {
        match self {
            AssetRef::Resolved(asset) => Some(asset),
            AssetRef::Reference { .. } => None,
        }
    }
}

/// Returns the `_ref` id when `value` is an unresolved reference object.
pub fn unresolved_ref(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.contains_key("_id") {
        return None;
    }
    map.get("_ref").and_then(Value::as_str)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slug {
    #[serde(default)]
    #[serde(deserialize_with = "lenient")]
    pub current: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    #[serde(rename = "_key")]
    pub key: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub platform: String,
    #[serde(deserialize_with = "lenient")]
    pub url: String,
    pub icon: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "_id")]
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    pub role: LocalizedText,
    pub bio: LocalizedText,
    pub avatar: Option<Value>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub socials: Vec<SocialLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct About {
    #[serde(rename = "_id")]
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    pub title: LocalizedText,
    pub intro: LocalizedText,
    #[serde(deserialize_with = "lenient")]
    pub sections: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    #[serde(rename = "_id")]
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    #[serde(deserialize_with = "lenient")]
    pub slug: Slug,
    #[serde(deserialize_with = "lenient")]
    pub sections: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    #[serde(rename = "_id")]
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    pub title: LocalizedText,
    pub summary: LocalizedText,
    #[serde(deserialize_with = "lenient")]
    pub slug: Slug,
    pub thumbnail: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub sections: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub related: Vec<Value>,
}

/// Field-level leniency: `null` or a mismatched shape becomes the default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserialize a fetched document, treating shape mismatches as absence.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(error = %e, "document did not match expected shape");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn localized_text_missing_locale_is_empty() {
        let text: LocalizedText = serde_json::from_value(json!({ "en": "Hello" })).unwrap();
        assert_eq!(text.get("en"), "Hello");
        assert_eq!(text.get("fr"), "");
    }

    #[test]
    fn localized_text_tolerates_null_and_plain_strings() {
        let null: LocalizedText = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(null.get("en"), "");

        let plain: LocalizedText = serde_json::from_value(json!("Bonjour")).unwrap();
        assert_eq!(plain.get("en"), "Bonjour");
        assert_eq!(plain.get("fr"), "Bonjour");
    }

    #[test]
    fn asset_ref_accepts_both_shapes() {
        let reference = AssetRef::from_value(Some(&json!({ "_ref": "icon-rust", "_type": "reference" }))).unwrap();
        assert_eq!(reference, AssetRef::Reference { reference: "icon-rust".to_string() });
        assert!(reference.resolved().is_none());

        let resolved = AssetRef::from_value(Some(&json!({ "_id": "icon-rust", "color": "#dea584" }))).unwrap();
        assert_eq!(resolved.resolved().unwrap().color.as_deref(), Some("#dea584"));
        assert_eq!(resolved.resolved().unwrap().id, "icon-rust");
    }

    #[test]
    fn asset_ref_rejects_garbage_without_panicking() {
        assert!(AssetRef::from_value(None).is_none());
        assert!(AssetRef::from_value(Some(&json!(null))).is_none());
        assert!(AssetRef::from_value(Some(&json!("icon-rust"))).is_none());
        assert!(AssetRef::from_value(Some(&json!({ "color": "red" }))).is_none());
    }

    #[test]
    fn partial_documents_still_decode() {
        let project: ProjectMeta = decode(&json!({ "_id": "p1", "title": { "en": "Tracer" } })).unwrap();
        assert_eq!(project.title.get("en"), "Tracer");
        assert!(project.sections.is_empty());
        assert_eq!(project.slug.current, "");
        assert!(decode::<ProjectMeta>(&json!(null)).is_none());
    }
}
