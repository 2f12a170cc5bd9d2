// GROQ query composition per content kind

use super::ContentRequest;
use crate::cms::GroqQuery;

/// Projection applied to every dereferenced asset (icons, logos, thumbnails).
pub const ASSET_PROJECTION: &str = r#"{ _id, _type, svgData, color, alt, "url": coalesce(url, image.asset->url) }"#;

/// Asset document kinds addressable through the asset endpoint.
pub const ASSET_TYPES: &[&str] = &["icon", "logo", "asset"];

fn section_projection() -> String {
    format!(
        r#"sections[]->{{
  ...,
  "icon": icon->{asset},
  "logo": logo->{asset},
  "image": image->{asset},
  items[]{{ ..., "icon": icon->{asset}, "logo": logo->{asset} }},
  images[]->{asset},
  "projects": projects[]->{{ _id, title, summary, slug, "thumbnail": thumbnail->{asset} }}
}}"#,
        asset = ASSET_PROJECTION
    )
}

pub fn user() -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_type == "user"][0]{{
  _id, name, role, bio, email,
  "avatar": avatar->{asset},
  socials[]{{ _key, platform, url, "icon": icon->{asset} }}
}}"#,
        asset = ASSET_PROJECTION
    ))
}

pub fn about() -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_type == "about"][0]{{ _id, title, intro, {sections} }}"#,
        sections = section_projection()
    ))
}

pub fn page(slug: &str) -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_type == "pageMeta" && slug.current == $slug][0]{{ _id, title, description, slug, {sections} }}"#,
        sections = section_projection()
    ))
    .param("slug", slug)
}

/// Related projects keep raw thumbnail references; they are resolved afterwards
/// with concurrent asset lookups.
pub fn project(slug: &str) -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_type == "projectMeta" && slug.current == $slug][0]{{
  _id, title, summary, slug, tags,
  "thumbnail": thumbnail->{asset},
  {sections},
  "related": related[]->{{ _id, title, summary, slug, thumbnail }}
}}"#,
        asset = ASSET_PROJECTION,
        sections = section_projection()
    ))
    .param("slug", slug)
}

pub fn projects() -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_type == "projectMeta" && defined(slug.current)] | order(coalesce(order, 1000) asc, _createdAt desc){{
  _id, title, summary, slug, tags, "thumbnail": thumbnail->{asset}
}}"#,
        asset = ASSET_PROJECTION
    ))
}

pub fn asset(id: &str) -> GroqQuery {
    GroqQuery::new(format!(
        r#"*[_id == $id && _type in $types][0]{asset}"#,
        asset = ASSET_PROJECTION
    ))
    .param("id", id)
    .param("types", ASSET_TYPES.to_vec())
}

pub fn documents(doc_type: &str) -> GroqQuery {
    GroqQuery::new(r#"*[_type == $type] | order(_createdAt asc)"#).param("type", doc_type)
}

/// Query for any content request.
pub fn for_request(request: &ContentRequest) -> GroqQuery {
    match request {
        ContentRequest::User => user(),
        ContentRequest::About => about(),
        ContentRequest::Asset { id } => asset(id),
        ContentRequest::Page { slug } => page(slug),
        ContentRequest::Project { slug } => project(slug),
        ContentRequest::Projects => projects(),
        ContentRequest::Documents { doc_type } => documents(doc_type),
    }
}
