//! Built-in section renderers. Each one tolerates missing fields and
//! unresolved references; the worst case is an empty or placeholder fragment.

use super::html;
use super::{RenderContext, SectionProps};

fn link(href: Option<&str>, label: &str, class: &str) -> String {
    match href.and_then(html::safe_url) {
        Some(url) if !label.trim().is_empty() => format!(
            r#"<a class="{}" href="{}">{}</a>"#,
            html::attr(class),
            html::attr(url),
            html::text(label)
        ),
        _ => String::new(),
    }
}

pub fn hero(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let title = props.text("title", ctx);
    let mut out = String::new();
    out.push_str(&html::asset(props.asset("image").as_ref(), title, "hero__image"));
    out.push_str(&html::heading(1, title));
    let subtitle = props.text("subtitle", ctx);
    if !subtitle.is_empty() {
        out.push_str(&format!(r#"<p class="hero__subtitle">{}</p>"#, html::text(subtitle)));
    }
    out.push_str(&link(props.str("ctaHref"), props.text("ctaLabel", ctx), "hero__cta"));
    out
}

pub fn text(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    format!(
        "{}{}",
        html::heading(2, props.text("heading", ctx)),
        html::paragraphs(props.text("body", ctx))
    )
}

pub fn skills(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let items: String = props
        .items("items")
        .iter()
        .map(|item| {
            let name = item.text("name", ctx);
            format!(
                r#"<li class="skill">{}<span class="skill__name">{}</span></li>"#,
                html::asset(item.asset("icon").as_ref(), name, "skill__icon"),
                html::text(name)
            )
        })
        .collect();
    format!(
        r#"{}<ul class="skills">{}</ul>"#,
        html::heading(2, props.text("heading", ctx)),
        items
    )
}

pub fn experience(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let entries: String = props
        .items("items")
        .iter()
        .map(|item| {
            let company = item.text("company", ctx);
            let period = match (item.str("start"), item.str("end")) {
                (Some(start), Some(end)) => format!("{} – {}", start, end),
                (Some(start), None) => format!("{} – present", start),
                _ => String::new(),
            };
            format!(
                r#"<li class="experience">{}<div><h3>{}</h3><p class="experience__role">{}</p><p class="experience__period">{}</p>{}</div></li>"#,
                html::asset(item.asset("logo").as_ref(), company, "experience__logo"),
                html::text(company),
                html::text(item.text("role", ctx)),
                html::text(&period),
                html::paragraphs(item.text("description", ctx))
            )
        })
        .collect();
    format!(
        r#"{}<ol class="timeline">{}</ol>"#,
        html::heading(2, props.text("heading", ctx)),
        entries
    )
}

/// Card linking to a project page. Shared by project grids and listings.
pub fn project_card(project: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let title = project.text("title", ctx);
    let slug = project
        .fields
        .get("slug")
        .and_then(|s| s.get("current"))
        .and_then(|c| c.as_str())
        .unwrap_or("");
    let body = format!(
        r#"{}<h3>{}</h3><p>{}</p>"#,
        html::asset(project.asset("thumbnail").as_ref(), title, "project-card__thumb"),
        html::text(title),
        html::text(project.text("summary", ctx))
    );
    if slug.is_empty() {
        format!(r#"<article class="project-card">{}</article>"#, body)
    } else {
        format!(
            r#"<article class="project-card"><a href="/projects/{}">{}</a></article>"#,
            html::attr(&url::form_urlencoded::byte_serialize(slug.as_bytes()).collect::<String>()),
            body
        )
    }
}

pub fn projects(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let cards: String = props
        .items("projects")
        .iter()
        .map(|project| project_card(project, ctx))
        .collect();
    format!(
        r#"{}<div class="project-grid">{}</div>"#,
        html::heading(2, props.text("heading", ctx)),
        cards
    )
}

pub fn gallery(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let caption = props.text("heading", ctx);
    let figures: String = props
        .fields
        .get("images")
        .and_then(|v| v.as_array())
        .map(|images| {
            images
                .iter()
                .map(|image| {
                    let asset = crate::model::AssetRef::from_value(Some(image));
                    format!("<figure>{}</figure>", html::asset(asset.as_ref(), caption, "gallery__image"))
                })
                .collect()
        })
        .unwrap_or_default();
    format!(r#"{}<div class="gallery">{}</div>"#, html::heading(2, caption), figures)
}

pub fn quote(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    let author = props.text("author", ctx);
    let cite = if author.is_empty() {
        String::new()
    } else {
        format!("<footer>{}</footer>", html::text(author))
    };
    format!(
        "<blockquote><p>{}</p>{}</blockquote>",
        html::text(props.text("text", ctx)),
        cite
    )
}

pub fn call_to_action(props: &SectionProps<'_>, ctx: &RenderContext) -> String {
    format!(
        "{}{}{}",
        html::heading(2, props.text("heading", ctx)),
        html::paragraphs(props.text("body", ctx)),
        link(props.str("href"), props.text("label", ctx), "cta__button")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn render(renderer: fn(&SectionProps<'_>, &RenderContext) -> String, section: Value) -> String {
        renderer(&SectionProps::new(section.as_object().unwrap()), &RenderContext::default())
    }

    #[test]
    fn empty_sections_render_without_panicking() {
        let renderers: [fn(&SectionProps<'_>, &RenderContext) -> String; 8] =
            [hero, text, skills, experience, projects, gallery, quote, call_to_action];
        for renderer in renderers {
            let _ = render(renderer, json!({}));
        }
    }

    #[test]
    fn skills_render_icons_and_placeholders() {
        let html = render(
            skills,
            json!({
                "heading": { "en": "Toolbox" },
                "items": [
                    { "_key": "1", "name": "Rust", "icon": { "_id": "i1", "svgData": "<svg></svg>" } },
                    { "_key": "2", "name": "Go", "icon": { "_ref": "i2" } },
                    { "_key": "3", "name": "C", "icon": null }
                ]
            }),
        );
        assert!(html.contains("<h2>Toolbox</h2>"));
        assert!(html.contains("<svg></svg>"));
        assert_eq!(html.matches("asset-placeholder").count(), 2);
    }

    #[test]
    fn missing_locale_renders_empty_text() {
        let ctx = RenderContext {
            locale: "fr".to_string(),
            ..RenderContext::default()
        };
        let section = json!({ "heading": { "en": "Hello" }, "body": { "en": "World" } });
        let html = text(&SectionProps::new(section.as_object().unwrap()), &ctx);
        assert_eq!(html, "");
    }

    #[test]
    fn unsafe_links_are_dropped() {
        let html = render(call_to_action, json!({ "label": "Go", "href": "javascript:alert(1)" }));
        assert!(!html.contains("<a"));
        let html = render(call_to_action, json!({ "label": "Go", "href": "mailto:me@example.dev" }));
        assert!(html.contains(r#"href="mailto:me@example.dev""#));
    }

    #[test]
    fn project_cards_link_by_slug() {
        let html = render(
            projects,
            json!({ "projects": [ { "title": "Tracer", "slug": { "current": "tracer" }, "thumbnail": { "_ref": "t" } } ] }),
        );
        assert!(html.contains(r#"href="/projects/tracer""#));
        assert!(html.contains("asset-placeholder"));
    }

    #[test]
    fn experience_period_formats() {
        let html = render(
            experience,
            json!({ "items": [ { "company": "Acme", "role": { "en": "Engineer" }, "start": "2020" } ] }),
        );
        assert!(html.contains("2020 – present"));
        assert!(html.contains("Engineer"));
    }
}
