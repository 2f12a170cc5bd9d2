// Full-page composition

use serde_json::Value;

use super::html;
use super::sections::project_card;
use super::{RenderContext, SectionProps, SectionRegistry};
use crate::config::CmsConfig;
use crate::model::{decode, About, AssetRef, PageMeta, ProjectMeta, User};

const SITE_STYLES: &str = "/assets/site.css";

pub fn document(title: &str, path: &str, body: &str, ctx: &RenderContext) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="canonical" href="{base}{path}">
<link rel="stylesheet" href="{styles}">
</head>
<body>
<nav class="site-nav"><a href="/">Home</a><a href="/about">About</a><a href="/projects">Projects</a></nav>
<main>{body}</main>
</body>
</html>"#,
        lang = html::attr(&ctx.locale),
        title = html::text(title),
        base = html::attr(&ctx.base_url),
        path = html::attr(path),
        styles = SITE_STYLES,
        body = body
    )
}

fn project_cards(projects: &Value, ctx: &RenderContext) -> String {
    projects
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|p| project_card(&SectionProps::new(p), ctx))
                .collect()
        })
        .unwrap_or_default()
}

fn profile(user: &User, ctx: &RenderContext) -> String {
    let socials: String = user
        .socials
        .iter()
        .filter_map(|social| {
            let url = html::safe_url(&social.url)?;
            let icon = AssetRef::from_value(social.icon.as_ref());
            Some(format!(
                r#"<li><a href="{}" rel="me noopener">{}<span>{}</span></a></li>"#,
                html::attr(url),
                html::asset(icon.as_ref(), &social.platform, "social__icon"),
                html::text(&social.platform)
            ))
        })
        .collect();

    format!(
        r#"<header class="profile">{avatar}{name}<p class="profile__role">{role}</p>{bio}<ul class="socials">{socials}</ul></header>"#,
        avatar = html::asset(AssetRef::from_value(user.avatar.as_ref()).as_ref(), &user.name, "profile__avatar"),
        name = html::heading(1, &user.name),
        role = html::text(user.role.get(&ctx.locale)),
        bio = html::paragraphs(user.bio.get(&ctx.locale)),
        socials = socials
    )
}

/// Landing page. Every input may be empty; missing parts are left out.
pub fn home(user: &Value, about: &Value, projects: &Value, registry: &SectionRegistry, ctx: &RenderContext) -> String {
    let user: Option<User> = decode(user);
    let about: Option<About> = decode(about);

    let mut body = String::new();
    if let Some(user) = &user {
        body.push_str(&profile(user, ctx));
    }
    if let Some(about) = &about {
        body.push_str(&html::paragraphs(about.intro.get(&ctx.locale)));
        body.push_str(&registry.render_all(&about.sections, ctx));
    }
    let cards = project_cards(projects, ctx);
    if !cards.is_empty() {
        body.push_str(&format!(r#"<section class="featured"><h2>Projects</h2><div class="project-grid">{}</div></section>"#, cards));
    }

    let title = user.as_ref().map(|u| u.name.as_str()).filter(|n| !n.is_empty()).unwrap_or("Portfolio");
    document(title, "/", &body, ctx)
}

pub fn about(about: &Value, registry: &SectionRegistry, ctx: &RenderContext) -> Option<String> {
    let about: About = decode(about)?;
    let title = about.title.get(&ctx.locale);
    let body = format!(
        "{}{}{}",
        html::heading(1, title),
        html::paragraphs(about.intro.get(&ctx.locale)),
        registry.render_all(&about.sections, ctx)
    );
    Some(document(if title.is_empty() { "About" } else { title }, "/about", &body, ctx))
}

pub fn project_index(projects: &Value, ctx: &RenderContext) -> String {
    let body = format!(
        r#"<h1>Projects</h1><div class="project-grid">{}</div>"#,
        project_cards(projects, ctx)
    );
    document("Projects", "/projects", &body, ctx)
}

pub fn project(project: &Value, registry: &SectionRegistry, ctx: &RenderContext) -> Option<String> {
    let project: ProjectMeta = decode(project)?;
    let title = project.title.get(&ctx.locale);
    let tags: String = project
        .tags
        .iter()
        .map(|t| format!("<li>{}</li>", html::text(t)))
        .collect();
    let related = project_cards(&Value::Array(project.related.clone()), ctx);

    let mut body = format!(
        r#"<article class="project">{}{}<p class="project__summary">{}</p><ul class="tags">{}</ul>{}</article>"#,
        html::asset(AssetRef::from_value(project.thumbnail.as_ref()).as_ref(), title, "project__cover"),
        html::heading(1, title),
        html::text(project.summary.get(&ctx.locale)),
        tags,
        registry.render_all(&project.sections, ctx)
    );
    if !related.is_empty() {
        body.push_str(&format!(r#"<aside class="related"><h2>Related</h2><div class="project-grid">{}</div></aside>"#, related));
    }

    let path = format!("/projects/{}", project.slug.current);
    Some(document(if title.is_empty() { "Project" } else { title }, &path, &body, ctx))
}

pub fn content_page(page: &Value, registry: &SectionRegistry, ctx: &RenderContext) -> Option<String> {
    let page: PageMeta = decode(page)?;
    let title = page.title.get(&ctx.locale);
    let body = format!(
        "{}{}{}",
        html::heading(1, title),
        html::paragraphs(page.description.get(&ctx.locale)),
        registry.render_all(&page.sections, ctx)
    );
    let path = format!("/pages/{}", page.slug.current);
    Some(document(if title.is_empty() { "Page" } else { title }, &path, &body, ctx))
}

pub fn not_found(ctx: &RenderContext) -> String {
    document(
        "Not found",
        "/404",
        r#"<h1>Page not found</h1><p><a href="/">Back to the home page</a></p>"#,
        ctx,
    )
}

/// Generic failure page. Carries no detail about what went wrong.
pub fn server_error(ctx: &RenderContext) -> String {
    document(
        "Something went wrong",
        "/500",
        r#"<h1>Something went wrong</h1><p>Please try again in a moment.</p>"#,
        ctx,
    )
}

pub fn login(callback: &str, ctx: &RenderContext) -> String {
    let body = format!(
        r#"<h1>Sign in</h1><p>Sign in with an administrator account to open the studio.</p><form method="post" action="/api/auth/signin"><input type="hidden" name="callbackUrl" value="{}"><button type="submit">Continue</button></form>"#,
        html::attr(callback)
    );
    document("Sign in", "/login", &body, ctx)
}

/// Shell page that boots the CMS studio bundle under `base_path`.
pub fn studio(cms: &CmsConfig, base_path: &str, user: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="robots" content="noindex">
<title>Studio</title>
</head>
<body>
<div id="studio" data-project-id="{project}" data-dataset="{dataset}" data-api-version="{version}" data-base-path="{base}" data-user="{user}"></div>
<script type="module" src="{base}/static/studio.js"></script>
</body>
</html>"#,
        project = html::attr(&cms.project_id),
        dataset = html::attr(&cms.dataset),
        version = html::attr(&cms.api_version),
        base = html::attr(base_path),
        user = html::attr(user)
    )
}
