// handlers/public/mod.rs - endpoints that need no session
//
// JSON read endpoints under /api, server-rendered pages, the revalidation hook,
// the login page and the health probe.

pub mod content;
pub mod github;
pub mod health;
pub mod login;
pub mod pages;
pub mod revalidate;

pub use content::*;
pub use github::github_repos;
pub use health::health;
pub use login::login;
pub use pages::*;
pub use revalidate::revalidate;
