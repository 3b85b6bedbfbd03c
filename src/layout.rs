//! Layouts that wrap a page's body into a full HTML document.
//!
//! The set of layouts is closed: a page picks one through its `template`
//! field and each variant owns its render function. Both share the
//! [`head`] and [`foot`] partials inside one document skeleton.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::page::{OgType, Page};
use maud::{DOCTYPE, Markup, PreEscaped, Render, html};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Content is already HTML and is emitted as-is.
    Page,
    /// Content is Markdown, rendered under a title and date header.
    Post,
}

impl Layout {
    pub fn render(&self, ctx: &Context<'_>, page: &Page, content: &str, out: &mut String) -> Result<()> {
        let markup = match self {
            Layout::Page => page_layout(ctx, page, content)?,
            Layout::Post => post_layout(ctx, page, content)?,
        };
        markup.render_to(out);
        Ok(())
    }
}

fn page_layout(ctx: &Context<'_>, page: &Page, content: &str) -> Result<Markup> {
    document(ctx, page, PreEscaped(content.to_string()))
}

fn post_layout(ctx: &Context<'_>, page: &Page, content: &str) -> Result<Markup> {
    let body = ctx.markdown().render(content);
    let main = html! {
        article.post {
            div.post-body {
                header.post-header {
                    h1 { (page.title) }
                    div.post-date {
                        time datetime=(page.atom_date()) { (page.human_date()) }
                    }
                }
                div.rich-text {
                    (PreEscaped(body))
                }
            }
        }
    };
    document(ctx, page, main)
}

/// `og:image:type` from the image URL's extension.
pub fn image_type(image: &str) -> Result<&'static str> {
    let path = image.split(['?', '#']).next().unwrap_or_default();
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => Ok("png"),
        Some("jpeg") | Some("jpg") => Ok("jpeg"),
        _ => Err(Error::UnknownImageType(image.to_string())),
    }
}

/// Full HTML document around `main`.
fn document(ctx: &Context<'_>, page: &Page, main: Markup) -> Result<Markup> {
    let head = head(ctx, page)?;
    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            (head)
            body {
                div.top-bar {}
                @if page.hidden {
                    div.hidden-banner { "This post is hidden" }
                }
                @if page.show_menu {
                    button.menu-open aria-label="Open menu" data-micromodal-trigger="main-menu" { "☰" }
                }
                (main)
                (foot(ctx, page))
            }
        }
    })
}

/// The `<head>` element: assets, meta, social cards.
pub fn head(ctx: &Context<'_>, page: &Page) -> Result<Markup> {
    let site = ctx.site();
    let url = ctx.url();
    let canonical = ctx.request().url();
    let image_type = image_type(&page.image)?;
    let stylesheet = url.asset("site.css")?;
    let script = url.asset("site.js")?;
    let favicon = site.favicon.as_deref().map(|icon| url.asset(icon)).transpose()?;
    let feed = url.to("feed.xml");
    let twitter = format!("@{}", site.twitter);

    Ok(html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            link rel="stylesheet" href=(stylesheet);
            script src=(script) defer {}
            title { (page.title) }
            meta name="description" content=(page.description);
            link rel="home" href=(url.to("/"));
            link rel="canonical" href=(canonical);
            link type="application/atom+xml" rel="alternate" href=(feed) title=(site.author);
            @if page.hidden {
                meta name="robots" content="noindex";
            }
            meta property="og:site_name" content=(site.author);
            meta property="og:locale" content=(site.locale);
            meta property="og:title" content=(page.title);
            meta property="og:description" content=(page.description);
            meta property="og:url" content=(canonical);
            meta property="og:image" content=(page.image);
            meta property="og:image:height" content="630";
            meta property="og:image:width" content="1200";
            meta property="og:image:type" content={ "image/" (image_type) };
            meta property="og:type" content=(page.og_type.as_str());
            @if page.og_type == OgType::Article {
                meta property="og:article:published_time" content=(page.atom_date());
            }
            meta name="twitter:site" content=(twitter);
            meta name="twitter:creator" content=(twitter);
            meta name="twitter:card" content="summary_large_image";
            meta name="twitter:title" content=(page.title);
            meta name="twitter:description" content=(page.description);
            meta name="twitter:image" content=(page.image);
            meta name="theme-color" content=(site.theme_color);
            @if let Some(favicon) = &favicon {
                link rel="icon" href=(favicon);
            }
        }
    })
}

/// Footer navigation and, when the page shows a menu, the menu dialog.
pub fn foot(ctx: &Context<'_>, page: &Page) -> Markup {
    let links = nav_links(ctx);
    html! {
        footer.site-footer {
            nav {
                ul {
                    @for (label, href) in &links {
                        li { a href=(href) { (label) } }
                    }
                }
            }
            @if let Some(note) = &ctx.site().footer_note {
                div.footer-note { (note) }
            }
        }
        @if page.show_menu {
            div id="main-menu" aria-hidden="true" {
                div tabindex="-1" data-micromodal-close {
                    div role="dialog" aria-modal="true" aria-label="Main menu" {
                        nav {
                            ul {
                                @for (label, href) in &links {
                                    li { a href=(href) { (label) } }
                                }
                            }
                        }
                        button.menu-close aria-label="Close menu" onclick="window.MicroModal.close('main-menu');" { "×" }
                    }
                }
            }
        }
    }
}

fn nav_links(ctx: &Context<'_>) -> Vec<(&'static str, String)> {
    let site = ctx.site();
    let mut links = vec![("Posts", ctx.url().to("/"))];
    if !site.twitter.is_empty() {
        links.push(("X (Twitter)", format!("https://x.com/{}", site.twitter)));
    }
    if !site.github.is_empty() {
        links.push(("GitHub", format!("https://github.com/{}", site.github)));
    }
    links.push(("RSS", ctx.url().to("feed.xml")));
    links
}
