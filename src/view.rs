//! Render sources: built-in views and documents on disk.
//!
//! Built-in views are plain functions over a [`Context`] that write to the
//! capture buffer and optionally return a [`Page`]. Returning a page asks the
//! renderer to wrap the output in that page's layout; returning `None` makes
//! the output the final body (the feed and the error page do this).

use crate::context::Context;
use crate::document::Document;
use crate::error::Result;
use crate::layout::Layout;
use crate::page::{OgType, Page, atom_date};
use chrono::Utc;
use maud::{DOCTYPE, PreEscaped, Render, html};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    About,
    Feed,
    Error,
}

impl View {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "home" => Some(View::Home),
            "about" => Some(View::About),
            "feed.xml" => Some(View::Feed),
            "error" => Some(View::Error),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::About => "about",
            View::Feed => "feed.xml",
            View::Error => "error",
        }
    }

    pub fn render(&self, ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
        match self {
            View::Home => home(ctx, out),
            View::About => about(ctx, out),
            View::Feed => feed(ctx, out),
            View::Error => error(ctx, out),
        }
    }
}

/// What a render target resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    View(View),
    Document(PathBuf),
}

impl Source {
    pub fn render(&self, ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
        match self {
            Source::View(view) => view.render(ctx, out),
            Source::Document(file) => Document::read(file)?.render(ctx, out),
        }
    }
}

/// Page record for a built-in view, using the page layout and site image.
fn builtin_page(ctx: &Context<'_>, view: View, title: &str, description: &str) -> Result<Page> {
    Ok(Page {
        file: PathBuf::from(view.name()),
        image: ctx.url().asset(&ctx.site().default_image)?,
        title: title.to_string(),
        description: description.to_string(),
        hidden: false,
        template: Layout::Page,
        og_type: OgType::Website,
        date: Utc::now(),
        format: None,
        external_link: None,
        show_menu: true,
    })
}

fn home(ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
    let site = ctx.site();
    let url = ctx.url();
    let posts = ctx
        .collection()
        .load("posts", ctx.globals().listing, ctx.props())?;
    let profile = url.asset(&site.profile_image)?;

    let mut entries = Vec::with_capacity(posts.len());
    for post in &posts {
        let href = match &post.external_link {
            Some(link) => link.clone(),
            None => url.page(post)?,
        };
        entries.push((post, href));
    }

    html! {
        div.home {
            header.intro {
                div.avatar {
                    img src=(profile) alt="Profile image" height="175" width="175";
                }
                h1 { (site.author) }
                div.tagline { (site.subtitle) }
                @if let Some(location) = &site.location {
                    div.location { (location) }
                }
            }
            ul.post-list {
                @for (post, href) in &entries {
                    li.post-item {
                        h3 { a href=(href) { (post.title) } }
                        div.post-meta {
                            @if post.is_video() {
                                span.format.format-video title="Video post" {}
                            } @else {
                                span.format.format-article title="Blog post" {}
                            }
                            @if post.external_link.is_some() {
                                span.guest-post title="Guest post" {}
                            }
                            time datetime=(post.atom_date()) { (post.human_date()) }
                        }
                        p.description { (post.description) }
                    }
                }
            }
        }
    }
    .render_to(out);

    let page = builtin_page(ctx, View::Home, &site.title, &site.subtitle)?;
    Ok(Some(page))
}

fn about(ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
    let site = ctx.site();
    let body = ctx.markdown().render(&site.about);
    html! {
        div.about {
            div.rich-text { (PreEscaped(body)) }
        }
    }
    .render_to(out);

    let page = builtin_page(ctx, View::About, "About", &format!("About {}", site.author))?;
    Ok(Some(page))
}

/// Atom feed of published posts. Written by hand rather than through maud,
/// which emits HTML void elements instead of self-closed XML ones.
fn feed(ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
    let site = ctx.site();
    let url = ctx.url();
    let e = |text: &str| ctx.escape(text).into_owned();
    let posts = ctx
        .collection()
        .load("posts", ctx.globals().listing, ctx.props())?;
    let updated = posts.first().map(|p| p.date).unwrap_or_else(Utc::now);
    let self_link = url.to("feed.xml");

    writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(out, r#"<feed xmlns="http://www.w3.org/2005/Atom">"#)?;
    writeln!(out, r#"    <link href="{}" rel="alternate" type="text/html" />"#, e(&url.to("/")))?;
    writeln!(out, r#"    <link href="{}" rel="self" type="application/atom+xml" />"#, e(&self_link))?;
    writeln!(out, "    <id>{}</id>", e(&self_link))?;
    writeln!(out, "    <updated>{}</updated>", e(&atom_date(&updated)))?;
    writeln!(out, "    <title>{}</title>", e(&site.author))?;
    writeln!(out, "    <subtitle>{}</subtitle>", e(&site.subtitle))?;
    write_author(out, &e(&site.author), &e(&site.author_uri), "    ")?;
    writeln!(out, "    <icon>{}</icon>", e(&url.asset(&site.profile_image)?))?;
    writeln!(out, "    <logo>{}</logo>", e(&url.asset(&site.default_image)?))?;

    for post in &posts {
        let link = e(&url.page(post)?);
        let title = e(&post.title);
        let date = e(&post.atom_date());
        writeln!(out, "    <entry>")?;
        writeln!(out, "        <id>{link}</id>")?;
        writeln!(out, "        <title>{title}</title>")?;
        writeln!(out, "        <published>{date}</published>")?;
        writeln!(out, "        <updated>{date}</updated>")?;
        writeln!(out, "        <summary>{}</summary>", e(&post.description))?;
        writeln!(
            out,
            r#"        <content type="html"><![CDATA[Check out <a href="{link}">the full article</a>.]]></content>"#
        )?;
        writeln!(
            out,
            r#"        <link href="{link}" rel="alternate" type="text/html" title="{title}" />"#
        )?;
        writeln!(
            out,
            r#"        <media:thumbnail xmlns:media="http://search.yahoo.com/mrss/" url="{}" />"#,
            e(&post.image)
        )?;
        write_author(out, &e(&site.author), &e(&site.author_uri), "        ")?;
        writeln!(out, "    </entry>")?;
    }
    writeln!(out, "</feed>")?;

    Ok(None)
}

fn write_author(out: &mut String, name: &str, uri: &str, indent: &str) -> std::fmt::Result {
    writeln!(out, "{indent}<author>")?;
    writeln!(out, "{indent}    <name>{name}</name>")?;
    writeln!(out, "{indent}    <uri>{uri}</uri>")?;
    writeln!(out, "{indent}</author>")
}

/// Standalone error document; never wrapped in a layout.
fn error(ctx: &Context<'_>, out: &mut String) -> Result<Option<Page>> {
    let message = ctx.prop_str("message").unwrap_or("Error");
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (message) }
            }
            body {
                div style="display: flex; height: 100vh; align-items: center; justify-content: center;" {
                    div style="text-align: center;" {
                        h1 { (message) }
                        a href=(ctx.url().to("/")) { "Home" }
                    }
                }
            }
        }
    }
    .render_to(out);
    Ok(None)
}
