//! End-to-end request handling against a throwaway project directory.
//!
//! Each test builds a project root with `site.toml`, a views directory and
//! the public assets, then drives it through [`Site::handle`] the same way
//! the `request` command does.

use folio::collection::{Collection, FsCollection, Visibility};
use folio::config::load_config;
use folio::context::{Globals, Props};
use folio::error::Error;
use folio::escape::escape;
use folio::http::Reply;
use folio::markdown::Markdown;
use folio::request::Request;
use folio::site::Site;
use folio::url::Url;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

const SITE_TOML: &str = r#"
[site]
title = "Integration"
author = "Tester"
production_url = "https://tester.dev"
twitter = "tester"

[redirects]
"/cv" = "https://elsewhere.dev/cv.pdf"
"/old-post" = "/posts/newer"
"#;

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("site.toml"), SITE_TOML).unwrap();
    let assets = tmp.path().join("public/assets");
    fs::create_dir_all(&assets).unwrap();
    for name in ["site.css", "site.js", "fallback.png", "profile.png"] {
        fs::write(assets.join(name), format!("contents of {name}")).unwrap();
    }
    fs::create_dir_all(tmp.path().join("resources/views")).unwrap();
    tmp
}

fn write_post(root: &Path, kind: &str, slug: &str, front_matter: &str) -> PathBuf {
    let dir = root.join("resources/views").join(kind);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{slug}.md"));
    fs::write(&path, format!("+++\n{front_matter}\n+++\nBody of {slug}.\n")).unwrap();
    path
}

fn dated(root: &Path, slug: &str, date: &str) -> PathBuf {
    write_post(
        root,
        "posts",
        slug,
        &format!("title = \"{slug}\"\ndescription = \"d\"\ndate = \"{date}\""),
    )
}

fn get(site: &Site, path: &str) -> Reply {
    site.handle("GET", path).unwrap()
}

#[test]
fn routing_is_deterministic() {
    let tmp = project();
    dated(tmp.path(), "hello", "2024-01-01");
    let site = Site::load(tmp.path(), true).unwrap();

    let first = get(&site, "/posts/hello");
    let second = get(&site, "/posts/hello");
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);

    assert_eq!(get(&site, "/posts/goodbye").status, 404);
    assert_eq!(get(&site, "/posts/goodbye").status, 404);
}

#[test]
fn hidden_posts_excluded_from_listings_but_fetchable() {
    let tmp = project();
    dated(tmp.path(), "visible", "2024-01-01");
    write_post(
        tmp.path(),
        "posts",
        "secret",
        "title = \"Secret post\"\ndescription = \"d\"\nhidden = true",
    );
    let site = Site::load(tmp.path(), false).unwrap();

    let home = get(&site, "/");
    assert!(home.body.contains("visible"));
    assert!(!home.body.contains("Secret post"));
    assert!(!get(&site, "/feed.xml").body.contains("Secret post"));

    let direct = get(&site, "/posts/secret");
    assert_eq!(direct.status, 200);
    assert!(direct.body.contains("Secret post"));
    assert!(direct.body.contains(r#"<meta name="robots" content="noindex">"#));
}

#[test]
fn local_mode_lists_hidden_posts() {
    let tmp = project();
    write_post(
        tmp.path(),
        "posts",
        "secret",
        "title = \"Secret post\"\ndescription = \"d\"\nhidden = true",
    );
    let site = Site::load(tmp.path(), true).unwrap();
    assert!(get(&site, "/").body.contains("Secret post"));
}

#[test]
fn collection_sorted_newest_first() {
    let tmp = project();
    dated(tmp.path(), "jan", "2024-01-01");
    dated(tmp.path(), "jun", "2024-06-01");
    dated(tmp.path(), "dec", "2023-12-01");

    let config = load_config(tmp.path()).unwrap();
    let views = config.paths.views_dir(tmp.path());
    let base = config.base_url(false);
    let globals = Rc::new(Globals {
        request: Request::new(base, "get", "/"),
        url: Url::new(base, config.paths.public_dir(tmp.path()), &views),
        markdown: Markdown::new(),
        site: config.site.clone(),
        listing: Visibility::Published,
    });
    let pages = FsCollection::new(&views, globals)
        .load("posts", Visibility::Published, &Props::new())
        .unwrap();

    let dates: Vec<String> = pages.iter().map(|p| p.date.format("%Y-%m-%d").to_string()).collect();
    assert_eq!(dates, vec!["2024-06-01", "2024-01-01", "2023-12-01"]);
}

#[test]
fn cache_hit_is_byte_identical_and_skips_render() {
    let tmp = project();
    let file = dated(tmp.path(), "hello", "2024-01-01");
    let site = Site::load(tmp.path(), false).unwrap();

    let first = get(&site, "/posts/hello");
    assert_eq!(first.header("Cache-Miss"), Some("1"));

    // Changing the source proves the second body comes from the cache file.
    fs::write(&file, "+++\ntitle = \"hello\"\ndescription = \"changed\"\ndate = \"2024-01-01\"\n+++\nNew body\n").unwrap();
    let second = get(&site, "/posts/hello");
    assert_eq!(second.header("Cache-Miss"), Some("0"));
    assert_eq!(first.body, second.body);
    assert_eq!(
        fs::read_to_string(tmp.path().join("public/posts/hello/index.html")).unwrap(),
        first.body
    );
}

#[test]
fn local_mode_always_rerenders() {
    let tmp = project();
    let file = dated(tmp.path(), "hello", "2024-01-01");
    let site = Site::load(tmp.path(), true).unwrap();

    assert_eq!(get(&site, "/posts/hello").header("Cache-Miss"), Some("1"));
    fs::write(&file, "+++\ntitle = \"hello\"\ndescription = \"d\"\ndate = \"2024-01-01\"\n+++\nNew body\n").unwrap();
    let again = get(&site, "/posts/hello");
    assert_eq!(again.header("Cache-Miss"), Some("1"));
    assert!(again.body.contains("New body"));
}

#[test]
fn escaping_encodes_every_special_character_once() {
    let escaped = escape("<script>&\"'");
    assert_eq!(escaped, "&lt;script&gt;&amp;&quot;&#x27;");
    assert_eq!(escape(&escaped), "&amp;lt;script&amp;gt;&amp;amp;&amp;quot;&amp;#x27;");
}

#[test]
fn non_read_methods_are_rejected() {
    let tmp = project();
    let site = Site::load(tmp.path(), false).unwrap();

    let reply = site.handle("POST", "/").unwrap();
    assert_eq!(reply.status, 405);
    assert!(!tmp.path().join("public/index.html").exists());

    // Redirects are non-error responses, so the check applies there too.
    assert_eq!(site.handle("DELETE", "/cv").unwrap().status, 405);
    // Unmatched paths stay 404 whatever the method.
    assert_eq!(site.handle("POST", "/nowhere").unwrap().status, 404);
}

#[test]
fn head_suppresses_body_but_keeps_length() {
    let tmp = project();
    let site = Site::load(tmp.path(), false).unwrap();
    let reply = site.handle("HEAD", "/about").unwrap();

    let mut wire = Vec::new();
    reply.write_to(&mut wire).unwrap();
    let wire = String::from_utf8(wire).unwrap();
    assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(wire.contains(&format!("Content-Length: {}\r\n", reply.body.len())));
    assert!(wire.ends_with("\r\n\r\n"));
}

#[test]
fn asset_urls_track_file_bytes() {
    let tmp = project();
    let url = Url::new("https://tester.dev", tmp.path().join("public"), tmp.path().join("resources/views"));

    let first = url.asset("site.css").unwrap();
    assert_eq!(first, url.asset("site.css").unwrap());

    fs::write(tmp.path().join("public/assets/site.css"), "body { color: red }").unwrap();
    assert_ne!(first, url.asset("site.css").unwrap());
}

#[test]
fn missing_page_fails_the_whole_listing() {
    let tmp = project();
    dated(tmp.path(), "fine", "2024-01-01");
    let bad = tmp.path().join("resources/views/posts/bad.md");
    fs::write(&bad, "Text, but no front matter.").unwrap();
    let site = Site::load(tmp.path(), false).unwrap();

    match site.handle("GET", "/") {
        Err(Error::MissingPage { file }) => assert_eq!(file, bad),
        other => panic!("expected MissingPage, got {other:?}"),
    }

    let reply = site.respond("GET", "/");
    assert_eq!(reply.status, 500);
    assert_eq!(reply.header("Content-Type"), Some("text/plain; charset=utf-8"));
    let log = fs::read_to_string(tmp.path().join("error.log")).unwrap();
    assert!(log.contains("MissingPage"));
    assert!(log.contains("bad.md"));
}

#[test]
fn redirects_resolve_against_base_url() {
    let tmp = project();
    let site = Site::load(tmp.path(), false).unwrap();

    let external = get(&site, "/cv");
    assert_eq!(external.status, 307);
    assert_eq!(external.header("Location"), Some("https://elsewhere.dev/cv.pdf"));
    assert_eq!(external.body, "");

    let internal = get(&site, "/old-post");
    assert_eq!(internal.header("Location"), Some("https://tester.dev/posts/newer"));
}

#[test]
fn feed_is_atom_with_xml_content_type() {
    let tmp = project();
    dated(tmp.path(), "hello", "2024-03-02");
    let site = Site::load(tmp.path(), false).unwrap();
    let reply = get(&site, "/feed.xml");

    assert_eq!(reply.header("Content-Type"), Some("text/xml; charset=utf-8"));
    assert!(reply.body.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
    assert!(reply.body.contains("<id>https://tester.dev/posts/hello</id>"));
    assert!(tmp.path().join("public/feed.xml").is_file());
}

#[test]
fn query_and_index_suffix_are_ignored() {
    let tmp = project();
    dated(tmp.path(), "hello", "2024-01-01");
    let site = Site::load(tmp.path(), true).unwrap();

    let plain = get(&site, "/posts/hello");
    assert_eq!(get(&site, "/posts/hello?ref=feed").body, plain.body);
    assert_eq!(get(&site, "/posts/hello/index.html").body, plain.body);
}

#[test]
fn base_url_override_changes_links() {
    let tmp = project();
    dated(tmp.path(), "hello", "2024-01-01");
    let site = Site::load(tmp.path(), false)
        .unwrap()
        .with_base_url("https://staging.tester.dev");
    let body = get(&site, "/posts/hello").body;
    assert!(body.contains(r#"<link rel="canonical" href="https://staging.tester.dev/posts/hello">"#));
}
