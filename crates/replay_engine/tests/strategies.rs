use std::time::Duration;

use pretty_assertions::assert_eq;
use replay_engine::strategy::{
    HistoricalSnapshot, LinkArchive, PlatformApi, Sitemap, StructuredArchive,
};
use replay_engine::{
    DiscoverySettings, FetchSettings, ReadabilityExtractor, ReqwestFetcher, SiteContext, Strategy,
    StrategyError,
};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(title: &str, head_extra: &str) -> String {
    format!(
        r#"<html><head><title>{title} | Test Blog</title>{head_extra}</head><body>
        <div class="entry-content">
          <h1>{title}</h1>
          <p>This opening paragraph has plenty of words, a comma or two, and real substance.</p>
          <p>The second paragraph keeps going, adding detail, nuance, and a closing thought.</p>
        </div></body></html>"#
    )
}

async fn serve_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

fn settings(server: &MockServer) -> DiscoverySettings {
    DiscoverySettings {
        snapshot_endpoint: server.uri(),
        polite_delay: Duration::ZERO,
        ..DiscoverySettings::default()
    }
}

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings::default()).unwrap()
}

#[tokio::test]
async fn structured_archive_overlays_listing_metadata() {
    replay_logging::initialize_for_tests();
    let server = MockServer::start().await;

    let blocks: String = (1..=5)
        .map(|n| {
            format!(
                r#"<article>
                  <h2 class="entry-title"><a href="/2023/post-{n}/">Post {n}</a></h2>
                  <time datetime="2023-0{n}-01">listed</time>
                  <a href="/tag/Rust">Rust</a>
                </article>"#
            )
        })
        .collect();
    serve_html(&server, "/archive", format!("<html><body>{blocks}</body></html>")).await;
    for n in 1..=5 {
        let head = if n == 1 {
            r#"<meta property="article:published_time" content="2022-12-25">"#
        } else {
            ""
        };
        serve_html(&server, &format!("/2023/post-{n}/"), article(&format!("Post {n}"), head)).await;
    }

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = StructuredArchive.evaluate(&site).await.unwrap().expect("posts");

    assert_eq!(posts.len(), 5);
    assert_eq!(posts[0].slug, "post-1");
    assert_eq!(posts[0].tags, vec!["rust"]);
    // in-page date wins over the listing
    assert_eq!(posts[0].published_at.as_deref(), Some("2022-12-25T00:00:00"));
    assert_eq!(posts[1].published_at.as_deref(), Some("2023-02-01T00:00:00"));
}

#[tokio::test]
async fn structured_archive_ignores_pages_with_few_articles() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/posts",
        "<html><body><article><h2><a href='/a'>A</a></h2></article></body></html>".into(),
    )
    .await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    assert!(StructuredArchive.evaluate(&site).await.unwrap().is_none());
}

#[tokio::test]
async fn sitemap_index_is_followed_and_filtered() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let index = format!(
        r#"<?xml version="1.0"?><sitemapindex><sitemap><loc>{uri}/post-sitemap.xml</loc></sitemap></sitemapindex>"#
    );
    let leaf = format!(
        r#"<?xml version="1.0"?><urlset>
            <url><loc>{uri}/2023/alpha</loc></url>
            <url><loc>{uri}/about</loc></url>
            <url><loc>{uri}/tag/misc</loc></url>
            <url><loc>https://elsewhere.example/2023/beta</loc></url>
        </urlset>"#
    );
    for (route, body) in [("/sitemap.xml", index), ("/post-sitemap.xml", leaf)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/xml"))
            .mount(&server)
            .await;
    }
    serve_html(&server, "/2023/alpha", article("Alpha", "")).await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&uri, &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = Sitemap.evaluate(&site).await.unwrap().expect("posts");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Alpha");
    assert_eq!(posts[0].url, format!("{uri}/2023/alpha"));
}

#[tokio::test]
async fn repeated_sitemap_locations_are_fetched_once() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let urlset = format!(
        r#"<?xml version="1.0"?><urlset>
            <url><loc>{uri}/2023/post-one</loc></url>
            <url><loc>{uri}/2023/post-two</loc></url>
            <url><loc>{uri}/2023/post-one</loc></url>
        </urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(urlset, "application/xml"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2023/post-one"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(article("Post One", ""), "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;
    serve_html(&server, "/2023/post-two", article("Post Two", "")).await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&uri, &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = Sitemap.evaluate(&site).await.unwrap().expect("posts");

    let urls: Vec<&str> = posts.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{uri}/2023/post-one"),
            format!("{uri}/2023/post-two")
        ]
    );
}

#[tokio::test]
async fn missing_sitemap_yields_nothing() {
    let server = MockServer::start().await;
    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    assert!(Sitemap.evaluate(&site).await.unwrap().is_none());
}

#[tokio::test]
async fn platform_api_follows_total_pages() {
    let server = MockServer::start().await;
    let body = "<p>".to_string() + &"Content from the API. ".repeat(10) + "</p>";
    let page_one = serde_json::json!([
        {
            "title": {"rendered": "Hello &amp; <em>World</em>"},
            "content": {"rendered": body},
            "link": "https://blog.example/hello-world",
            "date": "2023-01-15T10:30:00"
        },
        {
            "title": {"rendered": "Empty"},
            "content": {"rendered": ""},
            "link": "https://blog.example/empty",
            "slug": "empty"
        }
    ]);
    let page_two = serde_json::json!([
        {
            "title": {"rendered": "Second Page"},
            "content": {"rendered": body},
            "link": "https://blog.example/second",
            "slug": "second-page-slug"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-TotalPages", "2")
                .set_body_json(page_one),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-TotalPages", "2")
                .set_body_json(page_two),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = PlatformApi.evaluate(&site).await.unwrap().expect("posts");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Hello & World");
    assert_eq!(posts[0].slug, "hello-world");
    assert_eq!(posts[0].published_at.as_deref(), Some("2023-01-15T10:30:00"));
    assert_eq!(posts[1].slug, "second-page-slug");
    assert_eq!(posts[1].published_at, None);
}

#[tokio::test]
async fn platform_api_with_invalid_json_is_a_strategy_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>nope</html>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let err = PlatformApi.evaluate(&site).await.unwrap_err();
    assert!(matches!(err, StrategyError::Parse(_)));
}

#[tokio::test]
async fn link_archive_collects_slug_like_links() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/",
        r#"<html><body>
            <a href="/2023/first-post">First</a>
            <a href="/a-long-post-title">Second</a>
            <a href="/short">Short</a>
            <a href="/about-the-author-page">About</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    serve_html(&server, "/2023/first-post", article("First", "")).await;
    serve_html(&server, "/a-long-post-title", article("Second", "")).await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&server.uri(), &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = LinkArchive.evaluate(&site).await.unwrap().expect("posts");

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn snapshot_attributes_captures_to_original_urls() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let rows = serde_json::json!([
        ["timestamp", "original", "statuscode"],
        ["20190101000000", format!("{uri}/2019/old-post"), "200"],
        ["20200101000000", format!("{uri}/2019/old-post"), "200"],
        ["20190101000000", format!("{uri}/tag/misc"), "200"],
        ["20190101000000", "https://elsewhere.example/2019/x", "200"]
    ]);
    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/web/20190101000000/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(article("Old Post", ""), "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher();
    let settings = settings(&server);
    let site = SiteContext::new(&uri, &fetcher, &ReadabilityExtractor, &settings).unwrap();
    let posts = HistoricalSnapshot.evaluate(&site).await.unwrap().expect("posts");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Old Post");
    assert_eq!(posts[0].url, format!("{uri}/2019/old-post"));
}
