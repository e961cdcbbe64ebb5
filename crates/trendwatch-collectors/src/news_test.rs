use chrono::{Duration, TimeZone, Utc};
use trendwatch_core::Source;

use super::*;

fn rss_item(title: &str, link: &str, published: DateTime<Utc>) -> String {
    format!(
        "<item><title>{title}</title><link>{link}</link>\
         <pubDate>{}</pubDate>\
         <description>&lt;a href=\"{link}\"&gt;{title}&lt;/a&gt;&amp;nbsp;&lt;font&gt;연합뉴스&lt;/font&gt;</description>\
         </item>",
        published.to_rfc2822()
    )
}

fn rss_feed(items: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Google News</title>\
         <link>https://news.google.com</link><description>search</description>{}\
         </channel></rss>",
        items.concat()
    )
}

fn source(name: &str, url: &str) -> Source {
    Source {
        id: 1,
        name: name.to_string(),
        source_type: "news".to_string(),
        url: url.to_string(),
        notes: None,
        active: true,
        created_at: Utc::now(),
    }
}

#[test]
fn google_rss_keeps_only_entries_inside_the_window() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let xml = rss_feed(&[
        rss_item("폴드 출시 임박", "https://news.example.com/1", now - Duration::minutes(30)),
        rss_item("지난주 소식", "https://news.example.com/2", now - Duration::hours(5)),
        rss_item("경계 기사", "https://news.example.com/3", now - Duration::hours(2)),
    ]);

    let entries = parse_google_news_rss(&xml, now).expect("feed should parse");

    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["폴드 출시 임박", "경계 기사"]);
    assert_eq!(entries[0].url, "https://news.example.com/1");
    assert_eq!(
        entries[0].published_at,
        Some(now - Duration::minutes(30))
    );
    assert!(
        entries[0].content.contains("연합뉴스"),
        "description markup is stripped: {}",
        entries[0].content
    );
}

#[test]
fn google_rss_considers_only_the_first_ten_entries() {
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let items: Vec<String> = (0..12)
        .map(|i| {
            rss_item(
                &format!("기사 {i}"),
                &format!("https://news.example.com/{i}"),
                now - Duration::minutes(5),
            )
        })
        .collect();

    let entries = parse_google_news_rss(&rss_feed(&items), now).expect("feed should parse");
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[9].title, "기사 9");
}

#[test]
fn google_rss_rejects_non_feed_body() {
    let now = Utc::now();
    assert!(parse_google_news_rss("<html><body>captcha</body></html>", now).is_err());
}

const NAVER_FIXTURE: &str = r#"
<html><body>
<ul class="list_news">
  <li><div class="news_area">
    <a class="news_tit" href="https://n.news.naver.com/article/001/1" title="삼성전자 실적">삼성전자 <mark>실적</mark> 발표</a>
    <div class="news_dsc"><div class="dsc_wrap">3분기 영업이익이 크게 늘었다.</div></div>
  </div></li>
  <li><div class="news_area">
    <a class="news_tit">링크 없는 기사</a>
  </div></li>
  <li><div class="news_area">
    <a class="news_tit" href="https://n.news.naver.com/article/002/2">반도체 전망</a>
  </div></li>
</ul>
</body></html>
"#;

#[test]
fn naver_results_extract_title_link_and_snippet() {
    let entries = parse_naver_news(NAVER_FIXTURE);

    assert_eq!(entries.len(), 2, "entry without href is skipped");
    assert_eq!(entries[0].title, "삼성전자 실적 발표");
    assert_eq!(entries[0].url, "https://n.news.naver.com/article/001/1");
    assert_eq!(entries[0].content, "3분기 영업이익이 크게 늘었다.");
    assert!(entries[0].published_at.is_none());
    assert_eq!(entries[1].content, "");
}

#[test]
fn news_site_resolves_by_name_then_host() {
    assert_eq!(
        NewsSite::resolve(&source("구글 뉴스", "https://example.com")),
        Some(NewsSite::GoogleNews)
    );
    assert_eq!(
        NewsSite::resolve(&source("Naver News", "")),
        Some(NewsSite::NaverNews)
    );
    assert_eq!(
        NewsSite::resolve(&source("포털 뉴스", "https://news.naver.com/main")),
        Some(NewsSite::NaverNews)
    );
    assert_eq!(
        NewsSite::resolve(&source("다음 뉴스", "https://news.daum.net")),
        None
    );
}
