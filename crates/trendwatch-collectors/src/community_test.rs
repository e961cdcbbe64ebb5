use chrono::Utc;
use trendwatch_core::{Keyword, KeywordCategory, Source};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::build_client;

fn source(name: &str, url: &str) -> Source {
    Source {
        id: 7,
        name: name.to_string(),
        source_type: "community".to_string(),
        url: url.to_string(),
        notes: None,
        active: true,
        created_at: Utc::now(),
    }
}

fn keyword(name: &str) -> Keyword {
    Keyword {
        id: 3,
        name: name.to_string(),
        category: KeywordCategory::Product,
        description: None,
        active: true,
        created_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

#[test]
fn dcinside_resolves_relative_links_against_gallery_host() {
    let html = r#"
<ul class="sch_result_list">
  <li><a class="tit_txt"></a><p class="tit"><a href="/board/view/?id=mobile&no=100">폴드 <b>후기</b></a></p></li>
  <li><p class="tit"><a href="https://gall.dcinside.com/mgallery/board/view/?id=galaxy&no=5">폴드 액정</a></p></li>
  <li><p class="tit"><a>링크 없음</a></p></li>
</ul>"#;

    let entries = parse_dcinside(html);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "폴드 후기");
    assert_eq!(
        entries[0].url,
        "https://gall.dcinside.com/board/view/?id=mobile&no=100"
    );
    assert_eq!(
        entries[1].url,
        "https://gall.dcinside.com/mgallery/board/view/?id=galaxy&no=5"
    );
}

#[test]
fn ppomppu_skips_header_row_and_prefixes_board_path() {
    let html = r#"
<table class="board_table">
  <tr><td class="title"><a href="header.php">제목</a></td></tr>
  <tr><td class="title"><a href="zboard/view.php?id=phone&no=1">아이폰 공기계</a></td></tr>
  <tr><td class="title"><a href="zboard/view.php?id=phone&no=2">아이폰 케이스</a></td></tr>
</table>"#;

    let entries = parse_ppomppu(html);
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["아이폰 공기계", "아이폰 케이스"]);
    assert_eq!(
        entries[0].url,
        "https://www.ppomppu.co.kr/zboard/view.php?id=phone&no=1"
    );
}

#[test]
fn ruliweb_caps_at_ten_rows() {
    let rows: String = (0..15)
        .map(|i| {
            format!(
                "<tr><td class=\"subject\"><a href=\"/community/board/300143/read/{i}\">글 {i}</a></td></tr>"
            )
        })
        .collect();
    let html = format!("<div class=\"board_list_wrapper\"><table>{rows}</table></div>");

    let entries = parse_ruliweb(&html);
    assert_eq!(entries.len(), 10);
    assert_eq!(
        entries[0].url,
        "https://bbs.ruliweb.com/community/board/300143/read/0"
    );
}

#[test]
fn clien_reads_title_from_span_and_link_from_anchor() {
    let html = r#"
<div class="list_item symph_row">
  <a class="list_subject" href="/service/board/park/18000001">
    <span class="subject_fixed" title="삼성전자 주가">삼성전자 주가</span>
  </a>
</div>
<div class="list_item symph_row">
  <a class="list_subject" href="/service/board/park/18000002"></a>
</div>"#;

    let entries = parse_clien(html);
    assert_eq!(entries.len(), 1, "row without title text is skipped");
    assert_eq!(entries[0].title, "삼성전자 주가");
    assert_eq!(
        entries[0].url,
        "https://www.clien.net/service/board/park/18000001"
    );
}

#[test]
fn gated_sites_parse_to_nothing() {
    assert!(CommunitySite::Blind.parse("<div class=\"list_item\"></div>").is_empty());
    assert!(CommunitySite::NaverCafe.requires_auth());
    assert!(!CommunitySite::Clien.requires_auth());
}

#[test]
fn community_site_resolves_by_name_then_host() {
    assert_eq!(
        CommunitySite::resolve(&source("아사모 (네이버 카페)", "")),
        Some(CommunitySite::NaverCafe)
    );
    assert_eq!(
        CommunitySite::resolve(&source("Clien", "")),
        Some(CommunitySite::Clien)
    );
    assert_eq!(
        CommunitySite::resolve(&source("디시 폰갤", "https://gall.dcinside.com/board/lists?id=mobile")),
        Some(CommunitySite::DcInside)
    );
    assert_eq!(
        CommunitySite::resolve(&source("더쿠", "https://theqoo.net")),
        None
    );
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_fetches_search_page_and_tags_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/search"))
        .and(query_param("q", "아이폰"))
        .and(query_param("sort", "recency"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="list_item"><a class="list_subject" href="/service/board/cm_iphonien/1"><span>아이폰 배터리</span></a></div>"#,
        ))
        .mount(&server)
        .await;

    let client = build_client(5, "trendwatch-test/0.1").expect("client");
    let adapter = CommunityAdapter::with_origin(client, &server.uri());

    let outcome = adapter
        .collect(&source("클리앙", "https://www.clien.net"), &keyword("아이폰"))
        .await;

    let AdapterOutcome::Collected(items) = outcome else {
        panic!("expected Collected, got {outcome:?}");
    };
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].source_name, "클리앙");
    assert_eq!(items[0].source_type, "community");
    assert_eq!(items[0].keyword_name, "아이폰");
    assert_eq!(items[0].keyword_id, 3);
    assert_eq!(
        items[0].url,
        "https://www.clien.net/service/board/cm_iphonien/1"
    );
}

#[tokio::test]
async fn collect_reports_http_errors_as_fetch_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = build_client(5, "trendwatch-test/0.1").expect("client");
    let adapter = CommunityAdapter::with_origin(client, &server.uri());

    let outcome = adapter
        .collect(&source("뽐뿌", ""), &keyword("아이폰"))
        .await;
    assert!(matches!(
        outcome,
        AdapterOutcome::Failed(FailureReason::Fetch(_))
    ));
}

#[tokio::test]
async fn collect_skips_gated_and_unknown_sites_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = build_client(5, "trendwatch-test/0.1").expect("client");
    let adapter = CommunityAdapter::with_origin(client, &server.uri());

    let gated = adapter
        .collect(&source("블라인드", ""), &keyword("삼성전자"))
        .await;
    assert_eq!(
        gated,
        AdapterOutcome::Failed(FailureReason::AuthenticationRequired)
    );

    let unknown = adapter
        .collect(&source("더쿠", "https://theqoo.net"), &keyword("삼성전자"))
        .await;
    assert_eq!(
        unknown,
        AdapterOutcome::Failed(FailureReason::UnknownSubSource("더쿠".to_string()))
    );
}
