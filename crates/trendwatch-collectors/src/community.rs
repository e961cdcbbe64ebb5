//! Community adapter: board search pages on Korean discussion sites.
//!
//! Every site has its own pure `parse_*` extractor so layouts can be checked
//! against saved pages. Relative links are resolved against the site's
//! canonical host, which is not always the host the search page is served
//! from (DCInside searches on `search.` but posts live on `gall.`).

use chrono::Utc;
use reqwest::Client;
use scraper::Html;
use trendwatch_core::{Keyword, Source};

use crate::http::{absolutize, element_text, encode_query, fetch_text};
use crate::outcome::{settle, AdapterOutcome, FailureReason, RawEntry, MAX_ENTRIES};
use crate::selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunitySite {
    DcInside,
    Ppomppu,
    Ruliweb,
    Clien,
    Blind,
    NaverCafe,
}

impl CommunitySite {
    /// Resolve a source to a site by its name, falling back to its URL host.
    #[must_use]
    pub fn resolve(source: &Source) -> Option<Self> {
        let name = source.name.trim().to_lowercase();
        let by_name = match name.as_str() {
            "디시인사이드" | "디시" | "dcinside" => Some(CommunitySite::DcInside),
            "뽐뿌" | "ppomppu" => Some(CommunitySite::Ppomppu),
            "루리웹" | "ruliweb" => Some(CommunitySite::Ruliweb),
            "클리앙" | "clien" => Some(CommunitySite::Clien),
            "블라인드" | "blind" => Some(CommunitySite::Blind),
            "아사모 (네이버 카페)" | "아사모" | "네이버 카페" | "naver cafe" => {
                Some(CommunitySite::NaverCafe)
            }
            _ => None,
        };
        if by_name.is_some() {
            return by_name;
        }

        let host = url::Url::parse(&source.url).ok()?.host_str()?.to_ascii_lowercase();
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));
        if on("dcinside.com") {
            Some(CommunitySite::DcInside)
        } else if on("ppomppu.co.kr") {
            Some(CommunitySite::Ppomppu)
        } else if on("ruliweb.com") {
            Some(CommunitySite::Ruliweb)
        } else if on("clien.net") {
            Some(CommunitySite::Clien)
        } else if on("teamblind.com") {
            Some(CommunitySite::Blind)
        } else if on("cafe.naver.com") {
            Some(CommunitySite::NaverCafe)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CommunitySite::DcInside => "dcinside",
            CommunitySite::Ppomppu => "ppomppu",
            CommunitySite::Ruliweb => "ruliweb",
            CommunitySite::Clien => "clien",
            CommunitySite::Blind => "blind",
            CommunitySite::NaverCafe => "naver_cafe",
        }
    }

    /// Sites whose search results are only served to logged-in members.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, CommunitySite::Blind | CommunitySite::NaverCafe)
    }

    fn search_origin(self) -> &'static str {
        match self {
            CommunitySite::DcInside => "https://search.dcinside.com",
            CommunitySite::Ppomppu => "https://www.ppomppu.co.kr",
            CommunitySite::Ruliweb => "https://bbs.ruliweb.com",
            CommunitySite::Clien => "https://www.clien.net",
            CommunitySite::Blind => "https://www.teamblind.com",
            CommunitySite::NaverCafe => "https://cafe.naver.com",
        }
    }

    fn search_path(self, encoded: &str) -> String {
        match self {
            CommunitySite::DcInside => format!("/combine/subject?keyword={encoded}"),
            CommunitySite::Ppomppu => format!("/search_bbs.php?keyword={encoded}"),
            CommunitySite::Ruliweb => {
                format!("/community/board/300143?search_type=subject&search_key={encoded}")
            }
            CommunitySite::Clien => format!("/service/search?q={encoded}&sort=recency"),
            CommunitySite::Blind => format!("/kr/search/{encoded}"),
            CommunitySite::NaverCafe => {
                format!("/ArticleSearchList.nhn?search.searchBy=0&search.query={encoded}")
            }
        }
    }

    /// Run the site's extractor over a fetched search page.
    #[must_use]
    pub fn parse(self, html: &str) -> Vec<RawEntry> {
        match self {
            CommunitySite::DcInside => parse_dcinside(html),
            CommunitySite::Ppomppu => parse_ppomppu(html),
            CommunitySite::Ruliweb => parse_ruliweb(html),
            CommunitySite::Clien => parse_clien(html),
            CommunitySite::Blind | CommunitySite::NaverCafe => Vec::new(),
        }
    }
}

pub struct CommunityAdapter {
    client: Client,
    origin_override: Option<String>,
}

impl CommunityAdapter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            origin_override: None,
        }
    }

    /// Serve every site's search page from `origin` instead (used by tests).
    /// Link resolution still uses each site's canonical host.
    #[must_use]
    pub fn with_origin(client: Client, origin: &str) -> Self {
        Self {
            client,
            origin_override: Some(origin.trim_end_matches('/').to_string()),
        }
    }

    /// Collect board posts mentioning `keyword` from `source`.
    pub async fn collect(&self, source: &Source, keyword: &Keyword) -> AdapterOutcome {
        let Some(site) = CommunitySite::resolve(source) else {
            tracing::warn!(source = %source.name, "unknown community source");
            return AdapterOutcome::Failed(FailureReason::UnknownSubSource(source.name.clone()));
        };

        if site.requires_auth() {
            tracing::warn!(
                source = %source.name,
                site = site.label(),
                "site requires an authenticated session; skipping"
            );
            return AdapterOutcome::Failed(FailureReason::AuthenticationRequired);
        }

        let origin = self
            .origin_override
            .as_deref()
            .unwrap_or_else(|| site.search_origin());
        let url = format!("{origin}{}", site.search_path(&encode_query(&keyword.name)));

        let now = Utc::now();
        let result = fetch_text(&self.client, &url)
            .await
            .map(|body| site.parse(&body));
        settle(source, keyword, site.label(), result, now)
    }
}

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

struct Layout<'a> {
    rows: &'a str,
    title: &'a str,
    link: &'a str,
    /// Leading rows that are table headers.
    header_rows: usize,
    base: &'a str,
}

/// Walk the first [`MAX_ENTRIES`] result rows and pull title and link from
/// each. Rows missing either are skipped.
fn extract(html: &str, layout: &Layout<'_>) -> Vec<RawEntry> {
    let document = Html::parse_document(html);
    let rows = selector(layout.rows);
    let title_sel = selector(layout.title);
    let link_sel = selector(layout.link);

    document
        .select(&rows)
        .take(MAX_ENTRIES)
        .skip(layout.header_rows)
        .filter_map(|row| {
            let title = row
                .select(&title_sel)
                .map(element_text)
                .collect::<Vec<_>>()
                .join(" ");
            let href = row.select(&link_sel).next()?.value().attr("href")?;
            let url = absolutize(href, layout.base)?;
            RawEntry::new(&title, &url)
        })
        .collect()
}

#[must_use]
pub fn parse_dcinside(html: &str) -> Vec<RawEntry> {
    extract(
        html,
        &Layout {
            rows: ".sch_result_list li",
            title: ".tit a",
            link: ".tit a",
            header_rows: 0,
            base: "https://gall.dcinside.com",
        },
    )
}

#[must_use]
pub fn parse_ppomppu(html: &str) -> Vec<RawEntry> {
    extract(
        html,
        &Layout {
            rows: "table.board_table tr",
            title: "td.title a",
            link: "td.title a",
            header_rows: 1,
            base: "https://www.ppomppu.co.kr/",
        },
    )
}

#[must_use]
pub fn parse_ruliweb(html: &str) -> Vec<RawEntry> {
    extract(
        html,
        &Layout {
            rows: ".board_list_wrapper table tr",
            title: ".subject a",
            link: ".subject a",
            header_rows: 0,
            base: "https://bbs.ruliweb.com",
        },
    )
}

#[must_use]
pub fn parse_clien(html: &str) -> Vec<RawEntry> {
    extract(
        html,
        &Layout {
            rows: ".list_item",
            title: ".list_subject span",
            link: ".list_subject",
            header_rows: 0,
            base: "https://www.clien.net",
        },
    )
}

#[cfg(test)]
#[path = "community_test.rs"]
mod tests;
