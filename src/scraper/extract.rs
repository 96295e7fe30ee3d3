//! Book listing and chapter page extraction from rendered HTML.

use super::{parse_selector, ScraperError, SiteProfile};
use crate::fetch::RenderedPage;
use crate::model::{BookInfo, ChapterEntry};
use scraper::{ElementRef, Html};
use url::Url;

/// Extract title, author, and the chapter listing from a rendered book page.
///
/// A page without the title marker is not a book listing at all and yields
/// [ScraperError::NotABookPage]; nothing is returned half-filled.
pub fn extract_book_info(page: &RenderedPage, profile: &SiteProfile) -> Result<BookInfo, ScraperError> {
    let doc = page.document();

    let title_sel = parse_selector(&profile.book_title)?;
    let authors_sel = parse_selector(&profile.book_authors)?;
    let list_sel = parse_selector(&profile.chapter_list)?;
    let rows_sel = parse_selector(&profile.chapter_rows)?;
    let link_sel = parse_selector(&profile.row_link)?;

    let title = doc
        .select(&title_sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ScraperError::NotABookPage {
            url: page.url.clone(),
        })?;
    let author = doc
        .select(&authors_sel)
        .next()
        .map(element_text)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ScraperError::MissingAuthor {
            url: page.url.clone(),
        })?;
    if doc.select(&list_sel).next().is_none() {
        return Err(ScraperError::ChapterListMissing {
            url: page.url.clone(),
        });
    }

    let base = Url::parse(&page.url).map_err(|e| ScraperError::InvalidUrl {
        input: page.url.clone(),
        reason: e.to_string(),
    })?;

    let chapters = doc
        .select(&rows_sel)
        .map(|row| {
            let link = row
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href").map(|href| (a, href)));
            match link {
                Some((a, href)) => match base.join(href.trim()) {
                    Ok(resolved) => ChapterEntry::linked(element_text(a), resolved.to_string()),
                    Err(e) => {
                        tracing::warn!(href, error = %e, "unresolvable chapter link, treating row as unavailable");
                        ChapterEntry::unlinked(unlinked_label(&row.text().collect::<String>()))
                    }
                },
                None => ChapterEntry::unlinked(unlinked_label(&row.text().collect::<String>())),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        title = %title,
        author = %author,
        chapters = chapters.len(),
        "extracted book listing"
    );
    Ok(BookInfo {
        title,
        author,
        chapters,
    })
}

/// Inner markup of the content region, or `None` if the page has no such region.
pub fn extract_chapter_content(html: &str, profile: &SiteProfile) -> Result<Option<String>, ScraperError> {
    let doc = Html::parse_document(html);
    let region_sel = parse_selector(&profile.content_region)?;
    Ok(doc.select(&region_sel).next().map(|e| e.inner_html()))
}

/// Visible text with whitespace runs collapsed, like a rendered element's text.
fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Label of a row without a link: newlines dropped, trimmed, runs of two or more
/// whitespace characters replaced by one space. A lone tab or space is kept as is.
fn unlinked_label(text: &str) -> String {
    let stripped: String = text.chars().filter(|&c| c != '\n').collect();
    let mut out = String::with_capacity(stripped.len());
    let mut run = String::new();
    for c in stripped.trim().chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        if run.chars().count() >= 2 {
            out.push(' ');
        } else {
            out.push_str(&run);
        }
        run.clear();
        out.push(c);
    }
    out
}
