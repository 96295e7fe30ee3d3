//! Sequential chapter crawl.

use super::{extract_chapter_content, ScraperError, SiteProfile};
use crate::fetch::PageFetcher;
use crate::model::{BookInfo, Chapter, CrawledBook};
use std::time::Duration;

/// Options for a crawl run.
pub struct CrawlOptions<'a> {
    /// Upper bound on waiting for a chapter's content region to render.
    pub content_timeout: Duration,
    /// Called before each fetch with (chapters fetched so far + 1, chapters to fetch).
    pub progress: Option<&'a dyn Fn(u32, u32)>,
}

/// Fetch every linked chapter, one at a time, in listing order.
///
/// Unlinked chapters are kept in place with no content. The first failing
/// chapter aborts the crawl: nothing fetched so far is returned.
pub fn crawl_book<F>(
    fetcher: &mut F,
    profile: &SiteProfile,
    info: BookInfo,
    options: &CrawlOptions<'_>,
) -> Result<CrawledBook, ScraperError>
where
    F: PageFetcher + ?Sized,
{
    let total = info.chapters.iter().filter(|c| c.is_available()).count() as u32;
    let mut done = 0u32;
    let mut chapters = Vec::with_capacity(info.chapters.len());

    for (i, entry) in info.chapters.into_iter().enumerate() {
        let index = i + 1;
        let Some(link) = entry.link else {
            tracing::debug!(index, label = %entry.label, "chapter has no link, skipped");
            chapters.push(Chapter {
                label: entry.label,
                link: None,
                content: None,
            });
            continue;
        };

        done += 1;
        if let Some(progress) = options.progress {
            progress(done, total);
        }
        tracing::debug!(index, label = %entry.label, url = %link, "open chapter");

        let fetch_err = |source| ScraperError::ChapterFetch {
            index,
            label: entry.label.clone(),
            url: link.clone(),
            source,
        };
        fetcher.navigate(&link).map_err(fetch_err)?;
        let page = fetcher
            .wait_for(&profile.content_ready, options.content_timeout)
            .map_err(fetch_err)?;

        let content = extract_chapter_content(&page.html, profile)?.ok_or_else(|| {
            ScraperError::ChapterContentMissing {
                index,
                label: entry.label.clone(),
                url: link.clone(),
            }
        })?;

        chapters.push(Chapter {
            label: entry.label,
            link: Some(link),
            content: Some(content),
        });
    }

    Ok(CrawledBook {
        title: info.title,
        author: info.author,
        chapters,
    })
}
