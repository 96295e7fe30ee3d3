//! Single-document assembly: all chapters, in listing order, one `<section>` each.

use crate::model::CrawledBook;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of the assembled document.
pub const DOCUMENT_EXTENSION: &str = "html";

const HEADER: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
  <head>
    <meta charset="utf-8">
    <style type="text/css">
      h1{page-break-before: always;}
    </style>
  </head>
  <body>
"#;

const FOOTER: &str = "  </body>\n</html>\n";

/// Errors from assembling or writing the document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Cannot save book: title is empty.")]
    EmptyTitle,

    #[error("Cannot save book: author is empty.")]
    EmptyAuthor,

    #[error("Cannot save book to {}: directory does not exist.", .path.display())]
    MissingDirectory { path: PathBuf },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Assembled book, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// `"{author} - {title}"` with colons replaced.
    pub file_stem: String,
    pub html: String,
}

impl Document {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, DOCUMENT_EXTENSION)
    }

    /// File name of the same book in another format (e.g. after conversion).
    pub fn file_name_with_extension(&self, ext: &str) -> String {
        format!("{}.{}", self.file_stem, ext.trim_start_matches('.'))
    }
}

/// Replace every `:` with `" -"`. Nothing else is touched.
pub fn sanitize_name(s: &str) -> String {
    s.replace(':', " -")
}

/// Output file stem for a book: `"{sanitized author} - {sanitized title}"`.
pub fn file_stem(author: &str, title: &str) -> String {
    format!("{} - {}", sanitize_name(author), sanitize_name(title))
}

fn validate_book(book: &CrawledBook) -> Result<(), DocumentError> {
    if book.title.trim().is_empty() {
        return Err(DocumentError::EmptyTitle);
    }
    if book.author.trim().is_empty() {
        return Err(DocumentError::EmptyAuthor);
    }
    Ok(())
}

/// Build the document. Chapters without content become empty sections, keeping their position.
pub fn assemble(book: &CrawledBook) -> Result<Document, DocumentError> {
    validate_book(book)?;

    let mut html = String::from(HEADER);
    for chapter in &book.chapters {
        html.push_str("    <section>");
        html.push_str(chapter.content.as_deref().unwrap_or_default());
        html.push_str("</section>\n");
    }
    html.push_str(FOOTER);

    Ok(Document {
        file_stem: file_stem(&book.author, &book.title),
        html,
    })
}

/// Write the document into `dir` and return the full path. Failures are reported, not retried.
pub fn write_document(document: &Document, dir: &Path) -> Result<PathBuf, DocumentError> {
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(DocumentError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }
    let path = dir.join(document.file_name());
    let io_err = |source| DocumentError::Io {
        path: path.clone(),
        source,
    };
    let mut f = File::create(&path).map_err(io_err)?;
    f.write_all(document.html.as_bytes()).map_err(io_err)?;
    f.flush().map_err(io_err)?;
    tracing::info!(path = %path.display(), "saved book");
    Ok(path)
}
