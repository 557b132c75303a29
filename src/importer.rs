use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use scraper::{ElementRef, Html, Selector};
use uuid::Uuid;

use crate::convert::MarkdownConverter;
use crate::error::EntryError;
use crate::utils::{parse_header_date, title_from_filename};

/// One journal entry, fully extracted and ready to write.
///
/// Created fresh per source document and handed to the exporter; it has
/// no life beyond a single conversion pass.
#[derive(Debug)]
pub struct JournalEntry {
    /// Calendar date from the page header, pinned to noon UTC.
    pub created_at: DateTime<Utc>,
    /// May be empty when the document has no title element and the file
    /// name fallback doesn't apply.
    pub title: String,
    /// Assembled body, with a leading `# <title>` heading when titled.
    pub markdown: String,
    /// Canonical source asset path → unique name under the output
    /// `media/` directory. One key per distinct asset; values carry a
    /// UUID prefix so nothing collides in the shared media folder.
    pub media: BTreeMap<PathBuf, String>,
}

static HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pageHeader").expect("valid selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.title span.s2").expect("valid selector"));
static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pageContainer").expect("valid selector"));
static GRID_IMG_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.gridItem.assetType_photo img.asset_image").expect("valid selector")
});

/// What to do with one top-level child of the page container.
/// Classification happens once per node; each kind has its own handler,
/// and encounter order is preserved throughout.
enum NodeKind<'a> {
    /// Header and title elements, already consumed separately.
    Skip,
    /// A block of one or more embedded photos.
    AssetGrid(ElementRef<'a>),
    /// Anything else: converted wholesale, outer markup included.
    Fragment(ElementRef<'a>),
}

fn classify(el: ElementRef<'_>) -> NodeKind<'_> {
    let has_class = |name: &str| el.value().classes().any(|c| c == name);
    if has_class("pageHeader") || has_class("title") {
        NodeKind::Skip
    } else if has_class("assetGrid") {
        NodeKind::AssetGrid(el)
    } else {
        NodeKind::Fragment(el)
    }
}

/// Parse one entry document into a [`JournalEntry`].
///
/// A missing or unparseable date header voids the whole entry, as does
/// a document that yields neither Markdown text nor media. Everything
/// else (missing image files, fragments the converter rejects) degrades
/// gracefully with a diagnostic on `pb`.
pub fn extract_entry(
    doc_path: &Path,
    converter: &MarkdownConverter,
    pb: &ProgressBar,
) -> Result<JournalEntry, EntryError> {
    let html = fs::read_to_string(doc_path)?;
    let doc = Html::parse_document(&html);

    let header = doc
        .select(&HEADER_SEL)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let header = header.trim();
    if header.is_empty() {
        return Err(EntryError::MissingDate(doc_path.to_path_buf()));
    }
    let created_at = parse_header_date(header)?;

    let title = match doc.select(&TITLE_SEL).next() {
        Some(el) => element_text(el).trim().to_string(),
        None => title_from_filename(doc_path).unwrap_or_default(),
    };

    let mut media = BTreeMap::new();
    let body = match doc.select(&CONTAINER_SEL).next() {
        Some(container) => assemble_body(container, doc_path, converter, &mut media, pb),
        None => String::new(),
    };

    let markdown = if title.is_empty() {
        body
    } else {
        format!("# {title}\n\n{body}")
    };

    if markdown.is_empty() && media.is_empty() {
        return Err(EntryError::EmptyEntry);
    }

    Ok(JournalEntry {
        created_at,
        title,
        markdown,
        media,
    })
}

/// Walk the container's direct children in document order, producing
/// one Markdown fragment per node, blank-line separated.
fn assemble_body(
    container: ElementRef<'_>,
    doc_path: &Path,
    converter: &MarkdownConverter,
    media: &mut BTreeMap<PathBuf, String>,
    pb: &ProgressBar,
) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for child in container.children().filter_map(ElementRef::wrap) {
        match classify(child) {
            NodeKind::Skip => {}
            NodeKind::AssetGrid(grid) => {
                for img in grid.select(&GRID_IMG_SEL) {
                    let Some(src) = img.value().attr("src") else {
                        continue;
                    };
                    let Some(abs) = resolve_asset(doc_path, src) else {
                        pb.println(format!(
                            "Warning: image not found: {} (referenced in {})",
                            src,
                            doc_path.display()
                        ));
                        continue;
                    };
                    let base = abs
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "asset".to_string());
                    // Repeat references to the same file reuse the name
                    // assigned on first sight.
                    let new_name = media
                        .entry(abs)
                        .or_insert_with(|| format!("{}-{}", Uuid::new_v4(), base))
                        .clone();
                    fragments.push(format!("![](media/{new_name})"));
                }
            }
            NodeKind::Fragment(el) => match converter.convert_fragment(&el.html()) {
                Ok(md) => {
                    let md = md.trim();
                    if !md.is_empty() {
                        fragments.push(md.to_string());
                    }
                }
                Err(e) => pb.println(format!(
                    "Warning: skipping a section in {}: {}",
                    doc_path.display(),
                    e
                )),
            },
        }
    }

    fragments.join("\n\n")
}

/// Resolve an image `src` against the entry document's directory.
/// Canonicalization doubles as the existence check: a missing file
/// yields `None`.
fn resolve_asset(doc_path: &Path, src: &str) -> Option<PathBuf> {
    let dir = doc_path.parent()?;
    fs::canonicalize(dir.join(src)).ok()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::fs;
    use tempfile::TempDir;

    fn write_entry_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let html = format!("<html><body><div class=\"pageContainer\">{body}</div></body></html>");
        fs::write(&path, html).unwrap();
        path
    }

    fn extract(path: &Path) -> Result<JournalEntry, EntryError> {
        let converter = MarkdownConverter::new();
        extract_entry(path, &converter, &ProgressBar::hidden())
    }

    const HEADER: &str = "<div class=\"pageHeader\">Tuesday, December 12, 2023</div>";
    const TITLE: &str = "<div class=\"title\"><span class=\"s2\">Morning Walk</span></div>";

    fn grid(src: &str) -> String {
        format!(
            "<div class=\"assetGrid\"><div class=\"gridItem assetType_photo\">\
             <img class=\"asset_image\" src=\"{src}\"></div></div>"
        )
    }

    #[test]
    fn extracts_date_title_and_paragraph() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(
            &dir,
            "entry.html",
            &format!("{HEADER}{TITLE}<p>A crisp morning.</p>"),
        );

        let entry = extract(&path).unwrap();
        assert_eq!(
            (
                entry.created_at.year(),
                entry.created_at.month(),
                entry.created_at.day()
            ),
            (2023, 12, 12)
        );
        assert_eq!(entry.title, "Morning Walk");
        assert!(entry.markdown.starts_with("# Morning Walk\n\n"));
        assert!(entry.markdown.contains("A crisp morning."));
        assert!(entry.media.is_empty());
    }

    #[test]
    fn missing_header_voids_the_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(&dir, "entry.html", "<p>text but no header</p>");
        assert!(matches!(
            extract(&path).unwrap_err(),
            EntryError::MissingDate(_)
        ));
    }

    #[test]
    fn unparseable_header_voids_the_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(
            &dir,
            "entry.html",
            "<div class=\"pageHeader\">gibberish</div><p>text</p>",
        );
        assert!(matches!(
            extract(&path).unwrap_err(),
            EntryError::DateParse { .. }
        ));
    }

    #[test]
    fn empty_document_voids_the_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(&dir, "entry.html", HEADER);
        assert!(matches!(extract(&path).unwrap_err(), EntryError::EmptyEntry));
    }

    #[test]
    fn untitled_entry_falls_back_to_file_name() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(
            &dir,
            "AB12-CD34_Quiet_Evening.html",
            &format!("{HEADER}<p>text</p>"),
        );
        let entry = extract(&path).unwrap();
        assert_eq!(entry.title, "Quiet Evening");
    }

    #[test]
    fn unrecognizable_file_name_leaves_title_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_entry_doc(&dir, "entry.html", &format!("{HEADER}<p>text</p>"));
        let entry = extract(&path).unwrap();
        assert_eq!(entry.title, "");
        assert!(!entry.markdown.starts_with("# "));
    }

    #[test]
    fn preserves_interleaved_node_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpegdata").unwrap();
        fs::write(dir.path().join("b.jpg"), b"jpegdata").unwrap();
        let body = format!(
            "{HEADER}{TITLE}<p>first</p>{}<p>second</p>{}<p>third</p>",
            grid("a.jpg"),
            grid("b.jpg")
        );
        let path = write_entry_doc(&dir, "entry.html", &body);

        let entry = extract(&path).unwrap();
        let md = &entry.markdown;
        let pos = |needle: &str| md.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("first") < pos("-a.jpg"));
        assert!(pos("-a.jpg") < pos("second"));
        assert!(pos("second") < pos("-b.jpg"));
        assert!(pos("-b.jpg") < pos("third"));
        assert_eq!(entry.media.len(), 2);
    }

    #[test]
    fn missing_image_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let body = format!("{HEADER}<p>kept text</p>{}", grid("nope.jpg"));
        let path = write_entry_doc(&dir, "entry.html", &body);

        let entry = extract(&path).unwrap();
        assert!(entry.markdown.contains("kept text"));
        assert!(!entry.markdown.contains("media/"));
        assert!(entry.media.is_empty());
    }

    #[test]
    fn media_names_are_unique_even_for_identical_base_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("x")).unwrap();
        fs::create_dir(dir.path().join("y")).unwrap();
        fs::write(dir.path().join("x/photo.jpg"), b"one").unwrap();
        fs::write(dir.path().join("y/photo.jpg"), b"two").unwrap();
        let body = format!("{HEADER}{}{}", grid("x/photo.jpg"), grid("y/photo.jpg"));
        let path = write_entry_doc(&dir, "entry.html", &body);

        let entry = extract(&path).unwrap();
        assert_eq!(entry.media.len(), 2);
        let names: Vec<&String> = entry.media.values().collect();
        assert_ne!(names[0], names[1]);
        assert!(names.iter().all(|n| n.ends_with("-photo.jpg")));
    }

    #[test]
    fn repeated_reference_to_one_asset_reuses_its_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"jpegdata").unwrap();
        let body = format!("{HEADER}{}{}", grid("photo.jpg"), grid("photo.jpg"));
        let path = write_entry_doc(&dir, "entry.html", &body);

        let entry = extract(&path).unwrap();
        assert_eq!(entry.media.len(), 1);
        let name = entry.media.values().next().unwrap();
        assert_eq!(entry.markdown.matches(name.as_str()).count(), 2);
    }

    #[test]
    fn image_only_entry_is_valid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"jpegdata").unwrap();
        let path = write_entry_doc(&dir, "entry.html", &format!("{HEADER}{}", grid("photo.jpg")));

        let entry = extract(&path).unwrap();
        assert_eq!(entry.media.len(), 1);
        assert!(entry.markdown.starts_with("![](media/"));
    }
}
