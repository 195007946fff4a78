//! PDF encoding of a [`ReportLayout`] using the standard Helvetica fonts.
//!
//! # Invariants
//! - All text is encoded with WinAnsi; any unencodable string aborts with
//!   `RenderError::Unencodable` so the caller can fall back to ASCII.
//! - Output bytes depend only on the layout and `generated_at`.

use super::layout::{EntryStyle, ReportLayout};
use super::RenderError;
use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1252;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const BODY_SIZE: i64 = 10;
const HEADING_SIZE: i64 = 12;
const TITLE_SIZE: i64 = 16;
const META_SIZE: i64 = 8;
/// Approximate Helvetica capacity of one body line inside the margins.
const WRAP_CHARS: usize = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static [u8] {
        match self {
            Self::Regular => b"F1",
            Self::Bold => b"F2",
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    font: Font,
    size: i64,
    bytes: Vec<u8>,
    /// Extra space above this line.
    gap_before: i64,
}

/// Renders the layout; fails with `Unencodable` on the first non-WinAnsi text.
pub(crate) fn render_pdf(
    layout: &ReportLayout,
    generated_at: NaiveDateTime,
) -> Result<(Vec<u8>, usize), RenderError> {
    let lines = layout_lines(layout, generated_at)?;
    let pages = paginate(lines);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in &pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(page)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages.len() as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info_dictionary(&mut doc, layout, generated_at)?;
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok((bytes, pages.len()))
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn info_dictionary(
    doc: &mut Document,
    layout: &ReportLayout,
    generated_at: NaiveDateTime,
) -> Result<ObjectId, RenderError> {
    let stamp = generated_at.format("D:%Y%m%d%H%M%S").to_string();
    Ok(doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode("Title", &layout.title)?),
        "Author" => Object::string_literal(encode("Author", &layout.author)?),
        "Creator" => Object::string_literal("portfolio_core"),
        "CreationDate" => Object::string_literal(stamp),
    }))
}

fn encode(label: &'static str, text: &str) -> Result<Vec<u8>, RenderError> {
    let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
    if had_errors {
        return Err(RenderError::Unencodable { label });
    }
    Ok(bytes.into_owned())
}

fn layout_lines(
    layout: &ReportLayout,
    generated_at: NaiveDateTime,
) -> Result<Vec<Line>, RenderError> {
    let mut lines = vec![Line {
        font: Font::Bold,
        size: TITLE_SIZE,
        bytes: encode("Title", &layout.title)?,
        gap_before: 0,
    }];
    lines.push(Line {
        font: Font::Regular,
        size: META_SIZE,
        bytes: encode(
            "Generated",
            &format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M")),
        )?,
        gap_before: 2,
    });

    for (index, entry) in layout.entries.iter().enumerate() {
        match entry.style {
            EntryStyle::Inline => {
                let text = format!("{}: {}", entry.label, entry.text);
                for (row, chunk) in wrap_text(&text, WRAP_CHARS).into_iter().enumerate() {
                    lines.push(Line {
                        font: Font::Regular,
                        size: BODY_SIZE,
                        bytes: encode(entry.label, &chunk)?,
                        gap_before: if index == 0 && row == 0 { 14 } else { 0 },
                    });
                }
            }
            EntryStyle::Block => {
                lines.push(Line {
                    font: Font::Bold,
                    size: HEADING_SIZE,
                    bytes: encode(entry.label, entry.label)?,
                    gap_before: 12,
                });
                for chunk in wrap_text(&entry.text, WRAP_CHARS) {
                    lines.push(Line {
                        font: Font::Regular,
                        size: BODY_SIZE,
                        bytes: encode(entry.label, &chunk)?,
                        gap_before: 0,
                    });
                }
            }
        }
    }
    Ok(lines)
}

/// Splits text into lines of at most `width` characters, breaking on spaces
/// where possible. Existing newlines always break.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                out.push(word.drain(..width).collect());
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        out.push(current);
    }
    out
}

fn paginate(lines: Vec<Line>) -> Vec<Vec<(Line, i64)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![Vec::new()];
    let mut y = top;
    for line in lines {
        let advance = line.size + 4 + line.gap_before;
        if y - advance < MARGIN {
            pages.push(Vec::new());
            y = top;
        }
        y -= advance;
        if let Some(page) = pages.last_mut() {
            page.push((line, y));
        }
    }
    pages
}

fn page_content(lines: &[(Line, i64)]) -> Result<Vec<u8>, RenderError> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for (line, y) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(line.font.resource().to_vec()),
                Object::Integer(line.size),
            ],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Integer(MARGIN), Object::Integer(*y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.bytes.clone())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Ok(Content { operations }.encode()?)
}
