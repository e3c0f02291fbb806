use crate::error::ProcessingError;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 11;
const TITLE_FONT_SIZE: i64 = 16;
const LEADING: i64 = 14;
/// Courier advances 0.6 em per glyph
const CHARS_PER_LINE: usize = ((PAGE_WIDTH - 2 * MARGIN) * 10 / (FONT_SIZE * 6)) as usize;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;
const TAB_WIDTH: usize = 4;

/// Lays plain text out on A4 pages in a monospaced font
pub struct TextPdfWriter;

impl TextPdfWriter {
    pub fn render(title: Option<&str>, text: &str) -> Result<Bytes, ProcessingError> {
        if text.trim().is_empty() {
            return Err(ProcessingError::InvalidParameters(
                "Text must not be empty".to_string(),
            ));
        }

        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let lines = wrap_text(text, CHARS_PER_LINE);
        let pages = paginate(lines, title.is_some());

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let body_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let title_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => body_font,
                "F2" => title_font,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for (index, page_lines) in pages.iter().enumerate() {
            let page_title = if index == 0 { title } else { None };
            let page_id = add_page(&mut doc, pages_id, page_title, page_lines)?;
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let mut info = dictionary! {
            "Producer" => Object::string_literal("StudentHub"),
        };
        if let Some(title) = title {
            info.set("Title", Object::string_literal(encode_win_ansi(title)));
        }
        let info_id = doc.add_object(info);

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;

        tracing::debug!(pages = page_count, bytes = buffer.len(), "Rendered text to PDF");
        Ok(Bytes::from(buffer))
    }
}

fn add_page(
    doc: &mut Document,
    parent: ObjectId,
    title: Option<&str>,
    lines: &[String],
) -> Result<ObjectId, ProcessingError> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];

    if let Some(title) = title {
        operations.push(Operation::new("Tf", vec!["F2".into(), TITLE_FONT_SIZE.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(title))],
        ));
        operations.push(Operation::new("T*", vec![]));
        operations.push(Operation::new("T*", vec![]));
    }

    operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Word-wrap to `width` columns, hard-splitting words longer than a line
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.lines() {
        let expanded = raw.replace('\t', &" ".repeat(TAB_WIDTH));
        let mut current = String::new();
        let mut current_len = 0;

        for word in expanded.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        lines.push(current);
    }

    lines
}

fn paginate(lines: Vec<String>, has_title: bool) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut page = Vec::new();
    // The title and the blank line after it take two rows on the first page
    let mut capacity = if has_title {
        LINES_PER_PAGE - 2
    } else {
        LINES_PER_PAGE
    };

    for line in lines {
        if page.len() == capacity {
            pages.push(std::mem::take(&mut page));
            capacity = LINES_PER_PAGE;
        }
        page.push(line);
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }

    pages
}

/// Map text onto the WinAnsi code page used by the standard Type 1 fonts
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c as u8),
            '\u{a0}'..='\u{ff}' => out.push(c as u32 as u8),
            '\u{2018}' | '\u{2019}' => out.push(b'\''),
            '\u{201c}' | '\u{201d}' => out.push(b'"'),
            '\u{2013}' | '\u{2014}' => out.push(b'-'),
            '\u{2026}' => out.extend_from_slice(b"..."),
            _ => out.push(b'?'),
        }
    }
    out
}
