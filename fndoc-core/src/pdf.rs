//! Block layout onto paginated A4 PDF pages with `printpdf` built-in fonts.
//!
//! Callers describe a document as a flat list of [`Block`]s; this module
//! wraps text, starts new pages when the cursor reaches the bottom margin and
//! stamps a page number in the footer. Only the 14 built-in PDF fonts are
//! used, so no font files need to be shipped.

use std::path::Path;

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, TextItem,
};
use thiserror::Error;
use tracing::{debug, error, info};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
/// One inch.
const MARGIN_PT: f32 = 72.0;
const FOOTER_Y_PT: f32 = 36.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("nothing to render")]
    EmptyInput,
}

/// A unit of layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Large centred document title.
    Title(String),
    Heading(String),
    Subheading(String),
    /// Wrapped body text; single newlines are kept as line breaks.
    Body(String),
    /// Monospaced text, lines are wrapped but never reflowed.
    Code(String),
    /// Two-column rows; the first row is set in bold.
    Table(Vec<(String, String)>),
    /// Vertical space in points, applied even at the top of a page.
    Spacer(f32),
    PageBreak,
}

#[derive(Clone, Copy)]
struct TextStyle {
    font: BuiltinFont,
    size: f32,
    /// Average glyph width as a fraction of the font size.
    glyph_width: f32,
    space_before: f32,
    space_after: f32,
}

impl TextStyle {
    fn line_height(&self) -> f32 {
        self.size * 1.3
    }

    fn chars_per_line(&self, width_pt: f32) -> usize {
        ((width_pt / (self.size * self.glyph_width)).floor() as usize).max(1)
    }
}

const TITLE: TextStyle = TextStyle {
    font: BuiltinFont::HelveticaBold,
    size: 24.0,
    glyph_width: 0.56,
    space_before: 0.0,
    space_after: 30.0,
};
const HEADING: TextStyle = TextStyle {
    font: BuiltinFont::HelveticaBold,
    size: 18.0,
    glyph_width: 0.56,
    space_before: 20.0,
    space_after: 12.0,
};
const SUBHEADING: TextStyle = TextStyle {
    font: BuiltinFont::HelveticaBold,
    size: 14.0,
    glyph_width: 0.56,
    space_before: 15.0,
    space_after: 8.0,
};
const BODY: TextStyle = TextStyle {
    font: BuiltinFont::Helvetica,
    size: 10.0,
    glyph_width: 0.5,
    space_before: 0.0,
    space_after: 6.0,
};
const CODE: TextStyle = TextStyle {
    font: BuiltinFont::Courier,
    size: 9.0,
    glyph_width: 0.6,
    space_before: 0.0,
    space_after: 6.0,
};
const TABLE_HEAD: TextStyle = TextStyle {
    font: BuiltinFont::HelveticaBold,
    ..BODY
};

/// Accumulates drawing operations page by page.
struct PageComposer {
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    /// Baseline of the next line, measured from the bottom edge.
    cursor_y: f32,
    page_height: f32,
    content_width: f32,
    page_has_content: bool,
}

impl PageComposer {
    fn new() -> Self {
        let page_height: f32 = Pt::from(Mm(PAGE_HEIGHT_MM)).0;
        let page_width: f32 = Pt::from(Mm(PAGE_WIDTH_MM)).0;
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            cursor_y: page_height - MARGIN_PT,
            page_height,
            content_width: page_width - 2.0 * MARGIN_PT,
            page_has_content: false,
        }
    }

    fn finish_page(&mut self) {
        let number = self.pages.len() + 1;
        let footer = format!("Page {number}");
        let x = MARGIN_PT + self.content_width - footer.len() as f32 * BODY.size * BODY.glyph_width;
        self.text_at(x, FOOTER_Y_PT, &BODY, &footer);

        let ops = std::mem::take(&mut self.ops);
        self.pages
            .push(PdfPage::new(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), ops));
        self.cursor_y = self.page_height - MARGIN_PT;
        self.page_has_content = false;
    }

    fn page_break(&mut self) {
        if self.page_has_content {
            self.finish_page();
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor_y - height < MARGIN_PT && self.page_has_content {
            self.finish_page();
        }
    }

    fn space(&mut self, points: f32) {
        if self.page_has_content {
            self.cursor_y -= points;
        }
    }

    fn text_at(&mut self, x: f32, y: f32, style: &TextStyle, text: &str) {
        self.ops.extend([
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point { x: Pt(x), y: Pt(y) },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(style.size),
                font: style.font,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(sanitize(text))],
                font: style.font,
            },
            Op::EndTextSection,
        ]);
    }

    fn line(&mut self, x: f32, style: &TextStyle, text: &str) {
        self.ensure_room(style.line_height());
        self.cursor_y -= style.size;
        self.text_at(x, self.cursor_y, style, text);
        self.cursor_y -= style.line_height() - style.size;
        self.page_has_content = true;
    }

    fn paragraph(&mut self, style: &TextStyle, text: &str, centred: bool) {
        self.space(style.space_before);
        let width = style.chars_per_line(self.content_width);
        for source_line in text.lines() {
            for wrapped in wrap(source_line, width) {
                let x = if centred {
                    let used = wrapped.chars().count() as f32 * style.size * style.glyph_width;
                    MARGIN_PT + ((self.content_width - used) / 2.0).max(0.0)
                } else {
                    MARGIN_PT
                };
                self.line(x, style, &wrapped);
            }
        }
        self.cursor_y -= style.space_after;
    }

    fn table(&mut self, rows: &[(String, String)]) {
        let label_width = self.content_width * 0.6;
        let label_chars = BODY.chars_per_line(label_width - 12.0);
        let value_chars = BODY.chars_per_line(self.content_width - label_width);
        for (index, (label, value)) in rows.iter().enumerate() {
            let style = if index == 0 { TABLE_HEAD } else { BODY };
            let labels = wrap(label, label_chars);
            let values = wrap(value, value_chars);
            let height = labels.len().max(values.len()).max(1);
            self.ensure_room(style.line_height() * height as f32);
            for i in 0..height {
                self.cursor_y -= style.size;
                if let Some(text) = labels.get(i) {
                    self.text_at(MARGIN_PT, self.cursor_y, &style, text);
                }
                if let Some(text) = values.get(i) {
                    self.text_at(MARGIN_PT + label_width, self.cursor_y, &style, text);
                }
                self.cursor_y -= style.line_height() - style.size;
            }
            self.cursor_y -= 4.0;
            self.page_has_content = true;
        }
        self.cursor_y -= BODY.space_after;
    }

    fn into_pages(mut self) -> Vec<PdfPage> {
        if self.page_has_content || self.pages.is_empty() {
            self.finish_page();
        }
        self.pages
    }
}

/// Lay out `blocks` and return the PDF bytes.
pub fn render_pdf(document_title: &str, blocks: &[Block]) -> Result<Vec<u8>, PdfError> {
    if blocks.is_empty() {
        error!("Attempted PDF generation with empty input");
        return Err(PdfError::EmptyInput);
    }

    let mut composer = PageComposer::new();
    for block in blocks {
        match block {
            Block::Title(text) => composer.paragraph(&TITLE, text, true),
            Block::Heading(text) => composer.paragraph(&HEADING, text, false),
            Block::Subheading(text) => composer.paragraph(&SUBHEADING, text, false),
            Block::Body(text) => composer.paragraph(&BODY, text, false),
            Block::Code(text) => composer.paragraph(&CODE, text, false),
            Block::Table(rows) => composer.table(rows),
            Block::Spacer(points) => composer.cursor_y -= *points,
            Block::PageBreak => composer.page_break(),
        }
    }
    let pages = composer.into_pages();
    debug!(pages = pages.len(), blocks = blocks.len(), "Laid out PDF pages");

    let mut warnings = Vec::new();
    let bytes = PdfDocument::new(document_title)
        .with_pages(pages)
        .save(&PdfSaveOptions::default(), &mut warnings);
    if !warnings.is_empty() {
        debug!(count = warnings.len(), "PDF serialisation reported warnings");
    }
    Ok(bytes)
}

/// Render `blocks` and write the PDF to `output`.
pub fn write_pdf(output: &Path, document_title: &str, blocks: &[Block]) -> Result<(), PdfError> {
    let bytes = render_pdf(document_title, blocks)?;
    crate::artifact::write_artifact(output, &bytes).map_err(|e| {
        error!(path = %output.display(), error = ?e, "Failed to write PDF");
        PdfError::Io(e)
    })?;
    info!(path = %output.display(), size = bytes.len(), "Wrote PDF");
    Ok(())
}

/// Greedy word wrap to at most `width` characters per line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() && !text.trim().is_empty() {
        lines.push(text.trim().to_string());
    }
    lines
}

/// Map text onto the Latin-1 range the built-in fonts can encode.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2022}' | '\u{25CF}' | '\u{25AA}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}
