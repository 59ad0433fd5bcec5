//! Plain-text report laid out on A4 pages

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::error::{AnalyticsError, Result};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 5.5;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
/// Characters per line at `BODY_SIZE` inside the margins
const WRAP_AT: usize = 95;

/// Write `text` to `path`; the first line is set as the title.
///
/// Missing parent directories are created.
pub fn write_report(title: &str, text: &str, path: &Path) -> Result<()> {
    let failed = |reason: String| AnalyticsError::Report {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
    }

    let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| failed(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| failed(e.to_string()))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT.0 - MARGIN;

    for (i, line) in text.lines().enumerate() {
        let (font, size) = if i == 0 {
            (&bold, TITLE_SIZE)
        } else {
            (&regular, BODY_SIZE)
        };

        for chunk in wrap(line) {
            if y < MARGIN {
                let (page, next) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
                layer = doc.get_page(page).get_layer(next);
                y = PAGE_HEIGHT.0 - MARGIN;
            }
            layer.use_text(chunk, size, Mm(MARGIN), Mm(y), font);
            y -= LINE_HEIGHT;
        }
        if i == 0 {
            y -= LINE_HEIGHT;
        }
    }

    let file = File::create(path).map_err(|e| failed(e.to_string()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| failed(e.to_string()))
}

/// Split `line` into chunks of at most `WRAP_AT` characters, keeping empty lines
fn wrap(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return vec![""];
    }

    let mut chunks = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(WRAP_AT)
            .map_or(rest.len(), |(idx, _)| idx);
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks
}
