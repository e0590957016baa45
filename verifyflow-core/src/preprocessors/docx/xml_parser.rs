//! WordprocessingML parser
//!
//! Walks `word/document.xml` once with quick-xml and collects what the
//! checker needs: body paragraphs with their runs, top-level tables, and the
//! first section's page margins. Text boxes are skipped, and paragraphs inside
//! tables only feed their cell text.

use crate::error::ExtractionError;
use crate::types::Table;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunData {
    pub text: String,
    pub font_name: Option<String>,
    pub size_pt: Option<f32>,
    pub italic: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphData {
    pub text: String,
    pub style_id: Option<String>,
    pub line_spacing: Option<f32>,
    pub runs: Vec<RunData>,
}

/// Page margins in 1/1440 inch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginTwips {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedBody {
    pub paragraphs: Vec<ParagraphData>,
    pub tables: Vec<Table>,
    pub margins: Option<MarginTwips>,
}

#[derive(Default)]
struct TableBuilder {
    index: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<Vec<String>>,
}

pub fn parse_document_xml(xml: &str) -> Result<ParsedBody, ExtractionError> {
    let mut reader = Reader::from_str(xml);

    let mut body = ParsedBody::default();
    let mut table: Option<TableBuilder> = None;
    let mut tables_seen = 0usize;
    let mut table_depth = 0usize;
    let mut textbox_depth = 0usize;

    let mut paragraph: Option<ParagraphData> = None;
    let mut run: Option<RunData> = None;
    let mut in_text = false;
    let mut in_paragraph_props = false;
    let mut in_run_props = false;

    loop {
        let event = reader.read_event().map_err(|e| xml_error("word/document.xml", e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let name = local.as_ref();

                if name == b"txbxContent" {
                    if !is_empty {
                        textbox_depth += 1;
                    }
                    continue;
                }
                if textbox_depth > 0 {
                    continue;
                }

                match name {
                    b"tbl" if !is_empty => {
                        table_depth += 1;
                        if table_depth == 1 {
                            table = Some(TableBuilder {
                                index: tables_seen,
                                ..TableBuilder::default()
                            });
                            tables_seen += 1;
                        }
                    }
                    b"tr" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.row = Some(Vec::new());
                            if is_empty {
                                close_row(t);
                            }
                        }
                    }
                    b"tc" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            t.cell = Some(Vec::new());
                            if is_empty {
                                close_cell(t);
                            }
                        }
                    }
                    b"p" => {
                        if is_empty {
                            finish_paragraph(ParagraphData::default(), &mut body, &mut table, table_depth);
                        } else {
                            paragraph = Some(ParagraphData::default());
                        }
                    }
                    b"pPr" if !is_empty => in_paragraph_props = true,
                    b"pStyle" if in_paragraph_props => {
                        if let Some(p) = paragraph.as_mut() {
                            p.style_id = attr(e, b"val");
                        }
                    }
                    b"spacing" if in_paragraph_props => {
                        if let Some(p) = paragraph.as_mut() {
                            p.line_spacing = line_spacing(e);
                        }
                    }
                    b"pgMar" if body.margins.is_none() => {
                        body.margins = page_margins(e);
                    }
                    b"r" if paragraph.is_some() && !in_paragraph_props && !is_empty => {
                        run = Some(RunData::default());
                    }
                    b"rPr" if run.is_some() && !is_empty => in_run_props = true,
                    b"rFonts" if in_run_props => {
                        if let Some(r) = run.as_mut() {
                            r.font_name = attr(e, b"ascii").or_else(|| attr(e, b"hAnsi"));
                        }
                    }
                    b"sz" if in_run_props => {
                        if let Some(r) = run.as_mut() {
                            r.size_pt = attr(e, b"val")
                                .and_then(|v| v.parse::<f32>().ok())
                                .map(|half_points| half_points / 2.0);
                        }
                    }
                    b"i" if in_run_props => {
                        if let Some(r) = run.as_mut() {
                            r.italic = is_on(e);
                        }
                    }
                    b"t" if run.is_some() && !is_empty => in_text = true,
                    b"tab" if run.is_some() && !in_run_props => {
                        if let Some(r) = run.as_mut() {
                            r.text.push('\t');
                        }
                    }
                    b"br" | b"cr" if run.is_some() && !in_run_props => {
                        if let Some(r) = run.as_mut() {
                            r.text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => {
                let local = e.local_name();
                let name = local.as_ref();

                if name == b"txbxContent" {
                    textbox_depth = textbox_depth.saturating_sub(1);
                    continue;
                }
                if textbox_depth > 0 {
                    continue;
                }

                match name {
                    b"tbl" => {
                        if table_depth == 1 {
                            if let Some(t) = table.take() {
                                if !t.rows.is_empty() {
                                    body.tables.push(Table {
                                        index: t.index,
                                        page: None,
                                        rows: t.rows,
                                    });
                                }
                            }
                        }
                        table_depth = table_depth.saturating_sub(1);
                    }
                    b"tr" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            close_row(t);
                        }
                    }
                    b"tc" if table_depth == 1 => {
                        if let Some(t) = table.as_mut() {
                            close_cell(t);
                        }
                    }
                    b"p" => {
                        if let Some(p) = paragraph.take() {
                            finish_paragraph(p, &mut body, &mut table, table_depth);
                        }
                    }
                    b"pPr" => in_paragraph_props = false,
                    b"rPr" => in_run_props = false,
                    b"t" => in_text = false,
                    b"r" => {
                        if let (Some(r), Some(p)) = (run.take(), paragraph.as_mut()) {
                            p.text.push_str(&r.text);
                            p.runs.push(r);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) if in_text && textbox_depth == 0 => {
                let text = t
                    .unescape()
                    .map_err(|e| xml_error("word/document.xml", e))?;
                if let Some(r) = run.as_mut() {
                    r.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}

/// Style id → display name from `word/styles.xml`
pub fn parse_style_names(xml: &str) -> Result<HashMap<String, String>, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut names = HashMap::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| xml_error("word/styles.xml", e))? {
            Event::Start(ref e) if e.local_name().as_ref() == b"style" => {
                current_id = attr(e, b"styleId");
            }
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"name" => {
                if let (Some(id), Some(name)) = (current_id.as_ref(), attr(e, b"val")) {
                    names.insert(id.clone(), name);
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"style" => current_id = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(names)
}

fn finish_paragraph(
    paragraph: ParagraphData,
    body: &mut ParsedBody,
    table: &mut Option<TableBuilder>,
    table_depth: usize,
) {
    if table_depth == 0 {
        body.paragraphs.push(paragraph);
        return;
    }
    // Nested tables flatten into the enclosing top-level cell
    if let Some(cell) = table.as_mut().and_then(|t| t.cell.as_mut()) {
        cell.push(paragraph.text);
    }
}

fn close_cell(table: &mut TableBuilder) {
    if let Some(cell) = table.cell.take() {
        let text = cell.join("\n").trim().to_string();
        if let Some(row) = table.row.as_mut() {
            row.push(text);
        }
    }
}

fn close_row(table: &mut TableBuilder) {
    if let Some(row) = table.row.take() {
        if row.iter().any(|c| !c.is_empty()) {
            table.rows.push(row);
        }
    }
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Toggle properties are on unless `w:val` says otherwise
fn is_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        attr(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

/// `auto` spacing is a multiple of single lines, anything else is in points
fn line_spacing(e: &BytesStart<'_>) -> Option<f32> {
    let line: f32 = attr(e, b"line")?.parse().ok()?;
    match attr(e, b"lineRule").as_deref() {
        None | Some("auto") => Some(line / 240.0),
        Some(_) => Some(line / 20.0),
    }
}

fn page_margins(e: &BytesStart<'_>) -> Option<MarginTwips> {
    let side = |name: &[u8]| -> Option<i64> { attr(e, name)?.parse::<f64>().ok().map(|v| v as i64) };
    Some(MarginTwips {
        left: side(b"left")?,
        right: side(b"right")?,
        top: side(b"top")?,
        bottom: side(b"bottom")?,
    })
}

fn xml_error(part: &str, err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}
