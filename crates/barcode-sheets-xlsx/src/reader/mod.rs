//! XLSX reader

mod drawing;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::package::read_relationships;
use crate::styles::read_styles_xml;
use barcode_sheets_core::{
    CellAddress, CellError, CellRange, CellValue, Picture, PictureSize, Workbook, Worksheet,
};

use drawing::{parse_drawing, PictureAnchor};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut saw_x = false;
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            saw_x = true;
            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not an escape; emit what was consumed
                result.push('_');
                if saw_x {
                    result.push('x');
                }
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// Parse a boolean attribute value ("1"/"true")
fn attr_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Sheet entry from `xl/workbook.xml`
struct SheetEntry {
    name: String,
    r_id: String,
    hidden: bool,
}

/// XLSX file reader
///
/// Reads cell values and format indices, the workbook stylesheet, row/column
/// dimensions, merged regions and pictures. Comments and other sheet features
/// are not modelled and are dropped.
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let workbook_part = Self::find_workbook_part(&mut archive)?;
        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheets = Self::read_workbook_xml(&mut archive, &workbook_part)?;
        let workbook_rels = read_relationships(&mut archive, &workbook_part)?;

        let styles_part = workbook_rels
            .iter()
            .find(|rel| rel.is_kind("styles") && !rel.external)
            .map(|rel| rel.target.clone());

        // Sheet rId -> part name
        let sheet_paths: HashMap<String, String> = workbook_rels
            .into_iter()
            .filter(|rel| rel.is_kind("worksheet") && !rel.external)
            .map(|rel| (rel.id, rel.target))
            .collect();

        let mut workbook = Workbook::empty();
        if let Some(part) = styles_part {
            Self::read_styles(&mut archive, &part, &mut workbook)?;
        }
        // Media parts already loaded, shared between every anchor that uses them
        let mut media: HashMap<String, Arc<[u8]>> = HashMap::new();

        for entry in &sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!(
                    "Sheet '{}' has no worksheet part (r:id {}); skipped",
                    entry.name,
                    entry.r_id
                );
                continue;
            };

            let mut worksheet = Worksheet::new(entry.name.clone());
            worksheet.set_visible(!entry.hidden);

            let drawing_rid =
                Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings)?;
            if let Some(r_id) = drawing_rid {
                Self::read_worksheet_pictures(&mut archive, path, &r_id, &mut worksheet, &mut media)?;
            }

            log::debug!(
                "Read sheet '{}': {} cells, {} pictures",
                worksheet.name(),
                worksheet.cell_count(),
                worksheet.picture_count()
            );
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            workbook.add_worksheet()?;
        }

        Ok(workbook)
    }

    /// Locate the workbook part through the package relationships, falling
    /// back to the conventional name.
    fn find_workbook_part<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<String> {
        let rels = read_relationships(archive, "")?;
        let part = rels
            .into_iter()
            .find(|rel| rel.is_kind("officeDocument") && !rel.external)
            .map(|rel| rel.target)
            .unwrap_or_else(|| "xl/workbook.xml".to_string());
        Ok(part)
    }

    /// Load the workbook's stylesheet. A missing part leaves the workbook
    /// on the default formats.
    fn read_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        part: &str,
        workbook: &mut Workbook,
    ) -> XlsxResult<()> {
        let file = match archive.by_name(part) {
            Ok(f) => f,
            Err(_) => {
                log::warn!("Styles part {} is missing; using default formats", part);
                return Ok(());
            }
        };
        let stylesheet = read_styles_xml(file)?;
        log::debug!(
            "Read {} cell formats from {}",
            stylesheet.cell_format_count(),
            part
        );
        workbook.set_stylesheet(stylesheet);
        Ok(())
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) repeat the text in another script
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read the workbook part to get sheet names, rIds and visibility
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        workbook_part: &str,
    ) -> XlsxResult<Vec<SheetEntry>> {
        let file = archive
            .by_name(workbook_part)
            .map_err(|_| XlsxError::MissingPart(workbook_part.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;
                    let mut hidden = false;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"state" => {
                                hidden = attr.unescape_value().map_or(false, |s| s != "visible");
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push(SheetEntry { name, r_id, hidden });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read a worksheet part into `worksheet`.
    ///
    /// Returns the relationship id of the sheet's drawing, if it has one.
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<Option<String>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut drawing_rid = None;

        // Current cell state
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_style = 0u32;
        let mut current_value: Option<String> = None;
        let mut current_formula: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => Self::apply_row_attrs(&e, worksheet),
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = None;
                        current_cell_type = None;
                        current_style = 0;
                        current_value = None;
                        current_formula = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    current_cell_ref =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"t" => {
                                    current_cell_type =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"s" => current_style = Self::style_attr(&attr.value),
                                _ => {}
                            }
                        }
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => in_formula = true,
                    b"is" if in_cell => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(ref cell_ref) = current_cell_ref {
                            Self::process_cell(
                                worksheet,
                                cell_ref,
                                current_cell_type.as_deref(),
                                current_value.as_deref(),
                                current_formula.as_deref(),
                                shared_strings,
                            )?;
                            Self::apply_cell_style(worksheet, cell_ref, current_style)?;
                        }
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        current_value = Some(e.unescape()?.to_string());
                    } else if in_formula {
                        current_formula = Some(e.unescape()?.to_string());
                    } else if in_inline_text {
                        // Rich inline strings split text across several runs
                        current_value
                            .get_or_insert_with(String::new)
                            .push_str(&e.unescape()?);
                        current_cell_type = Some("inlineStr".to_string());
                    }
                }
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // Self-closing <row .../> with no cells may still carry dimensions
                    b"row" => Self::apply_row_attrs(&e, worksheet),
                    b"col" => Self::apply_col_attrs(&e, worksheet),
                    // Empty <c/> elements hold only a style
                    b"c" => {
                        let mut cell_ref = None;
                        let mut style = 0u32;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => cell_ref = attr.unescape_value().ok().map(|s| s.to_string()),
                                b"s" => style = Self::style_attr(&attr.value),
                                _ => {}
                            }
                        }
                        if let Some(cell_ref) = cell_ref {
                            Self::apply_cell_style(worksheet, &cell_ref, style)?;
                        }
                    }
                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                let ref_str = attr.unescape_value()?;
                                match CellRange::parse(&ref_str) {
                                    Ok(range) => {
                                        if let Err(e) = worksheet.merge_cells(&range) {
                                            log::warn!("Ignoring merged region {}: {}", ref_str, e);
                                        }
                                    }
                                    Err(e) => log::warn!("Bad merged region '{}': {}", ref_str, e),
                                }
                            }
                        }
                    }
                    b"drawing" => {
                        drawing_rid = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.local_name().as_ref() == b"id")
                            .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()));
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(drawing_rid)
    }

    /// Parse row dimensions: ht, customHeight, hidden
    fn apply_row_attrs(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let mut row_num: Option<u32> = None;
        let mut ht: Option<f64> = None;
        let mut custom_height = false;
        let mut hidden = false;

        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"r" => row_num = value.parse::<u32>().ok(),
                b"ht" => ht = value.parse::<f64>().ok(),
                b"customHeight" => custom_height = attr_flag(&value),
                b"hidden" => hidden = attr_flag(&value),
                _ => {}
            }
        }

        if let Some(r) = row_num {
            let row_idx = r.saturating_sub(1); // 1-based to 0-based
            if custom_height {
                if let Some(h) = ht {
                    worksheet.set_row_height(row_idx, h);
                }
            }
            if hidden {
                worksheet.set_row_hidden(row_idx, true);
            }
        }
    }

    /// Parse column dimensions: min, max, width, customWidth, hidden
    fn apply_col_attrs(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let mut col_min: Option<u16> = None;
        let mut col_max: Option<u16> = None;
        let mut width: Option<f64> = None;
        let mut custom_width = false;
        let mut hidden = false;

        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.as_ref() {
                b"min" => col_min = value.parse::<u16>().ok(),
                b"max" => col_max = value.parse::<u16>().ok(),
                b"width" => width = value.parse::<f64>().ok(),
                b"customWidth" => custom_width = attr_flag(&value),
                b"hidden" => hidden = attr_flag(&value),
                _ => {}
            }
        }

        if let (Some(min), Some(max)) = (col_min, col_max) {
            // min/max are 1-based in XLSX and may run past the last real column
            let max = max.min(barcode_sheets_core::MAX_COLS);
            for col in min.max(1)..=max {
                let col_idx = col - 1;
                if custom_width {
                    if let Some(w) = width {
                        worksheet.set_column_width(col_idx, w);
                    }
                }
                if hidden {
                    worksheet.set_column_hidden(col_idx, true);
                }
            }
        }
    }

    /// Parse a cell's `s` attribute; anything unreadable means the default format
    fn style_attr(raw: &[u8]) -> u32 {
        std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Record a cell's format index
    fn apply_cell_style(worksheet: &mut Worksheet, cell_ref: &str, style: u32) -> XlsxResult<()> {
        if style == 0 {
            return Ok(());
        }
        let addr = CellAddress::parse(cell_ref).map_err(|source| XlsxError::CellReference {
            reference: cell_ref.to_string(),
            source,
        })?;
        worksheet.set_cell_style_at(addr.row, addr.col, style)?;
        Ok(())
    }

    /// Process a cell and add it to the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        formula: Option<&str>,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell_ref).map_err(|source| XlsxError::CellReference {
            reference: cell_ref.to_string(),
            source,
        })?;

        if let Some(f) = formula {
            // Cached result of the last calculation, if the producer stored one
            let cached = value.and_then(|v| match cell_type {
                Some("b") => Some(CellValue::Boolean(attr_flag(v))),
                Some("e") => CellError::parse(v).map(CellValue::Error),
                Some("s") => {
                    let idx: usize = v.parse().ok()?;
                    shared_strings.get(idx).map(|s| CellValue::string(s.as_str()))
                }
                Some("str") | Some("inlineStr") => Some(CellValue::string(decode_excel_escapes(v))),
                None | Some("n") => v.parse::<f64>().ok().map(CellValue::Number),
                Some(_) => Some(CellValue::string(v)),
            });

            let formula_text = if f.starts_with('=') {
                f.to_string()
            } else {
                format!("={}", f)
            };

            worksheet.set_cell_value_at(
                addr.row,
                addr.col,
                CellValue::Formula {
                    text: formula_text,
                    cached_value: cached.map(Box::new),
                },
            )?;
        } else if let Some(value) = value {
            let cell_value = match cell_type {
                // Shared string
                Some("s") => {
                    let s = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|idx| shared_strings.get(idx))
                        .ok_or_else(|| XlsxError::SharedString(value.to_string()))?;
                    CellValue::string(s.as_str())
                }

                Some("b") => CellValue::Boolean(attr_flag(value)),

                Some("e") => CellError::parse(value)
                    .map(CellValue::Error)
                    .unwrap_or_else(|| CellValue::string(value)),

                Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(value)),

                // Number (default type or explicit "n")
                None | Some("n") => match value.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(value),
                },

                // Unknown type (e.g. ISO dates with t="d") - keep the text
                Some(_) => CellValue::string(value),
            };

            worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?;
        }

        Ok(())
    }

    /// Resolve a sheet's drawing and attach every picture it anchors.
    ///
    /// Pictures whose media part is missing or not a recognised raster format
    /// are skipped with a warning rather than failing the whole load.
    fn read_worksheet_pictures<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        sheet_path: &str,
        drawing_rid: &str,
        worksheet: &mut Worksheet,
        media: &mut HashMap<String, Arc<[u8]>>,
    ) -> XlsxResult<()> {
        let sheet_rels = read_relationships(archive, sheet_path)?;
        let Some(drawing_path) = sheet_rels
            .iter()
            .find(|rel| rel.id == drawing_rid && rel.is_kind("drawing"))
            .map(|rel| rel.target.clone())
        else {
            log::warn!(
                "Drawing {} of {} has no relationship target",
                drawing_rid,
                sheet_path
            );
            return Ok(());
        };

        let anchors = match archive.by_name(&drawing_path) {
            Ok(file) => parse_drawing(BufReader::new(file))?,
            Err(_) => return Err(XlsxError::MissingPart(drawing_path)),
        };
        if anchors.is_empty() {
            return Ok(());
        }

        let image_targets: HashMap<String, String> = read_relationships(archive, &drawing_path)?
            .into_iter()
            .filter(|rel| rel.is_kind("image") && !rel.external)
            .map(|rel| (rel.id, rel.target))
            .collect();

        for anchor in anchors {
            let Some(media_path) = image_targets.get(&anchor.embed) else {
                log::warn!(
                    "Picture at {} references unknown image {}",
                    CellAddress::new(anchor.row, anchor.col),
                    anchor.embed
                );
                continue;
            };

            let data = match media.get(media_path) {
                Some(data) => data.clone(),
                None => {
                    let Some(bytes) = Self::read_part_bytes(archive, media_path)? else {
                        log::warn!("Missing media part {}", media_path);
                        continue;
                    };
                    let data: Arc<[u8]> = Arc::from(bytes);
                    media.insert(media_path.clone(), data.clone());
                    data
                }
            };

            Self::attach_picture(worksheet, &anchor, data, media_path)?;
        }

        Ok(())
    }

    fn attach_picture(
        worksheet: &mut Worksheet,
        anchor: &PictureAnchor,
        data: Arc<[u8]>,
        media_path: &str,
    ) -> XlsxResult<()> {
        let cell = CellAddress::new(anchor.row, anchor.col);
        let Some((cx, cy)) = anchor.extent else {
            log::warn!("Picture at {} has no extent; skipped", cell);
            return Ok(());
        };

        match Picture::new(cell, data, PictureSize::from_emu(cx, cy)) {
            Ok(picture) => worksheet.add_picture(picture)?,
            Err(e) => log::warn!("Skipping picture {} at {}: {}", media_path, cell, e),
        }
        Ok(())
    }

    fn read_part_bytes<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
    ) -> XlsxResult<Option<Vec<u8>>> {
        let mut file = match archive.by_name(path) {
            Ok(f) => f,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn build_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();
            for (name, content) in parts {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
    const ROOT_RELS: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
    const WORKBOOK: &[u8] = br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    const WORKBOOK_RELS: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(
            decode_excel_escapes("line1_x000D__x000A_line2"),
            "line1\r\nline2"
        );
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_b"), "a_b");
        assert_eq!(decode_excel_escapes("_xyz"), "_xyz");
    }

    #[test]
    fn test_read_empty_xlsx() {
        let buf = build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            (
                "xl/worksheets/sheet1.xml",
                br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData></sheetData></worksheet>"#,
            ),
        ]);

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Sheet1");
        assert!(workbook.worksheet(0).unwrap().is_empty());
    }

    #[test]
    fn test_read_cell_types() {
        let buf = build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            (
                "xl/sharedStrings.xml",
                br#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2"><si><t>SSCC</t></si><si><r><t>0031234</t></r><r><t>56789012345</t></r></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                br#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Qty</t></is></c></row>
<row r="2" ht="30" customHeight="1"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>12</v></c><c r="C2" t="b"><v>1</v></c><c r="D2" t="e"><v>#N/A</v></c></row>
<row r="3"><c r="A3" t="str"><f>A2</f><v>003123456789012345</v></c><c r="B3" s="4"/></row>
</sheetData><mergeCells count="1"><mergeCell ref="E1:F2"/></mergeCells></worksheet>"#,
            ),
        ]);

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("SSCC"));
        assert_eq!(ws.get_value("B1").unwrap().as_string(), Some("Qty"));
        assert_eq!(
            ws.get_value("A2").unwrap().as_string(),
            Some("003123456789012345")
        );
        assert_eq!(ws.get_value("B2").unwrap().as_number(), Some(12.0));
        assert_eq!(ws.get_value("C2").unwrap().as_bool(), Some(true));
        assert_eq!(
            ws.get_value("D2").unwrap(),
            CellValue::Error(CellError::Na)
        );

        let formula = ws.get_value("A3").unwrap();
        assert_eq!(formula.formula_text(), Some("=A2"));
        assert_eq!(formula.to_string(), "003123456789012345");

        // Style-only cells are kept but do not extend the used range
        assert_eq!(ws.last_column_in_row(2), Some(0));
        assert_eq!(ws.cell_style_at(2, 1), 4);
        assert!((ws.row_height(1) - 30.0).abs() < 0.001);
        assert_eq!(ws.merged_regions().len(), 1);
    }

    #[test]
    fn test_read_styles_through_workbook_rels() {
        let styles: &[u8] = br#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="000000000000000000"/></numFmts><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;
        let rels: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="theme/formats.xml"/></Relationships>"#;
        let buf = build_package(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/theme/formats.xml", styles),
            (
                "xl/worksheets/sheet1.xml",
                br#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="2"><c r="A2" s="2"><v>3123456789012345</v></c><c r="B2" s="1"><v>45321</v></c><c r="C2" s="1"/></row></sheetData></worksheet>"#,
            ),
        ]);

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        let stylesheet = workbook.stylesheet().unwrap();
        assert_eq!(stylesheet.cell_format_count(), 3);
        assert!(stylesheet.xml().contains(r#"formatCode="000000000000000000""#));

        let ws = workbook.worksheet(0).unwrap();
        assert_eq!(ws.cell_style_at(1, 0), 2);
        assert_eq!(ws.cell_style_at(1, 1), 1);
        assert_eq!(ws.cell_style_at(1, 2), 1);
        assert_eq!(ws.get_value_at(1, 1).as_number(), Some(45321.0));
        assert_eq!(ws.last_column_in_row(1), Some(1));
    }

    #[test]
    fn test_missing_content_types() {
        let buf = build_package(&[("xl/workbook.xml", WORKBOOK)]);
        let err = XlsxReader::read(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }
}
