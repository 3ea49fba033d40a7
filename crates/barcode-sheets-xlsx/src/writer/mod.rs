//! XLSX writer

mod drawing;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{
    NS_MAIN, NS_PACKAGE_REL, NS_REL, REL_DRAWING, REL_OFFICE_DOCUMENT, REL_STYLES, REL_WORKSHEET,
};
use crate::styles::styles_for;
use barcode_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};

use drawing::{build_sheet_drawing, media_formats, MediaTable, SheetDrawing};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize a workbook into an in-memory XLSX package
    pub fn write_to_vec(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        Self::write(workbook, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "A workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);

        // Drawings are numbered in sheet order, skipping sheets without pictures
        let mut media = MediaTable::default();
        let mut drawings: Vec<Option<SheetDrawing>> = Vec::with_capacity(workbook.sheet_count());
        let mut next_drawing = 1;
        for sheet in workbook.worksheets() {
            if sheet.picture_count() == 0 {
                drawings.push(None);
            } else {
                drawings.push(Some(build_sheet_drawing(sheet, next_drawing, &mut media)));
                next_drawing += 1;
            }
        }

        Self::write_content_types(&mut zip, workbook, &drawings, &media)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        let (styles_xml, format_count) = styles_for(workbook);
        Self::write_part(&mut zip, "xl/styles.xml", styles_xml)?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let drawing = drawings.get(i).and_then(|d| d.as_ref());
            Self::write_worksheet(&mut zip, sheet, i, drawing.is_some(), format_count)?;

            if let Some(drawing) = drawing {
                Self::write_worksheet_rels(&mut zip, i, drawing.number)?;
                Self::write_part(
                    &mut zip,
                    &format!("xl/drawings/drawing{}.xml", drawing.number),
                    &drawing.xml,
                )?;
                Self::write_part(
                    &mut zip,
                    &format!("xl/drawings/_rels/drawing{}.xml.rels", drawing.number),
                    &drawing.rels,
                )?;
            }
        }

        // Images are already compressed; storing them avoids a pointless deflate pass
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for part in media.parts() {
            zip.start_file(format!("xl/media/{}", part.name), stored)?;
            zip.write_all(part.data)?;
        }

        log::debug!(
            "Wrote {} sheets, {} drawings, {} media parts",
            workbook.sheet_count(),
            next_drawing - 1,
            media.parts().len()
        );

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
        drawings: &[Option<SheetDrawing>],
        media: &MediaTable<'_>,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>"#,
        );

        for format in media_formats(media) {
            content.push_str(&format!(
                r#"
    <Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            ));
        }

        content.push_str(
            r#"
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        for drawing in drawings.iter().flatten() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/drawings/drawing{}.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#,
                drawing.number
            ));
        }

        content.push_str("\n</Types>");

        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
    <Relationship Id="rId1" Type="{}" Target="xl/workbook.xml"/>
</Relationships>"#,
            NS_PACKAGE_REL, REL_OFFICE_DOCUMENT
        );
        Self::write_part(zip, "_rels/.rels", &content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}">
    <bookViews><workbookView activeTab="{}"/></bookViews>
    <sheets>"#,
            NS_MAIN,
            NS_REL,
            workbook.active_sheet()
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            let state = if sheet.is_visible() {
                ""
            } else {
                r#" state="hidden""#
            };
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                Self::escape_xml(sheet.name()),
                i + 1,
                state,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">"#,
            NS_PACKAGE_REL
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                REL_WORKSHEET,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="{}" Target="styles.xml"/>
</Relationships>"#,
            workbook.sheet_count() + 1,
            REL_STYLES
        ));

        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet: &Worksheet,
        index: usize,
        has_drawing: bool,
        format_count: u32,
    ) -> XlsxResult<()> {
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}" xmlns:r="{}">"#,
            NS_MAIN, NS_REL
        );

        if let Some(range) = sheet.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", range));
        }

        Self::write_cols(&mut content, sheet);

        content.push_str("\n    <sheetData>");

        // Rows with cells plus rows that only carry a height or hidden flag
        let rows: BTreeSet<u32> = sheet
            .iter_cells()
            .map(|(row, _, _)| row)
            .chain(sheet.customized_rows())
            .collect();

        // Cells pointing past the stylesheet's formats fall back to the default
        let mut unknown_styles = 0usize;

        for row in rows {
            let mut attrs = format!(" r=\"{}\"", row + 1);
            if sheet.has_custom_row_height(row) {
                attrs.push_str(&format!(
                    " ht=\"{}\" customHeight=\"1\"",
                    sheet.row_height(row)
                ));
            }
            if sheet.is_row_hidden(row) {
                attrs.push_str(" hidden=\"1\"");
            }

            let mut cells = sheet.iter_row(row).peekable();
            if cells.peek().is_none() {
                content.push_str(&format!("\n        <row{}/>", attrs));
                continue;
            }

            content.push_str(&format!("\n        <row{}>", attrs));
            for (col, cell) in cells {
                let cell_ref = CellAddress::new(row, col).to_a1_string();
                let style = if cell.style_index < format_count {
                    cell.style_index
                } else {
                    unknown_styles += 1;
                    0
                };
                Self::write_cell(&mut content, &cell_ref, style, &cell.value);
            }
            content.push_str("\n        </row>");
        }

        if unknown_styles > 0 {
            log::warn!(
                "Sheet '{}': {} cells referenced missing formats and were written unformatted",
                sheet.name(),
                unknown_styles
            );
        }

        content.push_str("\n    </sheetData>");

        let merged_regions = sheet.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        // The drawing is always the sheet's first (and only) relationship
        if has_drawing {
            content.push_str("\n    <drawing r:id=\"rId1\"/>");
        }

        content.push_str("\n</worksheet>");

        Self::write_part(
            zip,
            &format!("xl/worksheets/sheet{}.xml", index + 1),
            &content,
        )
    }

    fn write_cols(content: &mut String, sheet: &Worksheet) {
        let cols = sheet.customized_columns();
        if cols.is_empty() {
            return;
        }

        content.push_str("\n    <cols>");
        for col in cols {
            let mut attrs = format!(
                " min=\"{n}\" max=\"{n}\" width=\"{}\"",
                sheet.column_width(col),
                n = col + 1
            );
            if (sheet.column_width(col) - 8.43).abs() >= 0.001 {
                attrs.push_str(" customWidth=\"1\"");
            }
            if sheet.is_column_hidden(col) {
                attrs.push_str(" hidden=\"1\"");
            }
            content.push_str(&format!("\n        <col{}/>", attrs));
        }
        content.push_str("\n    </cols>");
    }

    fn write_cell(content: &mut String, cell_ref: &str, style: u32, value: &CellValue) {
        let mut attrs = format!(" r=\"{}\"", cell_ref);
        if style != 0 {
            attrs.push_str(&format!(" s=\"{}\"", style));
        }

        match value {
            CellValue::Number(n) => {
                content.push_str(&format!("\n            <c{}><v>{}</v></c>", attrs, n));
            }
            CellValue::String(s) => {
                content.push_str(&format!(
                    "\n            <c{} t=\"inlineStr\"><is><t{}>{}</t></is></c>",
                    attrs,
                    Self::space_attr(s.as_str()),
                    Self::escape_xml(s.as_str())
                ));
            }
            CellValue::Boolean(b) => {
                content.push_str(&format!(
                    "\n            <c{} t=\"b\"><v>{}</v></c>",
                    attrs,
                    if *b { 1 } else { 0 }
                ));
            }
            CellValue::Error(e) => {
                content.push_str(&format!(
                    "\n            <c{} t=\"e\"><v>{}</v></c>",
                    attrs,
                    Self::escape_xml(e.as_str())
                ));
            }
            CellValue::Formula { text, cached_value } => {
                let formula_text = text.strip_prefix('=').unwrap_or(text);
                // Keep the cached result so readers that don't recalculate see a value
                let (type_attr, cached) = match cached_value.as_deref() {
                    Some(CellValue::Number(n)) => ("", format!("<v>{}</v>", n)),
                    Some(CellValue::String(s)) => (
                        " t=\"str\"",
                        format!("<v>{}</v>", Self::escape_xml(s.as_str())),
                    ),
                    Some(CellValue::Boolean(b)) => {
                        (" t=\"b\"", format!("<v>{}</v>", if *b { 1 } else { 0 }))
                    }
                    Some(CellValue::Error(e)) => (" t=\"e\"", format!("<v>{}</v>", e.as_str())),
                    _ => ("", String::new()),
                };
                content.push_str(&format!(
                    "\n            <c{}{}><f>{}</f>{}</c>",
                    attrs,
                    type_attr,
                    Self::escape_xml(formula_text),
                    cached
                ));
            }
            // Formatting-only cell
            CellValue::Empty => {
                if style != 0 {
                    content.push_str(&format!("\n            <c{}/>", attrs));
                }
            }
        }
    }

    /// Write worksheet relationships file (the sheet's drawing)
    fn write_worksheet_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_index: usize,
        drawing_number: usize,
    ) -> XlsxResult<()> {
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
    <Relationship Id="rId1" Type="{}" Target="../drawings/drawing{}.xml"/>
</Relationships>"#,
            NS_PACKAGE_REL, REL_DRAWING, drawing_number
        );

        Self::write_part(
            zip,
            &format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index + 1),
            &content,
        )
    }

    fn space_attr(s: &str) -> &'static str {
        if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
            " xml:space=\"preserve\""
        } else {
            ""
        }
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}
