//! XLSX styles (styles.xml) read/write helpers

use std::io::{BufReader, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use barcode_sheets_core::{Stylesheet, Workbook};

/// Stylesheet for workbooks that carry none: one font, the two mandatory
/// fills, one border and a single cell format every cell uses.
pub(crate) const DEFAULT_STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

// === Reading ===

/// Read a styles part, keeping the document whole and counting its cell formats.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Stylesheet> {
    let mut xml = String::new();
    BufReader::new(reader).read_to_string(&mut xml)?;

    let mut xml_reader = Reader::from_str(&xml);
    xml_reader.trim_text(true);

    let mut in_cell_xfs = false;
    let mut cell_formats = 0u32;
    let mut found_cell_xfs = false;

    loop {
        match xml_reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"cellXfs" => {
                    in_cell_xfs = true;
                    found_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => cell_formats += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"cellXfs" => found_cell_xfs = true,
                b"xf" if in_cell_xfs => cell_formats += 1,
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }

    if !found_cell_xfs {
        return Err(XlsxError::InvalidFormat(
            "Stylesheet has no cell formats (cellXfs)".into(),
        ));
    }

    Ok(Stylesheet::new(xml, cell_formats))
}

// === Writing ===

/// Stylesheet document to store for `workbook`, with the number of cell
/// formats it defines.
pub(crate) fn styles_for(workbook: &Workbook) -> (&str, u32) {
    match workbook.stylesheet() {
        Some(sheet) => (sheet.xml(), sheet.cell_format_count()),
        None => (DEFAULT_STYLES_XML, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLED: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="000000"/></numFmts>
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="164" fontId="1" fillId="0" borderId="0" xfId="0"><alignment horizontal="center"/></xf></cellXfs>
</styleSheet>"#;

    #[test]
    fn test_read_counts_cell_formats_only() {
        let sheet = read_styles_xml(STYLED.as_bytes()).unwrap();

        // cellStyleXfs entries are not cell formats
        assert_eq!(sheet.cell_format_count(), 3);
        assert_eq!(sheet.xml(), STYLED);
    }

    #[test]
    fn test_default_stylesheet_parses() {
        let sheet = read_styles_xml(DEFAULT_STYLES_XML.as_bytes()).unwrap();
        assert_eq!(sheet.cell_format_count(), 1);
    }

    #[test]
    fn test_missing_cell_formats_rejected() {
        let err = read_styles_xml(&b"<styleSheet><fonts count=\"0\"/></styleSheet>"[..]).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }

    #[test]
    fn test_styles_for_falls_back_to_default() {
        let mut wb = Workbook::new();
        assert_eq!(styles_for(&wb), (DEFAULT_STYLES_XML, 1));

        wb.set_stylesheet(Stylesheet::new(STYLED, 3));
        assert_eq!(styles_for(&wb), (STYLED, 3));
    }
}
