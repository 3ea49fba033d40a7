//! End-to-end tests: workbook on disk -> stamp -> workbook on disk

use std::cell::Cell;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use barcode_sheets::{
    process_file, process_file_with_options, BarcodeRenderer, BarcodeStamper, Error, Grid,
    PictureSize, Sscc, StampOptions, Synthesize, SynthesisError, Workbook, Worksheet, XlsxReader,
    XlsxWriter,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const ID: &str = "123456789012345678";

fn write_input(dir: &Path, name: &str, wb: &Workbook) -> PathBuf {
    let path = dir.join(name);
    XlsxWriter::write_file(wb, &path).unwrap();
    path
}

fn sheet_workbook(rows: &[&[&str]]) -> Workbook {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    for (r, cells) in rows.iter().enumerate() {
        for (c, text) in cells.iter().enumerate() {
            if !text.is_empty() {
                sheet
                    .set_cell_text(r as u32 + 1, c as u32 + 1, text)
                    .unwrap();
            }
        }
    }
    wb
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Renders with the real renderer and counts calls
struct CountingRenderer {
    inner: BarcodeRenderer,
    calls: Cell<usize>,
}

impl Synthesize for CountingRenderer {
    fn synthesize(&self, sscc: &Sscc) -> Result<Vec<u8>, SynthesisError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.synthesize(sscc)
    }
}

/// Header "SSCC", two equal identifiers and one bad value
#[test]
fn test_scenario_header_and_repeated_identifier() {
    let dir = tempfile::tempdir().unwrap();
    let wb = sheet_workbook(&[
        &["SSCC", "Customer"],
        &[ID, "ACME"],
        &[ID, "ACME"],
        &["abcdefghijklmnopqr", "Globex"],
    ]);
    let input = write_input(dir.path(), "shipments.xlsx", &wb);

    let done = process_file_with_options(&input, None, &StampOptions::default()).unwrap();
    assert_eq!(done.path.parent(), Some(dir.path()));
    let name = done.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Barcode_shipments_"), "{name}");
    assert!(name.ends_with(".xlsx"));
    assert_eq!(done.report.images_embedded, 2);
    assert_eq!(done.report.distinct_identifiers, 1);
    assert_eq!(done.report.cache_hits, 1);

    let out = XlsxReader::read_file(&done.path).unwrap();
    let sheet = out.worksheet(0).unwrap();
    assert_eq!(sheet.get_value("C1").unwrap().as_string(), Some("Barcode"));
    assert_eq!(sheet.picture_count(), 2);
    for pic in sheet.pictures() {
        assert_eq!(pic.size, PictureSize::new(80, 30));
        assert_eq!(pic.col(), 2);
    }
    // Row 4 unchanged
    assert_eq!(
        sheet.get_value("A4").unwrap().as_string(),
        Some("abcdefghijklmnopqr")
    );
    assert_eq!(sheet.get_value("C4").unwrap().as_string(), None);
    assert_eq!(sheet.pictures_at(3, 2).count(), 0);

    // Same identifier, same image
    let pics = sheet.pictures();
    assert_eq!(pics[0].data, pics[1].data);
    let decoded = image::load_from_memory(&pics[0].data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (500, 190));
}

/// Synthesis happens once for a repeated identifier
#[test]
fn test_scenario_single_synthesis_call() {
    let mut wb = sheet_workbook(&[
        &["SSCC", "Customer"],
        &[ID, "ACME"],
        &[ID, "ACME"],
        &["abcdefghijklmnopqr", "Globex"],
    ]);
    let renderer = CountingRenderer {
        inner: BarcodeRenderer::default(),
        calls: Cell::new(0),
    };
    let stamper = BarcodeStamper::with_synthesizer(StampOptions::default(), renderer);
    stamper.stamp(wb.worksheet_mut(0).unwrap()).unwrap();

    assert_eq!(stamper.synthesizer().calls.get(), 1);
}

/// No header and too few identifiers: the run fails and writes nothing
#[test]
fn test_scenario_column_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let wb = sheet_workbook(&[
        &["Order", "Pallet"],
        &["1", ID],
        &["2", ID],
        &["3", "12345678901234567"],
    ]);
    let input = write_input(dir.path(), "orders.xlsx", &wb);

    let err = process_file(&input, None).unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound));
    assert_eq!(files_in(dir.path()), vec!["orders.xlsx"]);
}

/// Output written to another directory reloads with header and images intact
#[test]
fn test_roundtrip_into_output_dir() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let wb = sheet_workbook(&[
        &["Pallet", "sscc"],
        &["P1", "111111111111111111"],
        &["P2", "222222222222222222", "fragile"],
        &["P3", ""],
    ]);
    let input = write_input(input_dir.path(), "in.xlsx", &wb);

    let path = process_file(&input, Some(output_dir.path())).unwrap();
    assert_eq!(path.parent(), Some(output_dir.path()));
    assert_eq!(files_in(input_dir.path()), vec!["in.xlsx"]);

    let out = XlsxReader::read_file(&path).unwrap();
    let sheet = out.worksheet(0).unwrap();
    assert_eq!(sheet.cell_text(1, 4), "Barcode");
    assert_eq!(sheet.picture_count(), 2);
    let anchors: Vec<(u32, u16)> = sheet.pictures().iter().map(|p| (p.row(), p.col())).collect();
    assert_eq!(anchors, vec![(1, 2), (2, 3)]);

    // Saving the result again keeps it all
    let mut buf = Vec::new();
    XlsxWriter::write(&out, Cursor::new(&mut buf)).unwrap();
    let again = XlsxReader::read(Cursor::new(&buf)).unwrap();
    let sheet = again.worksheet(0).unwrap();
    assert_eq!(sheet.cell_text(1, 4), "Barcode");
    assert_eq!(sheet.picture_count(), 2);
}

/// Sheets after the first are written back untouched
#[test]
fn test_other_sheets_carried_through() {
    let dir = tempfile::tempdir().unwrap();
    let mut wb = sheet_workbook(&[&["SSCC"], &[ID]]);
    let idx = wb.add_worksheet_with_name("Notes").unwrap();
    {
        let notes = wb.worksheet_mut(idx).unwrap();
        notes.set_cell_value("A1", "SSCC").unwrap();
        notes.set_cell_value("A2", ID).unwrap();
    }
    let input = write_input(dir.path(), "multi.xlsx", &wb);

    let path = process_file(&input, None).unwrap();
    let out = XlsxReader::read_file(&path).unwrap();
    assert_eq!(out.sheet_count(), 2);
    let notes = out.worksheet_by_name("Notes").unwrap();
    assert_eq!(notes.picture_count(), 0);
    assert_eq!(notes.cell_count(), 2);
}

/// Numeric identifiers stored as numbers lose digits and are not picked up
#[test]
fn test_numeric_cells_are_not_identifiers() {
    let mut wb = Workbook::new();
    let sheet: &mut Worksheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "SSCC").unwrap();
    sheet.set_cell_value("A2", 123456789012345678.0).unwrap();
    sheet.set_cell_value("A3", ID).unwrap();

    let report = BarcodeStamper::default().stamp(sheet).unwrap();
    assert_eq!(report.images_embedded, 1);
    assert_eq!(sheet.pictures()[0].row(), 2);
}

fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn read_part(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut out = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut out).unwrap();
    out
}

const STYLED_FORMATS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="000000"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="2"><border/><border><bottom style="thin"/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// A formatted input keeps dates, number formats, fonts and borders
#[test]
fn test_cell_formats_survive_stamping() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dated.xlsx");
    let package = zip_parts(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Shipments" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        ),
        ("xl/styles.xml", STYLED_FORMATS),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" s="3" t="inlineStr"><is><t>SSCC</t></is></c><c r="B1" s="3" t="inlineStr"><is><t>Shipped</t></is></c><c r="C1" s="3" t="inlineStr"><is><t>Lot</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>123456789012345678</t></is></c><c r="B2" s="1"><v>45321</v></c><c r="C2" s="2"><v>42</v></c><c r="F2" s="3"/></row></sheetData></worksheet>"#,
        ),
    ]);
    fs::write(&input, package).unwrap();

    let path = process_file(&input, None).unwrap();

    assert_eq!(read_part(&path, "xl/styles.xml"), STYLED_FORMATS);
    let sheet_xml = read_part(&path, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<c r="B2" s="1"><v>45321</v></c>"#), "{sheet_xml}");
    assert!(sheet_xml.contains(r#"<c r="C2" s="2"><v>42</v></c>"#));
    assert!(sheet_xml.contains(r#"<c r="A1" s="3" t="inlineStr">"#));
    assert!(sheet_xml.contains(r#"<c r="F2" s="3"/>"#));
    // The new header carries the default format
    assert!(sheet_xml.contains(r#"<c r="D1" t="inlineStr"><is><t>Barcode</t></is></c>"#));

    let out = XlsxReader::read_file(&path).unwrap();
    let sheet = out.worksheet(0).unwrap();
    assert_eq!(sheet.cell_style_at(1, 1), 1);
    // A formatted blank does not move the image past the row's data
    let anchors: Vec<(u32, u16)> = sheet.pictures().iter().map(|p| (p.row(), p.col())).collect();
    assert_eq!(anchors, vec![(1, 3)]);
}

/// Equal identifiers share one media part in the saved package
#[test]
fn test_media_shared_in_package() {
    let mut wb = sheet_workbook(&[&["SSCC"], &[ID], &[ID], &[ID], &["999999999999999999"]]);
    BarcodeStamper::default()
        .stamp(wb.worksheet_mut(0).unwrap())
        .unwrap();

    let bytes = XlsxWriter::write_to_vec(&wb).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let media = archive
        .file_names()
        .filter(|n| n.starts_with("xl/media/"))
        .count();
    assert_eq!(media, 2);

    let sheet = wb.worksheet(0).unwrap();
    assert!(Arc::ptr_eq(&sheet.pictures()[0].data, &sheet.pictures()[2].data));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// One render per distinct identifier, identical bytes for equal identifiers
    #[test]
    fn prop_cache_hit(picks in proptest::collection::vec(0usize..4, 1..24)) {
        let pool = [
            "111111111111111111",
            "222222222222222222",
            "333333333333333333",
            "not an identifier",
        ];
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_text(1, 1, "SSCC").unwrap();
        for (i, pick) in picks.iter().enumerate() {
            ws.set_cell_text(i as u32 + 2, 1, pool[*pick]).unwrap();
        }

        let renderer = CountingRenderer { inner: BarcodeRenderer::default(), calls: Cell::new(0) };
        let stamper = BarcodeStamper::with_synthesizer(StampOptions::default(), renderer);
        let report = stamper.stamp(&mut ws).unwrap();

        let mut distinct: Vec<usize> = picks.iter().copied().filter(|p| *p < 3).collect();
        let valid = distinct.len();
        distinct.sort_unstable();
        distinct.dedup();

        prop_assert_eq!(stamper.synthesizer().calls.get(), distinct.len());
        prop_assert_eq!(report.images_embedded, valid);
        prop_assert_eq!(report.cache_hits, valid - distinct.len());

        let rows: Vec<usize> = picks.iter().copied().filter(|p| *p < 3).collect();
        let pics = ws.pictures();
        for i in 0..pics.len() {
            for j in 0..pics.len() {
                prop_assert_eq!(rows[i] == rows[j], pics[i].data == pics[j].data);
            }
        }
    }
}
