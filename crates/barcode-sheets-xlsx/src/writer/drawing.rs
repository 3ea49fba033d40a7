//! DrawingML output: drawing parts, their relationships and `xl/media`

use ahash::AHashMap;
use barcode_sheets_core::{ImageFormat, Picture, Worksheet};

use crate::package::{NS_DRAWING, NS_DRAWING_MAIN, NS_PACKAGE_REL, NS_REL, REL_IMAGE};

/// One media part to be written under `xl/media/`
pub(crate) struct MediaPart<'a> {
    pub name: String,
    pub data: &'a [u8],
}

/// Workbook-wide media table.
///
/// Identical image bytes are stored once no matter how many pictures (or
/// sheets) show them.
#[derive(Default)]
pub(crate) struct MediaTable<'a> {
    parts: Vec<MediaPart<'a>>,
    by_content: AHashMap<&'a [u8], usize>,
}

impl<'a> MediaTable<'a> {
    /// Index of the media part holding `picture`'s bytes, adding it if new
    pub fn intern(&mut self, picture: &'a Picture) -> usize {
        let data: &'a [u8] = &picture.data;
        if let Some(&idx) = self.by_content.get(data) {
            return idx;
        }
        let idx = self.parts.len();
        self.parts.push(MediaPart {
            name: format!("image{}.{}", idx + 1, picture.format.extension()),
            data,
        });
        self.by_content.insert(data, idx);
        idx
    }

    pub fn parts(&self) -> &[MediaPart<'a>] {
        &self.parts
    }

    pub fn get(&self, idx: usize) -> Option<&MediaPart<'a>> {
        self.parts.get(idx)
    }
}

/// Drawing content for one worksheet
pub(crate) struct SheetDrawing {
    /// 1-based drawing part number (`xl/drawings/drawingN.xml`)
    pub number: usize,
    /// Drawing XML
    pub xml: String,
    /// Drawing relationships XML
    pub rels: String,
}

/// Formats referenced by a set of media parts, for `<Default>` content types
pub(crate) fn media_formats(media: &MediaTable<'_>) -> Vec<ImageFormat> {
    let mut formats: Vec<ImageFormat> = Vec::new();
    for part in media.parts() {
        if let Some(format) = ImageFormat::detect(part.data) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
    }
    formats
}

/// Build the drawing part for a sheet's pictures.
///
/// Every picture becomes a `oneCellAnchor`: its top-left corner sits on the
/// anchor cell and its size is the stored display size, so it does not
/// stretch with column widths or row heights.
pub(crate) fn build_sheet_drawing<'a>(
    sheet: &'a Worksheet,
    number: usize,
    media: &mut MediaTable<'a>,
) -> SheetDrawing {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="{}" xmlns:a="{}" xmlns:r="{}">"#,
        NS_DRAWING, NS_DRAWING_MAIN, NS_REL
    );

    // media index -> relationship number within this drawing
    let mut rel_ids: Vec<(usize, usize)> = Vec::new();

    for (i, picture) in sheet.pictures().iter().enumerate() {
        let media_idx = media.intern(picture);
        let rel_num = match rel_ids.iter().find(|(m, _)| *m == media_idx) {
            Some(&(_, n)) => n,
            None => {
                let n = rel_ids.len() + 1;
                rel_ids.push((media_idx, n));
                n
            }
        };

        let cx = picture.size.width_emu();
        let cy = picture.size.height_emu();
        xml.push_str(&format!(
            r#"
    <xdr:oneCellAnchor>
        <xdr:from><xdr:col>{col}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{row}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>
        <xdr:ext cx="{cx}" cy="{cy}"/>
        <xdr:pic>
            <xdr:nvPicPr><xdr:cNvPr id="{id}" name="Picture {num}"/><xdr:cNvPicPr/></xdr:nvPicPr>
            <xdr:blipFill><a:blip r:embed="rId{rel}"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>
            <xdr:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></xdr:spPr>
        </xdr:pic>
        <xdr:clientData/>
    </xdr:oneCellAnchor>"#,
            col = picture.col(),
            row = picture.row(),
            cx = cx,
            cy = cy,
            id = i + 2,
            num = i + 1,
            rel = rel_num,
        ));
    }
    xml.push_str("\n</xdr:wsDr>");

    let mut rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">"#,
        NS_PACKAGE_REL
    );
    for (media_idx, rel_num) in rel_ids {
        if let Some(part) = media.get(media_idx) {
            rels.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}" Target="../media/{}"/>"#,
                rel_num, REL_IMAGE, part.name
            ));
        }
    }
    rels.push_str("\n</Relationships>");

    SheetDrawing { number, xml, rels }
}
