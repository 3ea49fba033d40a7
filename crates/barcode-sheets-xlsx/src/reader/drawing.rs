//! DrawingML (`xl/drawings/drawingN.xml`) parsing

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// A picture anchor found in a drawing part, before its image is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PictureAnchor {
    /// 0-based anchor row
    pub row: u32,
    /// 0-based anchor column
    pub col: u16,
    /// Relationship id of the image (`r:embed`)
    pub embed: String,
    /// Extent in EMU, when the anchor states one
    pub extent: Option<(u64, u64)>,
}

#[derive(Default)]
struct AnchorState {
    row: Option<u32>,
    col: Option<u16>,
    embed: Option<String>,
    extent: Option<(u64, u64)>,
    has_pic: bool,
}

/// Collect every picture anchored in a drawing part.
///
/// Elements are matched by local name so the usual `xdr:`/`a:` prefixes and
/// unprefixed variants both work. Shapes, charts and group frames carry no
/// `pic` and are ignored.
pub(crate) fn parse_drawing<B: BufRead>(reader: B) -> XlsxResult<Vec<PictureAnchor>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut anchors = Vec::new();

    let mut current: Option<AnchorState> = None;
    let mut in_from = false;
    let mut in_from_col = false;
    let mut in_from_row = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"oneCellAnchor" | b"twoCellAnchor" | b"absoluteAnchor" => {
                    current = Some(AnchorState::default());
                }
                b"from" if current.is_some() => in_from = true,
                b"col" if in_from => in_from_col = true,
                b"row" if in_from => in_from_row = true,
                b"pic" => {
                    if let Some(state) = current.as_mut() {
                        state.has_pic = true;
                    }
                }
                b"blip" => {
                    if let Some(state) = current.as_mut() {
                        state.embed = state.embed.take().or_else(|| blip_embed(&e));
                    }
                }
                b"ext" => {
                    if let Some(state) = current.as_mut() {
                        state.extent = state.extent.or_else(|| extent_attrs(&e));
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"blip" => {
                    if let Some(state) = current.as_mut() {
                        state.embed = state.embed.take().or_else(|| blip_embed(&e));
                    }
                }
                b"ext" => {
                    if let Some(state) = current.as_mut() {
                        state.extent = state.extent.or_else(|| extent_attrs(&e));
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_from_col || in_from_row {
                    let text = e.unescape()?;
                    if let Some(state) = current.as_mut() {
                        if in_from_col {
                            state.col = text.trim().parse().ok();
                        } else {
                            state.row = text.trim().parse().ok();
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"col" => in_from_col = false,
                b"row" => in_from_row = false,
                b"from" => in_from = false,
                b"oneCellAnchor" | b"twoCellAnchor" | b"absoluteAnchor" => {
                    if let Some(state) = current.take() {
                        match (state.has_pic, state.embed) {
                            (true, Some(embed)) => anchors.push(PictureAnchor {
                                // absoluteAnchor has no cell; it lands on A1
                                row: state.row.unwrap_or(0),
                                col: state.col.unwrap_or(0),
                                embed,
                                extent: state.extent,
                            }),
                            (true, None) => {
                                log::warn!("Picture without an embedded image reference skipped");
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}

fn blip_embed(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"embed")
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn extent_attrs(e: &BytesStart<'_>) -> Option<(u64, u64)> {
    let mut cx = None;
    let mut cy = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"cx" => cx = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"cy" => cy = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    cx.zip(cy)
}
