// xmp.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! XMP metadata in GIF application extension blocks
use crate::block::{Application, Block};
use crate::decode::Blocks;
use crate::error::{Error, Result};
use std::io::Read;

/// Application identifier and auth code for XMP blocks
const XMP_APP_ID: &[u8; 11] = b"XMP DataXMP";

/// Length of the magic trailer
const TRAILER_LEN: usize = 256;

/// Get the magic trailer bytes: 0xFF down to 0x00.
///
/// The trailer makes naive sub-block readers skip the unpacketized XMP
/// payloads written by some tools without losing the stream position.
fn magic_trailer() -> [u8; TRAILER_LEN] {
    let mut trailer = [0; TRAILER_LEN];
    for (i, t) in trailer.iter_mut().enumerate() {
        *t = 0xFF - i as u8;
    }
    trailer
}

impl Application {
    /// Create an application block with embedded XMP metadata.
    ///
    /// The payload is the UTF-8 XML followed by the magic trailer, split
    /// into sub-blocks.
    pub fn with_xmp(xml: &str) -> Self {
        let mut app = Application::default();
        app.add_app_data(XMP_APP_ID);
        let mut payload = xml.as_bytes().to_vec();
        payload.extend_from_slice(&magic_trailer());
        for chunk in payload.chunks(255) {
            app.add_app_data(chunk);
        }
        app
    }

    /// Check if this is an XMP application block
    pub fn is_xmp(&self) -> bool {
        self.app_id() == XMP_APP_ID
    }

    /// Get embedded XMP metadata as an XML string.
    ///
    /// The payload must end with the magic trailer, which is stripped.
    pub fn xmp_xml(&self) -> Result<String> {
        let payload: Vec<u8> = match self.app_data().get(1..) {
            Some(blocks) => blocks.concat(),
            None => Vec::new(),
        };
        if payload.len() < TRAILER_LEN {
            return Err(Error::MalformedXmp("missing magic trailer"));
        }
        let xml_len = payload.len() - TRAILER_LEN;
        if payload[xml_len..] != magic_trailer() {
            return Err(Error::MalformedXmp("corrupt magic trailer"));
        }
        String::from_utf8(payload[..xml_len].to_vec())
            .map_err(|_| Error::MalformedXmp("XML is not valid UTF-8"))
    }
}

/// Read XMP metadata from the blocks of a GIF file.
///
/// Returns `Ok(None)` when no XMP block is present.
pub(crate) fn from_blocks<R: Read>(blocks: Blocks<R>) -> Result<Option<String>> {
    let mut xmp = None;
    for block in blocks {
        if let Block::Application(b) = block? {
            if b.is_xmp() {
                if xmp.is_some() {
                    return Err(Error::MultipleXmp);
                }
                xmp = Some(b.xmp_xml()?);
            }
        }
    }
    Ok(xmp)
}
