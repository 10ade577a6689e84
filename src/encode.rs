// encode.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! GIF file encoding
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw::Compressor;
use pix::el::Pixel;
use pix::rgb::{Rgb, SRgb8, SRgba8};
use pix::{Palette, Raster};
use std::io::Write;

/// Encoder for writing [Block]s into a GIF file.
///
/// Build with Encoder.[into_block_enc].
///
/// [Block]: ../block/enum.Block.html
/// [into_block_enc]: ../struct.Encoder.html#method.into_block_enc
pub struct BlockEnc<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new GIF block encoder.
    pub(crate) fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one [Block](block/enum.Block.html).
    pub fn encode<B>(&mut self, block: B) -> Result<()>
    where
        B: Into<Block>,
    {
        use crate::block::Block::*;
        let w = &mut self.writer;
        match block.into() {
            Header(b) => b.format(w),
            LogicalScreenDesc(b) => b.format(w),
            GlobalColorTable(b) => b.format(w),
            PlainText(b) => b.format(w),
            GraphicControl(b) => b.format(w),
            Comment(b) => b.format(w),
            Application(b) => b.format(w),
            Unknown(b) => b.format(w),
            ImageDesc(b) => b.format(w),
            LocalColorTable(b) => b.format(w),
            ImageData(b) => b.format(w),
            Trailer(b) => b.format(w),
        }
    }
}

impl Header {
    /// Format a header block
    fn format<W: Write>(self, w: &mut W) -> Result<()> {
        w.write_all(b"GIF")?;
        w.write_all(&self.version())?;
        Ok(())
    }
}

impl LogicalScreenDesc {
    /// Format a logical screen desc block
    fn format<W: Write>(self, w: &mut W) -> Result<()> {
        let width = self.screen_width();
        let height = self.screen_height();
        w.write_all(&[
            width as u8,
            (width >> 8) as u8,
            height as u8,
            (height >> 8) as u8,
            self.flags(),
            self.background_color_idx(),
            self.pixel_aspect_ratio(),
        ])?;
        Ok(())
    }
}

impl GlobalColorTable {
    /// Format a global color table block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(self.colors())?;
        Ok(())
    }
}

impl PlainText {
    /// Format a plain text extension block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::PlainText_.into()])?;
        for b in self.sub_blocks() {
            debug_assert!(!b.is_empty() && b.len() < 256);
            let len = b.len() as u8;
            w.write_all(&[len])?; // sub-block size
            w.write_all(b)?;
        }
        w.write_all(&[0])?; // final sub-block size
        Ok(())
    }
}

impl GraphicControl {
    /// Format a graphic control extension block
    fn format<W: Write>(self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        let delay = self.delay_time_cs();
        w.write_all(&[
            ExtensionCode::GraphicControl_.into(),
            4, // block size
            self.flags(),
            delay as u8,
            (delay >> 8) as u8,
            self.transparent_color_idx(),
            0, // block size
        ])?;
        Ok(())
    }
}

impl Comment {
    /// Format a comment extension block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Comment_.into()])?;
        for c in self.comments() {
            debug_assert!(!c.is_empty() && c.len() < 256);
            let len = c.len() as u8;
            w.write_all(&[len])?; // sub-block size
            w.write_all(c)?;
        }
        w.write_all(&[0])?; // final sub-block size
        Ok(())
    }
}

impl Application {
    /// Format an application extension block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(&[ExtensionCode::Application_.into()])?;
        for c in self.app_data() {
            debug_assert!(!c.is_empty() && c.len() < 256);
            let len = c.len() as u8;
            w.write_all(&[len])?; // sub-block size
            w.write_all(c)?;
        }
        w.write_all(&[0])?; // final sub-block size
        Ok(())
    }
}

impl Unknown {
    /// Format an unknown extension block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Extension_.signature())?;
        w.write_all(self.ext_id())?;
        for c in self.sub_blocks() {
            debug_assert!(!c.is_empty() && c.len() < 256);
            let len = c.len() as u8;
            w.write_all(&[len])?; // sub-block size
            w.write_all(c)?;
        }
        w.write_all(&[0])?; // final sub-block size
        Ok(())
    }
}

impl ImageDesc {
    /// Format an image desc block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::ImageDesc_.signature())?;
        let left = self.left();
        let top = self.top();
        let width = self.width();
        let height = self.height();
        w.write_all(&[
            left as u8,
            (left >> 8) as u8,
            top as u8,
            (top >> 8) as u8,
            width as u8,
            (width >> 8) as u8,
            height as u8,
            (height >> 8) as u8,
            self.flags(),
        ])?;
        Ok(())
    }
}

impl LocalColorTable {
    /// Format a local color table block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(self.colors())?;
        Ok(())
    }
}

impl ImageData {
    /// Format an image data block
    fn format<W: Write>(&self, w: &mut W) -> Result<()> {
        let min_code_size = self.min_code_size();
        w.write_all(&[min_code_size])?;
        let mut buffer = Vec::with_capacity(self.data().len());
        let mut compressor = Compressor::new(min_code_size)?;
        compressor.compress(self.data(), &mut buffer);
        // split buffer into sub-blocks
        for chunk in buffer.chunks(255) {
            let len = chunk.len() as u8;
            w.write_all(&[len])?; // sub-block size
            w.write_all(chunk)?;
        }
        w.write_all(&[0])?; // final sub-block size
        Ok(())
    }
}

impl Trailer {
    /// Format a trailer block
    fn format<W: Write>(self, w: &mut W) -> Result<()> {
        w.write_all(BlockCode::Trailer_.signature())?;
        Ok(())
    }
}

/// Encoder for writing [Frame]s into a GIF file.
///
/// Build with Encoder.[into_frame_enc].
///
/// [Frame]: ../block/struct.Frame.html
/// [into_frame_enc]: ../struct.Encoder.html#method.into_frame_enc
pub struct FrameEnc<W: Write> {
    /// Block encoder
    block_enc: BlockEnc<W>,
    /// Has preamble been encoded?
    has_preamble: bool,
    /// Has trailer been encoded?
    has_trailer: bool,
}

impl<W: Write> FrameEnc<W> {
    /// Create a new GIF frame encoder.
    pub(crate) fn new(block_enc: BlockEnc<W>) -> Self {
        FrameEnc {
            block_enc,
            has_preamble: false,
            has_trailer: false,
        }
    }

    /// Encode the GIF preamble blocks.
    ///
    /// Must be called only once, before [encode_frame].
    ///
    /// [encode_frame]: struct.FrameEnc.html#method.encode_frame
    pub fn encode_preamble(&mut self, preamble: &Preamble) -> Result<()> {
        if self.has_preamble {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(preamble.header)?;
        self.block_enc.encode(preamble.logical_screen_desc)?;
        if let Some(tbl) = &preamble.global_color_table {
            self.block_enc.encode(tbl.clone())?;
        }
        if let Some(cnt) = &preamble.loop_count_ext {
            self.block_enc.encode(cnt.clone())?;
        }
        for comment in &preamble.comments {
            self.block_enc.encode(comment.clone())?;
        }
        self.has_preamble = true;
        Ok(())
    }

    /// Encode one `Frame` of a GIF file.
    ///
    /// Must be called after [encode_preamble].
    ///
    /// [encode_preamble]: struct.FrameEnc.html#method.encode_preamble
    pub fn encode_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.has_trailer || !self.has_preamble {
            return Err(Error::InvalidBlockSequence);
        }
        if let Some(ctrl) = &frame.graphic_control_ext {
            self.block_enc.encode(*ctrl)?;
        }
        self.block_enc.encode(frame.image_desc)?;
        if let Some(tbl) = &frame.local_color_table {
            self.block_enc.encode(tbl.clone())?;
        }
        self.block_enc.encode(frame.image_data.clone())?;
        Ok(())
    }

    /// Encode the [Trailer] of a GIF file.
    ///
    /// Must be called last, after all `Frame`s have been encoded with
    /// [encode_frame].
    ///
    /// [encode_frame]: struct.FrameEnc.html#method.encode_frame
    /// [Trailer]: block/struct.Trailer.html
    pub fn encode_trailer(&mut self) -> Result<()> {
        if self.has_trailer || !self.has_preamble {
            return Err(Error::InvalidBlockSequence);
        }
        self.block_enc.encode(Trailer::default())?;
        self.has_trailer = true;
        Ok(())
    }
}

/// Builder of color palettes for raster encoding.
///
/// The encoder asks for an exact palette first and falls back to a
/// quantized one when the raster has too many distinct colors.
pub trait PaletteSource {
    /// Build a palette of every distinct color in a raster.
    ///
    /// Returns `None` when the raster has more than `max_colors` distinct
    /// colors.
    fn exact_palette(
        &self,
        raster: &Raster<SRgba8>,
        max_colors: usize,
    ) -> Option<Palette>;

    /// Build a reduced palette of at most `max_colors` colors.
    ///
    /// Returns `None` when quantization is not supported.
    fn quantized_palette(
        &self,
        raster: &Raster<SRgba8>,
        max_colors: usize,
    ) -> Option<Palette>;
}

/// Default [PaletteSource] with no quantization support.
///
/// [PaletteSource]: trait.PaletteSource.html
#[derive(Debug, Default)]
pub struct ExactPaletteSource;

impl PaletteSource for ExactPaletteSource {
    fn exact_palette(
        &self,
        raster: &Raster<SRgba8>,
        max_colors: usize,
    ) -> Option<Palette> {
        let mut palette = Palette::new(max_colors);
        for p in raster.pixels() {
            // transparent pixels map to the reserved entry
            if u8::from((*p).alpha()) < 0xFF {
                continue;
            }
            palette.set_entry(rgb_entry(*p))?;
        }
        Some(palette)
    }

    fn quantized_palette(
        &self,
        _raster: &Raster<SRgba8>,
        _max_colors: usize,
    ) -> Option<Palette> {
        None
    }
}

/// Get the opaque palette entry for a pixel
fn rgb_entry(p: SRgba8) -> SRgb8 {
    SRgb8::new(
        u8::from(Rgb::red(p)),
        u8::from(Rgb::green(p)),
        u8::from(Rgb::blue(p)),
    )
}

/// Make color table bytes from a palette, zero-padded to the table size
fn make_color_table(palette: &Palette, cfg: &ColorTableConfig) -> Vec<u8> {
    let mut tbl = Vec::with_capacity(cfg.size_bytes());
    for clr in palette.colors() {
        tbl.push(u8::from(Rgb::red(*clr)));
        tbl.push(u8::from(Rgb::green(*clr)));
        tbl.push(u8::from(Rgb::blue(*clr)));
    }
    while tbl.len() < cfg.size_bytes() {
        tbl.push(0);
    }
    tbl
}

/// Encoder for writing a `Raster` as a single-frame GIF file.
///
/// Build with Encoder.[into_raster_enc].
///
/// [into_raster_enc]: ../struct.Encoder.html#method.into_raster_enc
pub struct RasterEnc<W: Write> {
    /// Block encoder
    block_enc: BlockEnc<W>,
    /// Palette source for building the color table
    palette_source: Box<dyn PaletteSource>,
    /// XMP metadata, as an XML string
    xmp: Option<String>,
}

impl<W: Write> RasterEnc<W> {
    /// Create a new GIF raster encoder.
    pub(crate) fn new(block_enc: BlockEnc<W>) -> Self {
        RasterEnc {
            block_enc,
            palette_source: Box::new(ExactPaletteSource),
            xmp: None,
        }
    }

    /// Set the palette source used to build the color table.
    pub fn with_palette_source<P>(mut self, source: P) -> Self
    where
        P: PaletteSource + 'static,
    {
        self.palette_source = Box::new(source);
        self
    }

    /// Set XMP metadata to embed as an application extension.
    pub fn with_xmp(mut self, xml: &str) -> Self {
        self.xmp = Some(xml.to_string());
        self
    }

    /// Encode one `Raster` to a GIF file.
    ///
    /// Pixels with alpha below full opacity are written as the transparent
    /// color.
    pub fn encode_raster(&mut self, raster: &Raster<SRgba8>) -> Result<()> {
        let width = u16::try_from(raster.width())?;
        let height = u16::try_from(raster.height())?;
        let has_alpha = raster
            .pixels()
            .iter()
            .any(|p| u8::from((*p).alpha()) < 0xFF);
        // reserve one entry for the transparent color
        let max_colors = if has_alpha { 255 } else { 256 };
        let mut palette = self.make_palette(raster, max_colors)?;
        let data = index_pixels(raster, &mut palette, has_alpha, max_colors)?;
        let palette_sz = palette.len() + has_alpha as usize;
        let tbl_cfg = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            palette_sz as u16,
        );
        let scale = tbl_cfg.len_bits();
        self.block_enc.encode(Header::default())?;
        self.block_enc.encode(
            LogicalScreenDesc::default()
                .with_screen_width(width)
                .with_screen_height(height)
                .with_flags((scale & 0x07) << 4),
        )?;
        let mut control = GraphicControl::default();
        if has_alpha {
            control.set_transparent_color(Some(palette.len() as u8));
        }
        self.block_enc.encode(control)?;
        if let Some(xml) = &self.xmp {
            self.block_enc.encode(Application::with_xmp(xml))?;
        }
        self.block_enc.encode(
            ImageDesc::default()
                .with_width(width)
                .with_height(height)
                .with_color_table_config(&tbl_cfg),
        )?;
        self.block_enc.encode(LocalColorTable::with_colors(
            &make_color_table(&palette, &tbl_cfg),
        ))?;
        let mut image_data = ImageData::new(data.len(), (scale + 1).max(2));
        image_data.add_data(&data);
        self.block_enc.encode(image_data)?;
        self.block_enc.encode(Trailer::default())
    }

    /// Make a palette for a raster
    fn make_palette(
        &self,
        raster: &Raster<SRgba8>,
        max_colors: usize,
    ) -> Result<Palette> {
        match self.palette_source.exact_palette(raster, max_colors) {
            Some(palette) => {
                debug!("exact palette: {} colors", palette.len());
                Ok(palette)
            }
            None => {
                match self.palette_source.quantized_palette(raster, max_colors)
                {
                    Some(palette) => {
                        debug!("quantized palette: {} colors", palette.len());
                        Ok(palette)
                    }
                    None => Err(Error::TooManyColors(max_colors)),
                }
            }
        }
    }
}

/// Map raster pixels to color indices.
///
/// Pixels with alpha below full opacity map to the entry just past the end
/// of the palette.
fn index_pixels(
    raster: &Raster<SRgba8>,
    palette: &mut Palette,
    has_alpha: bool,
    max_colors: usize,
) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(raster.pixels().len());
    let mut transparent = Vec::new();
    for (i, p) in raster.pixels().iter().enumerate() {
        if has_alpha && u8::from((*p).alpha()) < 0xFF {
            data.push(0);
            transparent.push(i);
        } else {
            match palette.set_entry(rgb_entry(*p)) {
                Some(idx) => data.push(idx as u8),
                None => return Err(Error::TooManyColors(max_colors)),
            }
        }
    }
    // the transparent entry comes just past the final palette length
    let transparent_idx = palette.len() as u8;
    for i in transparent {
        data[i] = transparent_idx;
    }
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Decoder, Encoder};

    fn check_encode(raster: &Raster<SRgba8>, expected: &[u8]) {
        let mut bytes = vec![];
        Encoder::new_unbuffered(&mut bytes)
            .into_raster_enc()
            .encode_raster(raster)
            .unwrap();
        assert_eq!(&bytes[..], expected);
    }

    #[test]
    fn enc_1x1_red() {
        let mut raster = Raster::with_clear(1, 1);
        *raster.pixel_mut(0, 0) = SRgba8::new(0xFF, 0, 0, 0xFF);
        check_encode(
            &raster,
            &[
                0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
                0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // screen desc
                0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, // control
                0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x80,
                0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, // local color table
                0x02, 0x02, 0x44, 0x01, 0x00, // image data
                0x3B, // trailer
            ],
        );
    }

    fn decode_first(gif: &[u8]) -> Raster<SRgba8> {
        Decoder::new(gif).into_rasters().next().unwrap().unwrap()
    }

    #[test]
    fn round_trip_opaque() {
        let mut raster = Raster::with_clear(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                *raster.pixel_mut(x, y) = match (x + y) % 3 {
                    0 => SRgba8::new(0xFF, 0, 0, 0xFF),
                    1 => SRgba8::new(0, 0xFF, 0, 0xFF),
                    _ => SRgba8::new(0, 0, 0xFF, 0xFF),
                };
            }
        }
        let mut bytes = vec![];
        Encoder::new_unbuffered(&mut bytes)
            .into_raster_enc()
            .encode_raster(&raster)
            .unwrap();
        let decoded = decode_first(&bytes);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(decoded.pixel(x, y), raster.pixel(x, y));
            }
        }
    }

    #[test]
    fn round_trip_transparent() {
        let mut raster = Raster::with_clear(2, 2);
        *raster.pixel_mut(0, 0) = SRgba8::new(0xFF, 0, 0, 0xFF);
        *raster.pixel_mut(1, 0) = SRgba8::new(0, 0xFF, 0, 0xFF);
        *raster.pixel_mut(0, 1) = SRgba8::new(0x80, 0x80, 0x80, 0x7F);
        *raster.pixel_mut(1, 1) = SRgba8::new(0xFF, 0, 0, 0xFF);
        let mut bytes = vec![];
        Encoder::new_unbuffered(&mut bytes)
            .into_raster_enc()
            .encode_raster(&raster)
            .unwrap();
        let decoded = decode_first(&bytes);
        assert_eq!(decoded.pixel(0, 0), SRgba8::new(0xFF, 0, 0, 0xFF));
        assert_eq!(decoded.pixel(1, 0), SRgba8::new(0, 0xFF, 0, 0xFF));
        assert_eq!(decoded.pixel(0, 1), SRgba8::new(0, 0, 0, 0));
        assert_eq!(decoded.pixel(1, 1), SRgba8::new(0xFF, 0, 0, 0xFF));
    }

    #[test]
    fn too_many_colors() {
        let mut raster = Raster::with_clear(257, 1);
        for x in 0..257 {
            *raster.pixel_mut(x, 0) =
                SRgba8::new((x % 256) as u8, (x / 256) as u8, 0, 0xFF);
        }
        let mut bytes = vec![];
        let res = Encoder::new_unbuffered(&mut bytes)
            .into_raster_enc()
            .encode_raster(&raster);
        assert!(matches!(res, Err(Error::TooManyColors(256))));
    }

    #[test]
    fn exact_palette_limit() {
        let mut raster = Raster::with_clear(4, 1);
        for x in 0..4 {
            *raster.pixel_mut(x, 0) = SRgba8::new(x as u8, 0, 0, 0xFF);
        }
        let source = ExactPaletteSource;
        assert!(source.exact_palette(&raster, 3).is_none());
        let palette = source.exact_palette(&raster, 4).unwrap();
        assert_eq!(palette.len(), 4);
    }

    #[test]
    fn re_encode_decoded() {
        // decode, re-encode, decode again: pixels must be unchanged
        let gif: &[u8] = &[
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00,
            0x91, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00,
            0x00, 0xFF, 0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00,
            0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A,
            0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA, 0xA8,
            0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00, 0x3B,
        ];
        let first = decode_first(gif);
        let mut bytes = vec![];
        Encoder::new_unbuffered(&mut bytes)
            .into_raster_enc()
            .encode_raster(&first)
            .unwrap();
        let second = decode_first(&bytes);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(second.pixel(x, y), first.pixel(x, y));
            }
        }
    }

    #[test]
    fn frame_enc_round_trip() {
        let g_tbl = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            2,
        );
        let preamble = Preamble {
            logical_screen_desc: LogicalScreenDesc::default()
                .with_screen_width(4)
                .with_screen_height(4)
                .with_color_table_config(&g_tbl),
            global_color_table: Some(GlobalColorTable::with_colors(&[
                0, 0, 0, 0xFF, 0xFF, 0xFF,
            ])),
            ..Preamble::default()
        };
        let image = [1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1];
        let mut image_data = ImageData::new(16, 2);
        image_data.add_data(&image);
        let frame = Frame::new(
            None,
            ImageDesc::default().with_width(4).with_height(4),
            None,
            image_data,
        );
        let mut bytes = vec![];
        let mut enc = Encoder::new_unbuffered(&mut bytes).into_frame_enc();
        enc.encode_preamble(&preamble).unwrap();
        enc.encode_frame(&frame).unwrap();
        enc.encode_trailer().unwrap();
        let decoded = Decoder::new(&bytes[..])
            .into_frames()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(decoded.image_data.data(), &image[..]);
    }

    #[test]
    fn frame_enc_sequence() {
        let mut enc = Encoder::new_unbuffered(vec![]).into_frame_enc();
        assert!(matches!(
            enc.encode_trailer(),
            Err(Error::InvalidBlockSequence)
        ));
    }
}
