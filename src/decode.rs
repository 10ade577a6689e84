// decode.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! GIF file decoding
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw::Decompressor;
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::{ErrorKind, Read};

/// Buffer size (must be at least as large as a color table with 256 entries)
const BUF_SZ: usize = 1024;

/// Block decoder: an `Iterator` for every [Block] in a GIF file.
///
/// Build with Decoder.[into_blocks].
///
/// [Block]: block/enum.Block.html
/// [into_blocks]: struct.Decoder.html#method.into_blocks
pub struct Blocks<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Stop before decompressing image data?
    stop_before_image_data: bool,
    /// Block buffer
    buffer: Vec<u8>,
    /// Next expected block code and size
    expected_next: Option<(BlockCode, usize)>,
    /// Image size of the current frame, in pixels
    image_sz: usize,
    /// Accumulated compressed data for the current frame
    compressed: Vec<u8>,
    /// Flag when trailer block has been decoded
    done: bool,
}

impl<R: Read> Iterator for Blocks<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            self.done = false;
            None
        } else {
            let res = self.next_block();
            if let Ok(Block::Trailer(_)) = res {
                self.done = true;
            }
            Some(res)
        }
    }
}

impl<R: Read> Blocks<R> {
    /// Create a new block decoder
    pub(crate) fn new(
        reader: R,
        max_image_sz: Option<usize>,
        stop_before_image_data: bool,
    ) -> Self {
        use self::BlockCode::Header_;
        Blocks {
            reader,
            max_image_sz,
            stop_before_image_data,
            buffer: Vec::with_capacity(BUF_SZ),
            expected_next: Some((Header_, Header_.size())),
            image_sz: 0,
            compressed: Vec::new(),
            done: false,
        }
    }

    /// Examine buffer for block code and size
    fn examine_buffer(&mut self) -> Result<(BlockCode, usize)> {
        let bc_sz = self.expected_next.take().or_else(|| {
            self.buffer
                .first()
                .and_then(|t| BlockCode::from_u8(*t))
                .map(|b| (b, b.size()))
        });
        match bc_sz {
            Some(b) => {
                self.expected_next = self.expected(b.0);
                Ok(b)
            }
            None => match self.buffer.first() {
                Some(t) => Err(Error::UnknownBlockCode(*t)),
                None => Err(Error::UnexpectedEndOfFile("block code")),
            },
        }
    }

    /// Get next expected block code and size
    fn expected(&self, bc: BlockCode) -> Option<(BlockCode, usize)> {
        use crate::block::BlockCode::*;
        let buf = &self.buffer[..];
        match bc {
            Header_ => {
                let sz = LogicalScreenDesc_.size();
                Some((LogicalScreenDesc_, sz))
            }
            LogicalScreenDesc_ => {
                let sz = LogicalScreenDesc_.size();
                if buf.len() >= sz {
                    if let Ok(b) = LogicalScreenDesc::from_buf(&buf[..sz]) {
                        let sz = b.color_table_config().size_bytes();
                        if sz > 0 {
                            return Some((GlobalColorTable_, sz));
                        }
                    }
                }
                None
            }
            ImageDesc_ => {
                let sz = ImageDesc_.size();
                if buf.len() >= sz {
                    if let Ok(b) = ImageDesc::from_buf(&buf[..sz]) {
                        let sz = b.color_table_config().size_bytes();
                        if sz > 0 {
                            return Some((LocalColorTable_, sz));
                        } else {
                            return Some((ImageData_, ImageData_.size()));
                        }
                    }
                }
                None
            }
            LocalColorTable_ => Some((ImageData_, ImageData_.size())),
            Trailer_ => Some((Header_, Header_.size())),
            _ => None,
        }
    }

    /// Decode the next block (including all sub-blocks)
    fn next_block(&mut self) -> Result<Block> {
        self.fill_buffer()?;
        if self.expected_next.is_none() {
            self.skip_pad_bytes()?;
        }
        let (bc, sz) = self.examine_buffer()?;
        let mut block = self.decode_block(bc, sz)?;
        if block.has_sub_blocks() {
            while self.decode_sub_block(&mut block)? {}
        }
        self.check_block_end(&mut block)?;
        Ok(block)
    }

    /// Skip stray pad bytes between blocks (found in known-broken files)
    fn skip_pad_bytes(&mut self) -> Result<()> {
        while self.buffer.first() == Some(&0) {
            debug!("stray pad byte ignored");
            self.buffer.drain(..1);
            if self.buffer.is_empty() {
                self.fill_buffer()?;
                if self.buffer.is_empty() {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Check end of block (after sub-blocks)
    fn check_block_end(&mut self, block: &mut Block) -> Result<()> {
        if let Block::ImageData(b) = block {
            if !self.stop_before_image_data {
                let mut dec = Decompressor::new(b.min_code_size())?;
                let mut image = Vec::with_capacity(self.image_sz);
                dec.decompress(&self.compressed, &mut image, self.image_sz)?;
                if image.len() < self.image_sz && !dec.has_ended() {
                    self.compressed.clear();
                    return Err(Error::InvalidLzwData(
                        "compressed data ended early",
                    ));
                }
                b.add_data(&image);
            }
            self.compressed.clear();
        }
        Ok(())
    }

    /// Fill the buffer from reader
    fn fill_buffer(&mut self) -> Result<()> {
        let mut len = self.buffer.len();
        self.buffer.resize(BUF_SZ, 0);
        while len < BUF_SZ {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(0) => break, // EOF
                Ok(n) => len += n,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.buffer.resize(len, 0);
        Ok(())
    }

    /// Decode one block
    fn decode_block(&mut self, bc: BlockCode, sz: usize) -> Result<Block> {
        let len = self.buffer.len();
        if len >= sz {
            debug!("  block  : {:?} {:?}", bc, sz);
            let block = self.parse_block(bc, sz)?;
            self.buffer.drain(..sz);
            self.check_block_start(&block)?;
            Ok(block)
        } else {
            Err(Error::UnexpectedEndOfFile(bc.context()))
        }
    }

    /// Parse a block in the buffer
    fn parse_block(&self, bc: BlockCode, sz: usize) -> Result<Block> {
        use crate::block::BlockCode::*;
        let buf = &self.buffer[..sz];
        Ok(match bc {
            Header_ => Header::from_buf(buf)?.into(),
            LogicalScreenDesc_ => LogicalScreenDesc::from_buf(buf)?.into(),
            GlobalColorTable_ => GlobalColorTable::from_buf(buf).into(),
            Extension_ => Block::parse_extension(buf),
            ImageDesc_ => ImageDesc::from_buf(buf)?.into(),
            LocalColorTable_ => LocalColorTable::from_buf(buf).into(),
            ImageData_ => ImageData::from_buf(self.image_sz, buf).into(),
            Trailer_ => Trailer::default().into(),
        })
    }

    /// Check start of block (before sub-blocks)
    fn check_block_start(&mut self, block: &Block) -> Result<()> {
        if let Block::ImageDesc(b) = block {
            self.image_sz = b.image_sz();
            if let Some(max) = self.max_image_sz {
                if self.image_sz > max {
                    return Err(Error::TooLargeImage {
                        size: self.image_sz,
                        max,
                    });
                }
            }
        }
        Ok(())
    }

    /// Decode one sub-block
    fn decode_sub_block(&mut self, block: &mut Block) -> Result<bool> {
        self.fill_buffer()?;
        let len = self.buffer.len();
        if len > 0 {
            let sz = self.buffer[0] as usize;
            if len > sz {
                let bsz = sz + 1;
                if sz > 0 {
                    debug!("sub-block: {:?} {:?}", bsz, sz);
                    self.parse_sub_block(block, bsz)?;
                }
                self.buffer.drain(..bsz);
                return Ok(sz > 0);
            }
        }
        Err(Error::UnexpectedEndOfFile("sub-block"))
    }

    /// Parse a sub-block in the buffer
    fn parse_sub_block(&mut self, block: &mut Block, sz: usize) -> Result<()> {
        assert!(sz <= 256);
        use crate::block::Block::*;
        match block {
            PlainText(b) => b.parse_buf(&self.buffer[1..sz]),
            GraphicControl(b) => b.parse_buf(&self.buffer[1..sz])?,
            Comment(b) => b.parse_buf(&self.buffer[1..sz]),
            Application(b) => b.parse_buf(&self.buffer[1..sz]),
            Unknown(b) => b.parse_buf(&self.buffer[1..sz]),
            ImageData(_) => {
                if !self.stop_before_image_data {
                    self.compressed.extend_from_slice(&self.buffer[1..sz]);
                }
            }
            _ => panic!("Invalid state in parse_sub_block!"),
        }
        Ok(())
    }
}

impl Header {
    /// Decode a Header block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), BlockCode::Header_.size());
        if &buf[..3] == b"GIF" {
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header::with_version(version)),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        } else {
            Err(Error::MalformedHeader("missing GIF signature"))
        }
    }
}

impl LogicalScreenDesc {
    /// Decode a Logical Screen Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), BlockCode::LogicalScreenDesc_.size());
        let width = (buf[1] as u16) << 8 | buf[0] as u16;
        let height = (buf[3] as u16) << 8 | buf[2] as u16;
        let flags = buf[4];
        let bg_color = buf[5];
        let aspect = buf[6];
        Ok(LogicalScreenDesc::default()
            .with_screen_width(width)
            .with_screen_height(height)
            .with_flags(flags)
            .with_background_color_idx(bg_color)
            .with_pixel_aspect_ratio(aspect))
    }
}

impl GlobalColorTable {
    /// Decode a Global Color Table block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        Self::with_colors(buf)
    }
}

impl ImageDesc {
    /// Decode an Image Descriptor block from a buffer
    fn from_buf(buf: &[u8]) -> Result<Self> {
        assert_eq!(buf.len(), BlockCode::ImageDesc_.size());
        let left = (buf[2] as u16) << 8 | buf[1] as u16;
        let top = (buf[4] as u16) << 8 | buf[3] as u16;
        let width = (buf[6] as u16) << 8 | buf[5] as u16;
        let height = (buf[8] as u16) << 8 | buf[7] as u16;
        let flags = buf[9];
        Ok(Self::default()
            .with_left(left)
            .with_top(top)
            .with_width(width)
            .with_height(height)
            .with_flags(flags))
    }
}

impl LocalColorTable {
    /// Decode a Local Color Table block from a buffer
    fn from_buf(buf: &[u8]) -> Self {
        Self::with_colors(buf)
    }
}

impl ImageData {
    /// Decode an Image Data block from a buffer.
    ///
    /// The minimum code size is stored as read; it is validated when the
    /// compressed data is decoded.
    fn from_buf(image_sz: usize, buf: &[u8]) -> Self {
        assert_eq!(buf.len(), BlockCode::ImageData_.size());
        Self::new(image_sz, buf[0])
    }
}

impl Block {
    /// Parse an extension block
    fn parse_extension(buf: &[u8]) -> Self {
        use crate::block::ExtensionCode::*;
        assert_eq!(buf.len(), BlockCode::Extension_.size());
        let et: ExtensionCode = buf[1].into();
        match et {
            PlainText_ => PlainText::default().into(),
            GraphicControl_ => GraphicControl::default().into(),
            Comment_ => Comment::default().into(),
            Application_ => Application::default().into(),
            Unknown_(n) => Unknown::new(n).into(),
        }
    }
}

impl PlainText {
    /// Parse a Plain Text extension block
    fn parse_buf(&mut self, buf: &[u8]) {
        self.add_sub_block(buf);
    }
}

impl GraphicControl {
    /// Parse a Graphic Control extension block
    fn parse_buf(&mut self, buf: &[u8]) -> Result<()> {
        if buf.len() == 4 {
            self.set_flags(buf[0]);
            let delay = (buf[2] as u16) << 8 | buf[1] as u16;
            self.set_delay_time_cs(delay);
            self.set_transparent_color_idx(buf[3]);
            Ok(())
        } else {
            Err(Error::MalformedGraphicControlExtension)
        }
    }
}

impl Comment {
    /// Parse a Comment extension block
    fn parse_buf(&mut self, buf: &[u8]) {
        self.add_comment(buf);
    }
}

impl Application {
    /// Parse an Application extension block
    fn parse_buf(&mut self, buf: &[u8]) {
        self.add_app_data(buf);
    }
}

impl Unknown {
    /// Create a new Unknown extension block
    fn new(ext_id: u8) -> Self {
        let mut b = Unknown::default();
        b.add_sub_block(&[ext_id]);
        b
    }

    /// Parse an Unknown extension block
    fn parse_buf(&mut self, buf: &[u8]) {
        self.add_sub_block(buf);
    }
}

/// Frame decoder: an `Iterator` for [Frame]s within a GIF file.
///
/// Build with Decoder.[into_frames].
///
/// [Frame]: block/struct.Frame.html
/// [into_frames]: struct.Decoder.html#method.into_frames
pub struct Frames<R: Read> {
    /// Block decoder
    blocks: Blocks<R>,
    /// Preamble blocks
    preamble: Option<Preamble>,
    /// Graphic control for the next frame
    graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor for the next frame
    image_desc: Option<ImageDesc>,
    /// Local color table for the next frame
    local_color_table: Option<LocalColorTable>,
}

impl<R: Read> Iterator for Frames<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(block) = self.blocks.next() {
            match block {
                Ok(b) => match self.handle_block(b) {
                    Ok(Some(f)) => return Some(Ok(f)), // transpose
                    Ok(None) => {}                     // need more blocks
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl<R: Read> Frames<R> {
    /// Create a new frame decoder
    pub(crate) fn new(blocks: Blocks<R>) -> Self {
        Frames {
            blocks,
            preamble: None,
            graphic_control_ext: None,
            image_desc: None,
            local_color_table: None,
        }
    }

    /// Read preamble blocks.  These are the blocks at the beginning of the
    /// file, before any frame blocks.
    pub fn preamble(&mut self) -> Result<Option<Preamble>> {
        if self.has_frame() {
            return Ok(None);
        }
        self.preamble = Some(Preamble::default());
        while let Some(block) = self.blocks.next() {
            self.handle_block(block?)?;
            if self.has_frame() {
                break;
            }
        }
        Ok(self.preamble.take())
    }

    /// Check if any frame blocks exist
    fn has_frame(&self) -> bool {
        self.graphic_control_ext.is_some()
            || self.image_desc.is_some()
            || self.local_color_table.is_some()
    }

    /// Handle one block
    fn handle_block(&mut self, block: Block) -> Result<Option<Frame>> {
        match block {
            Block::Header(b) => {
                if let Some(f) = &mut self.preamble {
                    f.header = b;
                }
            }
            Block::LogicalScreenDesc(b) => {
                if let Some(f) = &mut self.preamble {
                    f.logical_screen_desc = b;
                }
            }
            Block::GlobalColorTable(b) => {
                if let Some(f) = &mut self.preamble {
                    f.global_color_table = Some(b);
                }
            }
            Block::Application(b) => {
                if let (Some(f), Some(_)) = (&mut self.preamble, b.loop_count())
                {
                    f.loop_count_ext = Some(b);
                }
            }
            Block::Comment(b) => {
                if let Some(f) = &mut self.preamble {
                    f.comments.push(b);
                }
            }
            Block::GraphicControl(b) => {
                if self.has_frame() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.graphic_control_ext = Some(b);
            }
            Block::ImageDesc(b) => {
                if self.image_desc.is_some() {
                    return Err(Error::InvalidBlockSequence);
                }
                self.image_desc = Some(b);
            }
            Block::LocalColorTable(b) => {
                self.local_color_table = Some(b);
            }
            Block::ImageData(image_data) => {
                let graphic_control_ext = self.graphic_control_ext.take();
                let image_desc = self.image_desc.take();
                let local_color_table = self.local_color_table.take();
                match image_desc {
                    Some(image_desc) => {
                        return Ok(Some(Frame::new(
                            graphic_control_ext,
                            image_desc,
                            local_color_table,
                            image_data,
                        )));
                    }
                    None => return Err(Error::InvalidBlockSequence),
                }
            }
            _ => {}
        }
        Ok(None)
    }
}

/// Raster decoder: an `Iterator` of one `Raster` per frame of a GIF file.
///
/// The whole file is decoded before the first raster is returned, so that
/// graphic control extensions can be checked against the frame count.
///
/// Build with Decoder.[into_rasters].
///
/// [into_rasters]: struct.Decoder.html#method.into_rasters
pub struct Rasters<R: Read> {
    /// Frame decoder
    frames: Frames<R>,
    /// Preamble blocks
    preamble: Option<Preamble>,
    /// Decoded frames, in file order
    decoded: Option<std::vec::IntoIter<Frame>>,
    /// Flag when decoding has failed
    failed: bool,
}

impl<R: Read> Iterator for Rasters<R> {
    type Item = Result<Raster<SRgba8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.decoded.is_none() {
            if let Err(e) = self.decode_frames() {
                self.failed = true;
                return Some(Err(e));
            }
        }
        let frame = self.decoded.as_mut()?.next()?;
        Some(self.make_raster(&frame))
    }
}

impl<R: Read> Rasters<R> {
    /// Create a new raster decoder
    pub(crate) fn new(frames: Frames<R>) -> Self {
        Rasters {
            frames,
            preamble: None,
            decoded: None,
            failed: false,
        }
    }

    /// Decode every frame in the file
    fn decode_frames(&mut self) -> Result<()> {
        self.preamble = Some(self.frames.preamble()?.unwrap_or_default());
        let frames = (&mut self.frames).collect::<Result<Vec<_>>>()?;
        check_control_count(&frames)?;
        self.decoded = Some(frames.into_iter());
        Ok(())
    }

    /// Make a raster from one frame
    fn make_raster(&self, frame: &Frame) -> Result<Raster<SRgba8>> {
        let global_tbl = self
            .preamble
            .as_ref()
            .and_then(|p| p.global_color_table.as_ref());
        raster_from_frame(frame, global_tbl)
    }
}

/// Check graphic control extensions against the frame count.
///
/// When any are present, every frame must have one.
pub(crate) fn check_control_count(frames: &[Frame]) -> Result<()> {
    let controls = frames
        .iter()
        .filter(|f| f.graphic_control_ext.is_some())
        .count();
    if controls != 0 && controls != frames.len() {
        return Err(Error::InvalidGraphicControlCount {
            controls,
            images: frames.len(),
        });
    }
    Ok(())
}

/// Convert color table bytes to raster pixels
fn color_table(colors: &[u8]) -> Result<Vec<SRgba8>> {
    if colors.len() % 3 != 0 {
        return Err(Error::BadColorTableLength(colors.len()));
    }
    Ok(colors
        .chunks_exact(3)
        .map(|c| SRgba8::new(c[0], c[1], c[2], 0xFF))
        .collect())
}

/// Get the destination row of an interlaced source row.
///
/// Rows are stored in four passes: every 8th row from 0, every 8th row from
/// 4, every 4th row from 2, then every 2nd row from 1.
fn interlaced_row(row: usize, height: usize) -> Result<usize> {
    let pass1 = (height + 7) / 8;
    let pass2 = (height + 3) / 8;
    let pass3 = (height + 1) / 4;
    let pass4 = height / 2;
    let mut r = row;
    if r < pass1 {
        return Ok(r * 8);
    }
    r -= pass1;
    if r < pass2 {
        return Ok(4 + r * 8);
    }
    r -= pass2;
    if r < pass3 {
        return Ok(2 + r * 4);
    }
    r -= pass3;
    if r < pass4 {
        return Ok(1 + r * 2);
    }
    Err(Error::InterlaceOverrun { row, height })
}

/// Build a raster from a frame and the color table in scope.
///
/// A local color table overrides the global one.  Transparent pixels are
/// fully clear; all others are opaque.
fn raster_from_frame(
    frame: &Frame,
    global_tbl: Option<&GlobalColorTable>,
) -> Result<Raster<SRgba8>> {
    let desc = &frame.image_desc;
    let width = usize::from(desc.width());
    let height = usize::from(desc.height());
    let colors = match (&frame.local_color_table, global_tbl) {
        (Some(tbl), _) => tbl.colors(),
        (None, Some(tbl)) => tbl.colors(),
        (None, None) => return Err(Error::MissingColorTable),
    };
    let table = color_table(colors)?;
    let transparent = frame
        .graphic_control_ext
        .and_then(|g| g.transparent_color());
    let data = frame.image_data.data();
    let expected = width * height;
    if data.len() < expected {
        return Err(Error::ImageDataTooShort {
            actual: data.len(),
            expected,
        });
    }
    let mut raster =
        Raster::with_clear(u32::from(desc.width()), u32::from(desc.height()));
    let mut i = 0;
    for row in 0..height {
        let y = if desc.interlaced() {
            interlaced_row(row, height)?
        } else {
            row
        };
        for x in 0..width {
            let idx = data[i];
            i += 1;
            let clr = if transparent == Some(idx) {
                SRgba8::new(0, 0, 0, 0)
            } else {
                match table.get(usize::from(idx)) {
                    Some(clr) => *clr,
                    None => {
                        return Err(Error::InvalidColorIndex {
                            index: idx.into(),
                            table_len: table.len(),
                        });
                    }
                }
            };
            *raster.pixel_mut(x as i32, y as i32) = clr;
        }
    }
    Ok(raster)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Decoder;

    /// 10x10 GIF with two colors and one frame
    const GIF_10X10: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91,
        0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF,
        0x00, 0x00, 0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02,
        0x16, 0x8C, 0x2D, 0x99, 0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02,
        0x75, 0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C,
        0x01, 0x00, 0x3B,
    ];

    #[test]
    fn simple_10x10() -> Result<()> {
        let image = [
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
            1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
            2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
            2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
        ];
        for f in Decoder::new(GIF_10X10).into_frames() {
            assert_eq!(f?.image_data.data(), &image[..]);
        }
        Ok(())
    }

    /// 1x1 GIF with a single red pixel
    const GIF_1X1_RED: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
        0x01, 0x00, 0x01, 0x00, 0x91, 0x00, 0x00, // logical screen desc
        0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, // global color table
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
        0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
        0x02, 0x02, 0x44, 0x01, 0x00, // image data
        0x3B, // trailer
    ];

    #[test]
    fn red_pixel() -> Result<()> {
        let mut rasters = Decoder::new(GIF_1X1_RED).into_rasters();
        let raster = rasters.next().unwrap()?;
        assert_eq!(raster.width(), 1);
        assert_eq!(raster.height(), 1);
        assert_eq!(raster.pixel(0, 0), SRgba8::new(0xFF, 0, 0, 0xFF));
        assert!(rasters.next().is_none());
        Ok(())
    }

    #[test]
    fn transparent_pixel() -> Result<()> {
        // same as GIF_1X1_RED with a graphic control extension marking
        // color 0 as transparent
        let mut gif = GIF_1X1_RED[..25].to_vec();
        gif.extend_from_slice(&[0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00]);
        gif.extend_from_slice(&GIF_1X1_RED[25..]);
        let raster = Decoder::new(&gif[..])
            .into_rasters()
            .next()
            .unwrap()?;
        assert_eq!(raster.pixel(0, 0), SRgba8::new(0, 0, 0, 0));
        Ok(())
    }

    #[test]
    fn stray_pad_bytes() -> Result<()> {
        // pad bytes before the image separator and before the trailer
        let mut gif = GIF_1X1_RED[..25].to_vec();
        gif.push(0x00);
        gif.extend_from_slice(&GIF_1X1_RED[25..40]);
        gif.push(0x00);
        gif.extend_from_slice(&GIF_1X1_RED[40..]);
        let raster = Decoder::new(&gif[..])
            .into_rasters()
            .next()
            .unwrap()?;
        assert_eq!(raster.pixel(0, 0), SRgba8::new(0xFF, 0, 0, 0xFF));
        Ok(())
    }

    #[test]
    fn truncated_color_table() {
        // ends in the middle of the global color table
        let blocks: Vec<_> =
            Decoder::new(&GIF_10X10[..20]).into_blocks().collect();
        match blocks.last() {
            Some(Err(Error::UnexpectedEndOfFile(ctx))) => {
                assert_eq!(*ctx, "global color table");
            }
            b => panic!("unexpected result: {:?}", b),
        }
    }

    #[test]
    fn truncated_sub_blocks() {
        let blocks: Vec<_> =
            Decoder::new(&GIF_10X10[..50]).into_blocks().collect();
        assert!(matches!(
            blocks.last(),
            Some(Err(Error::UnexpectedEndOfFile(_)))
        ));
    }

    #[test]
    fn unknown_block_code() {
        let gif = [
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
            0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // no color table
            0x99, // not a valid block code
        ];
        let blocks: Vec<_> = Decoder::new(&gif[..]).into_blocks().collect();
        assert!(matches!(
            blocks.last(),
            Some(Err(Error::UnknownBlockCode(0x99)))
        ));
    }

    #[test]
    fn bad_signature() {
        let blocks: Vec<_> =
            Decoder::new(&b"JIF89a\x01\x00\x01\x00\x00\x00\x00"[..])
                .into_blocks()
                .collect();
        assert!(matches!(
            blocks.first(),
            Some(Err(Error::MalformedHeader(_)))
        ));
    }

    #[test]
    fn bad_version() {
        let blocks: Vec<_> =
            Decoder::new(&b"GIF88a\x01\x00\x01\x00\x00\x00\x00"[..])
                .into_blocks()
                .collect();
        assert!(matches!(
            blocks.first(),
            Some(Err(Error::UnsupportedVersion([b'8', b'8', b'a'])))
        ));
    }

    #[test]
    fn stop_before_image_data() -> Result<()> {
        let mut frames = Decoder::new(GIF_1X1_RED)
            .stop_before_image_data(true)
            .into_frames();
        let frame = frames.next().unwrap()?;
        assert!(frame.image_data.data().is_empty());
        assert_eq!(frame.image_data.min_code_size(), 2);
        assert_eq!(frame.image_desc.width(), 1);
        Ok(())
    }

    #[test]
    fn image_size_limit() {
        let blocks: Vec<_> = Decoder::new(GIF_10X10)
            .max_image_sz(Some(50))
            .into_blocks()
            .collect();
        assert!(matches!(
            blocks.last(),
            Some(Err(Error::TooLargeImage { size: 100, max: 50 }))
        ));
    }

    #[test]
    fn interlace_height_8() {
        let ys: Vec<_> = (0..8).map(|r| interlaced_row(r, 8).unwrap()).collect();
        assert_eq!(ys, [0, 4, 2, 6, 1, 3, 5, 7]);
    }

    #[test]
    fn interlace_permutation() {
        for height in 1..=40 {
            let mut ys: Vec<_> = (0..height)
                .map(|r| interlaced_row(r, height).unwrap())
                .collect();
            ys.sort_unstable();
            let rows: Vec<_> = (0..height).collect();
            assert_eq!(ys, rows);
            assert!(matches!(
                interlaced_row(height, height),
                Err(Error::InterlaceOverrun { .. })
            ));
        }
    }

    #[test]
    fn interlaced_frame() -> Result<()> {
        // 1x8 interlaced frame; row r of the source holds index r
        let desc = ImageDesc::default()
            .with_width(1)
            .with_height(8)
            .with_interlaced(true);
        let mut data = ImageData::new(8, 3);
        data.add_data(&[0, 4, 2, 6, 1, 3, 5, 7]);
        let frame = Frame::new(None, desc, None, data);
        let mut colors = vec![];
        for i in 0..8u8 {
            colors.extend_from_slice(&[i, i, i]);
        }
        let tbl = GlobalColorTable::with_colors(&colors);
        let raster = raster_from_frame(&frame, Some(&tbl))?;
        for y in 0..8 {
            let v = y as u8;
            assert_eq!(raster.pixel(0, y), SRgba8::new(v, v, v, 0xFF));
        }
        Ok(())
    }

    #[test]
    fn mismatched_control_count() {
        // two frames but only one graphic control extension
        let g_tbl = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            2,
        );
        let mut bytes = vec![];
        let mut enc = crate::Encoder::new_unbuffered(&mut bytes).into_block_enc();
        enc.encode(Header::default()).unwrap();
        enc.encode(
            LogicalScreenDesc::default()
                .with_screen_width(2)
                .with_screen_height(2)
                .with_color_table_config(&g_tbl),
        )
        .unwrap();
        enc.encode(GlobalColorTable::with_colors(&[0, 0, 0, 0xFF, 0, 0]))
            .unwrap();
        let mut control = GraphicControl::default();
        control.set_delay_time_cs(10);
        enc.encode(control).unwrap();
        for _ in 0..2 {
            enc.encode(
                ImageDesc::default().with_width(2).with_height(2),
            )
            .unwrap();
            let mut data = ImageData::new(4, 2);
            data.add_data(&[0, 1, 1, 0]);
            enc.encode(data).unwrap();
        }
        enc.encode(Trailer::default()).unwrap();
        let mut rasters = Decoder::new(&bytes[..]).into_rasters();
        assert!(matches!(
            rasters.next(),
            Some(Err(Error::InvalidGraphicControlCount {
                controls: 1,
                images: 2,
            }))
        ));
        assert!(rasters.next().is_none());
    }

    #[test]
    fn color_index_out_of_range() {
        let desc = ImageDesc::default().with_width(1).with_height(1);
        let mut data = ImageData::new(1, 2);
        data.add_data(&[5]);
        let frame = Frame::new(None, desc, None, data);
        let tbl = GlobalColorTable::with_colors(&[0xFF, 0, 0, 0, 0, 0]);
        assert!(matches!(
            raster_from_frame(&frame, Some(&tbl)),
            Err(Error::InvalidColorIndex {
                index: 5,
                table_len: 2,
            })
        ));
    }

    #[test]
    fn missing_color_table() {
        let desc = ImageDesc::default().with_width(1).with_height(1);
        let mut data = ImageData::new(1, 2);
        data.add_data(&[0]);
        let frame = Frame::new(None, desc, None, data);
        assert!(matches!(
            raster_from_frame(&frame, None),
            Err(Error::MissingColorTable)
        ));
    }

    #[test]
    fn short_image_data() {
        let desc = ImageDesc::default().with_width(2).with_height(2);
        let mut data = ImageData::new(4, 2);
        data.add_data(&[0, 1]);
        let frame = Frame::new(None, desc, None, data);
        let tbl = GlobalColorTable::with_colors(&[0xFF, 0, 0, 0, 0, 0]);
        assert!(matches!(
            raster_from_frame(&frame, Some(&tbl)),
            Err(Error::ImageDataTooShort {
                actual: 2,
                expected: 4,
            })
        ));
    }
}
