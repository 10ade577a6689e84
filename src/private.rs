// private.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Private module for top-level items
use crate::error::{Error, Result};
use crate::meta::{Compliance, ImageInfo, ImageMetadata};
use crate::{decode, encode, meta, xmp};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::{BufReader, BufWriter, Read, Write};

/// GIF file decoder
///
/// Can be converted to one of three `Iterator`s:
/// * [into_iter] / [into_rasters] for high-level `Raster`s
/// * [into_frames] for mid-level [Frame]s
/// * [into_blocks] for low-level [Block]s
///
/// ## Example: Get a `Raster` from a GIF
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// if let Some(raster) = gifx::Decoder::new(gif).into_iter().next() {
///     // was there a decoding error?
///     let raster = raster?;
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Block]: block/enum.Block.html
/// [Frame]: block/struct.Frame.html
/// [into_blocks]: struct.Decoder.html#method.into_blocks
/// [into_frames]: struct.Decoder.html#method.into_frames
/// [into_iter]: struct.Decoder.html#method.into_iter
/// [into_rasters]: struct.Decoder.html#method.into_rasters
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Stop before decompressing image data?
    stop_before_image_data: bool,
}

impl<R: Read> Decoder<BufReader<R>> {
    /// Create a new buffered GIF decoder.
    pub fn new(reader: R) -> Self {
        Self::new_unbuffered(BufReader::new(reader))
    }
}

impl<R: Read> Decoder<R> {
    /// Create a new unbuffered GIF decoder.
    pub fn new_unbuffered(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(1 << 25),
            stop_before_image_data: false,
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Stop before decompressing image data.
    ///
    /// Image descriptors are still decoded and their sub-block chains
    /// drained, but [ImageData] blocks are left empty.  Useful when only
    /// metadata is needed.
    ///
    /// [ImageData]: block/struct.ImageData.html
    pub fn stop_before_image_data(mut self, stop: bool) -> Self {
        self.stop_before_image_data = stop;
        self
    }

    /// Convert into a block `Iterator`.
    pub fn into_blocks(self) -> decode::Blocks<R> {
        decode::Blocks::new(
            self.reader,
            self.max_image_sz,
            self.stop_before_image_data,
        )
    }

    /// Convert into a frame `Iterator`.
    pub fn into_frames(self) -> decode::Frames<R> {
        decode::Frames::new(self.into_blocks())
    }

    /// Convert into a raster `Iterator`.
    pub fn into_rasters(self) -> decode::Rasters<R> {
        decode::Rasters::new(self.into_frames())
    }
}

impl<R: Read> IntoIterator for Decoder<R> {
    type Item = Result<Raster<SRgba8>>;
    type IntoIter = decode::Rasters<R>;

    /// Convert into a raster `Iterator`
    fn into_iter(self) -> Self::IntoIter {
        self.into_rasters()
    }
}

/// GIF file encoder
///
/// Can be converted to one of three encoders:
/// * [into_raster_enc] for high-level `Raster`s
/// * [into_frame_enc] for mid-level [Frame]s
/// * [into_block_enc] for low-level [Block]s
///
/// ## Encoding Example
/// ```
/// use gifx::Encoder;
/// use pix::rgb::SRgba8;
/// use pix::Raster;
/// use std::error::Error;
/// use std::io::Write;
///
/// fn encode<W: Write>(mut w: W) -> Result<(), Box<dyn Error>> {
///     let mut raster = Raster::with_clear(2, 2);
///     *raster.pixel_mut(0, 0) = SRgba8::new(0xFF, 0, 0, 0xFF);
///     *raster.pixel_mut(1, 1) = SRgba8::new(0xFF, 0, 0, 0xFF);
///     let mut enc = Encoder::new(&mut w).into_raster_enc();
///     enc.encode_raster(&raster)?;
///     Ok(())
/// }
/// ```
///
/// [Block]: block/enum.Block.html
/// [Frame]: block/struct.Frame.html
/// [into_block_enc]: struct.Encoder.html#method.into_block_enc
/// [into_frame_enc]: struct.Encoder.html#method.into_frame_enc
/// [into_raster_enc]: struct.Encoder.html#method.into_raster_enc
pub struct Encoder<W: Write> {
    /// Writer for output data
    writer: W,
}

impl<W: Write> Encoder<BufWriter<W>> {
    /// Create a new buffered GIF encoder.
    pub fn new(writer: W) -> Self {
        Self::new_unbuffered(BufWriter::new(writer))
    }
}

impl<W: Write> Encoder<W> {
    /// Create a new unbuffered GIF encoder.
    pub fn new_unbuffered(writer: W) -> Self {
        Encoder { writer }
    }

    /// Convert into a block encoder.
    pub fn into_block_enc(self) -> encode::BlockEnc<W> {
        encode::BlockEnc::new(self.writer)
    }

    /// Convert into a frame encoder.
    pub fn into_frame_enc(self) -> encode::FrameEnc<W> {
        encode::FrameEnc::new(self.into_block_enc())
    }

    /// Convert into a raster encoder.
    pub fn into_raster_enc(self) -> encode::RasterEnc<W> {
        encode::RasterEnc::new(self.into_block_enc())
    }
}

/// Read basic facts about a GIF file.
///
/// The whole stream is scanned, but image data is not decompressed.
pub fn read_info<R: Read>(reader: R) -> Result<ImageInfo> {
    meta::image_info(
        Decoder::new(reader)
            .stop_before_image_data(true)
            .into_blocks(),
    )
}

/// Read the logical screen dimensions of a GIF file.
pub fn read_dimensions<R: Read>(reader: R) -> Result<(u16, u16)> {
    meta::dimensions(
        Decoder::new(reader)
            .stop_before_image_data(true)
            .into_blocks(),
    )
}

/// Read per-frame metadata from a GIF file.
///
/// Image data is not decompressed.
pub fn read_metadata<R: Read>(reader: R) -> Result<ImageMetadata> {
    meta::image_metadata(
        Decoder::new(reader)
            .stop_before_image_data(true)
            .into_frames(),
    )
}

/// Read the first frame of a GIF file as a `Raster`.
pub fn read_first_frame<R: Read>(reader: R) -> Result<Raster<SRgba8>> {
    match Decoder::new(reader).into_rasters().next() {
        Some(raster) => raster,
        None => Err(Error::MissingImageDescriptor),
    }
}

/// Read all frames of a GIF file as `Raster`s, in file order.
pub fn read_all_frames<R: Read>(reader: R) -> Result<Vec<Raster<SRgba8>>> {
    let rasters: Vec<_> = Decoder::new(reader)
        .into_rasters()
        .collect::<Result<_>>()?;
    if rasters.is_empty() {
        return Err(Error::MissingImageDescriptor);
    }
    Ok(rasters)
}

/// Read embedded XMP metadata from a GIF file.
///
/// Returns `Ok(None)` when no XMP application block is present.
pub fn read_xmp<R: Read>(reader: R) -> Result<Option<String>> {
    xmp::from_blocks(
        Decoder::new(reader)
            .stop_before_image_data(true)
            .into_blocks(),
    )
}

/// Write a `Raster` as a single-frame GIF file.
///
/// Pixels with alpha below full opacity are written as the transparent
/// color.  When `xmp` is given, the XML is embedded in an application
/// extension block.
pub fn write_image<W: Write>(
    writer: W,
    raster: &Raster<SRgba8>,
    xmp: Option<&str>,
) -> Result<()> {
    let mut enc = Encoder::new(writer).into_raster_enc();
    if let Some(xml) = xmp {
        enc = enc.with_xmp(xml);
    }
    enc.encode_raster(raster)
}

/// Check format compliance of a GIF file.
///
/// Conditions which decode successfully but deviate from the format
/// specification are collected as notes in the report.
pub fn check_compliance<R: Read>(reader: R) -> Result<Compliance> {
    meta::compliance(
        Decoder::new(reader)
            .stop_before_image_data(true)
            .into_blocks(),
    )
}
