// error.rs
//
// Copyright (c) 2025  Douglas Lau
//
use std::io;
use std::num::TryFromIntError;
use thiserror::Error;

/// Errors encountered while decoding or encoding
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A wrapped I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Integer out of bounds.
    #[error("integer out of bounds: {0}")]
    TryFromInt(#[from] TryFromIntError),
    /// [Header](block/struct.Header.html) block malformed or missing.
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),
    /// GIF version not supported (87a or 89a only).
    #[error("unsupported version: {0:?}")]
    UnsupportedVersion([u8; 3]),
    /// File ended in the middle of the named field or block.
    #[error("unexpected end of file reading {0}")]
    UnexpectedEndOfFile(&'static str),
    /// Unrecognized [Block](block/enum.Block.html) code (signature).
    #[error("unknown block code {0:#04x}")]
    UnknownBlockCode(u8),
    /// [Block](block/enum.Block.html)s arranged in invalid sequence.
    #[error("invalid block sequence")]
    InvalidBlockSequence,
    /// [GraphicControl](block/struct.GraphicControl.html) block has invalid
    /// length.
    #[error("malformed graphic control extension")]
    MalformedGraphicControlExtension,
    /// [GraphicControl](block/struct.GraphicControl.html) block count does
    /// not match the image count.
    #[error("{controls} graphic control extensions for {images} images")]
    InvalidGraphicControlCount {
        /// Number of graphic control extension blocks
        controls: usize,
        /// Number of image descriptor blocks
        images: usize,
    },
    /// Color table byte length not a multiple of 3.
    #[error("color table length {0} is not a multiple of 3")]
    BadColorTableLength(usize),
    /// Decompressed image data too short for the image dimensions.
    #[error("image data ended after {actual} of {expected} pixels")]
    ImageDataTooShort {
        /// Pixels available
        actual: usize,
        /// Pixels required by the image descriptor
        expected: usize,
    },
    /// Color index not within the active color table.
    #[error("color index {index} exceeds table length {table_len}")]
    InvalidColorIndex {
        /// Index from image data
        index: usize,
        /// Number of entries in the color table
        table_len: usize,
    },
    /// Interlaced row sequence ran past the image height.
    #[error("interlaced row {row} beyond image height {height}")]
    InterlaceOverrun {
        /// Source row which could not be placed
        row: usize,
        /// Image height
        height: usize,
    },
    /// Compressed LZW data invalid or corrupt.
    #[error("corrupt LZW data: {0}")]
    InvalidLzwData(&'static str),
    /// LZW minimum code size out of range (2 to 8).
    #[error("invalid LZW minimum code size: {0}")]
    InvalidCodeSize(u8),
    /// XMP application block with a corrupt payload.
    #[error("malformed XMP block: {0}")]
    MalformedXmp(&'static str),
    /// More than one XMP application block.
    #[error("more than one XMP block")]
    MultipleXmp,
    /// Image has more distinct colors than a color table can hold.
    #[error("image has more than {0} colors")]
    TooManyColors(usize),
    /// Missing color table for a frame.
    #[error("no color table for frame")]
    MissingColorTable,
    /// No image descriptor block in the file.
    #[error("no image descriptor")]
    MissingImageDescriptor,
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    #[error("image size {size} larger than limit {max}")]
    TooLargeImage {
        /// Image size, in pixels
        size: usize,
        /// Configured limit
        max: usize,
    },
}

/// Result type for GIF decoding and encoding
pub type Result<T> = std::result::Result<T, Error>;
