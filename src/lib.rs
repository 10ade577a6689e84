// lib.rs      gifx crate.
//
// Copyright (c) 2025  Douglas Lau
//
//! # gifx
//!
//! A library for decoding and encoding GIF images, with support for
//! embedded XMP metadata.
//!
//! ## Reading
//!
//! Use [read_first_frame] or [read_all_frames] to get `Raster`s, or the
//! [Decoder] builder for block- and frame-level access.  [read_info],
//! [read_metadata] and [read_xmp] scan a file without decompressing
//! image data.
//!
//! ## Writing
//!
//! Use [write_image] to write a `Raster` as a single-frame GIF89a file,
//! or the [Encoder] builder for block- and frame-level control.
//!
//! [Decoder]: struct.Decoder.html
//! [Encoder]: struct.Encoder.html
//! [read_all_frames]: fn.read_all_frames.html
//! [read_first_frame]: fn.read_first_frame.html
//! [read_info]: fn.read_info.html
//! [read_metadata]: fn.read_metadata.html
//! [read_xmp]: fn.read_xmp.html
//! [write_image]: fn.write_image.html
#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

pub mod block;
mod decode;
mod encode;
mod error;
mod lzw;
mod meta;
mod private;
mod xmp;

pub use crate::decode::{Blocks, Frames, Rasters};
pub use crate::encode::{
    BlockEnc, ExactPaletteSource, FrameEnc, PaletteSource, RasterEnc,
};
pub use crate::error::{Error, Result};
pub use crate::meta::{Compliance, FrameMetadata, ImageInfo, ImageMetadata};
pub use crate::private::{
    check_compliance, read_all_frames, read_dimensions, read_first_frame,
    read_info, read_metadata, read_xmp, write_image, Decoder, Encoder,
};
