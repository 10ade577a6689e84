// meta.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! Image information, per-frame metadata and format compliance reports
use crate::block::{Block, Comment, DisposalMethod, LogicalScreenDesc};
use crate::decode::{check_control_count, Blocks, Frames};
use crate::error::{Error, Result};
use std::io::Read;

/// Basic facts about a GIF file.
///
/// Returned by [read_info].
///
/// [read_info]: fn.read_info.html
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Version bytes from the header
    version: [u8; 3],
    /// Logical screen width
    width: u16,
    /// Logical screen height
    height: u16,
    /// Bits per pixel, from the color resolution field
    bits_per_pixel: u8,
    /// Number of image frames
    frame_count: usize,
    /// Is the first frame interlaced?
    interlaced: bool,
    /// Does the first graphic control extension enable transparency?
    transparent: bool,
    /// Comment extension text
    comments: Vec<String>,
}

impl ImageInfo {
    /// Get the version bytes: `87a` or `89a`
    pub fn version(&self) -> [u8; 3] {
        self.version
    }

    /// Get the logical screen width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the logical screen height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the bits per pixel
    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Get the number of image frames
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Check if the first frame is interlaced
    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    /// Check if transparency is enabled
    pub fn transparent(&self) -> bool {
        self.transparent
    }

    /// Get the comment text
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Get the compression algorithm (always LZW for GIF)
    pub fn compression(&self) -> &'static str {
        "LZW"
    }
}

/// Metadata for one frame of a GIF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetadata {
    /// Delay time, in centiseconds
    delay_time_cs: u16,
    /// Left position on the logical screen
    left: u16,
    /// Top position on the logical screen
    top: u16,
    /// Disposal method
    disposal_method: DisposalMethod,
}

impl FrameMetadata {
    /// Get the delay time, in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Get the left position
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Get the top position
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }
}

/// Metadata for all frames of a GIF file.
///
/// Returned by [read_metadata].
///
/// [read_metadata]: fn.read_metadata.html
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    /// Logical screen width
    screen_width: u16,
    /// Logical screen height
    screen_height: u16,
    /// Animation loop count (zero means loop forever)
    loop_count: Option<u16>,
    /// Per-frame metadata, in file order
    frames: Vec<FrameMetadata>,
}

impl ImageMetadata {
    /// Get the logical screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Get the logical screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Get the animation loop count
    pub fn loop_count(&self) -> Option<u16> {
        self.loop_count
    }

    /// Get metadata for all frames, in file order
    pub fn frames(&self) -> &[FrameMetadata] {
        &self.frames
    }
}

/// Format compliance report for a GIF file.
///
/// Returned by [check_compliance].  Notes are collected for conditions
/// which decode successfully but deviate from the format specification.
///
/// [check_compliance]: fn.check_compliance.html
#[derive(Debug, Clone)]
pub struct Compliance {
    /// Version bytes from the header
    version: [u8; 3],
    /// Notes on deviations found
    notes: Vec<String>,
}

impl Compliance {
    /// Get the version bytes
    pub fn version(&self) -> [u8; 3] {
        self.version
    }

    /// Get the notes on deviations found
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Check if no deviations were found
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }

    /// Add a note
    fn note(&mut self, note: String) {
        self.notes.push(note);
    }
}

/// Get the text of a comment block
fn comment_text(comment: &Comment) -> String {
    let bytes: Vec<u8> = comment.comments().concat();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Collect basic image information from a block stream
pub(crate) fn image_info<R: Read>(blocks: Blocks<R>) -> Result<ImageInfo> {
    let mut version = *b"89a";
    let mut screen = LogicalScreenDesc::default();
    let mut first_desc = None;
    let mut frame_count = 0;
    let mut has_control = false;
    let mut transparent = false;
    let mut comments = Vec::new();
    for block in blocks {
        match block? {
            Block::Header(b) => version = b.version(),
            Block::LogicalScreenDesc(b) => screen = b,
            Block::GraphicControl(b) => {
                if !has_control {
                    has_control = true;
                    transparent = b.transparent_color().is_some();
                }
            }
            Block::ImageDesc(b) => {
                frame_count += 1;
                if first_desc.is_none() {
                    first_desc = Some(b);
                }
            }
            Block::Comment(b) => comments.push(comment_text(&b)),
            _ => {}
        }
    }
    let desc = first_desc.ok_or(Error::MissingImageDescriptor)?;
    Ok(ImageInfo {
        version,
        width: screen.screen_width(),
        height: screen.screen_height(),
        bits_per_pixel: screen.color_resolution() + 1,
        frame_count,
        interlaced: desc.interlaced(),
        transparent,
        comments,
    })
}

/// Get the logical screen dimensions from a block stream
pub(crate) fn dimensions<R: Read>(blocks: Blocks<R>) -> Result<(u16, u16)> {
    for block in blocks {
        if let Block::LogicalScreenDesc(b) = block? {
            return Ok((b.screen_width(), b.screen_height()));
        }
    }
    Err(Error::MalformedHeader("missing logical screen descriptor"))
}

/// Collect per-frame metadata from a frame stream.
///
/// The number of graphic control extensions must be zero or equal to the
/// number of frames; frames without one report a zero delay and an
/// unspecified disposal method.
pub(crate) fn image_metadata<R: Read>(
    mut frames: Frames<R>,
) -> Result<ImageMetadata> {
    let preamble = frames.preamble()?.unwrap_or_default();
    let frames = (&mut frames).collect::<Result<Vec<_>>>()?;
    if frames.is_empty() {
        return Err(Error::MissingImageDescriptor);
    }
    check_control_count(&frames)?;
    let metadata = frames
        .iter()
        .map(|frame| {
            let control = frame.graphic_control_ext.unwrap_or_default();
            FrameMetadata {
                delay_time_cs: control.delay_time_cs(),
                left: frame.image_desc.left(),
                top: frame.image_desc.top(),
                disposal_method: control.disposal_method(),
            }
        })
        .collect();
    Ok(ImageMetadata {
        screen_width: preamble.screen_width(),
        screen_height: preamble.screen_height(),
        loop_count: preamble
            .loop_count_ext
            .as_ref()
            .and_then(|a| a.loop_count()),
        frames: metadata,
    })
}

/// Collect a format compliance report from a block stream
pub(crate) fn compliance<R: Read>(blocks: Blocks<R>) -> Result<Compliance> {
    let mut report = Compliance {
        version: *b"89a",
        notes: Vec::new(),
    };
    let mut screen = LogicalScreenDesc::default();
    for block in blocks {
        match block? {
            Block::Header(b) => report.version = b.version(),
            Block::LogicalScreenDesc(b) => {
                screen = b;
                if b.screen_width() < 1 {
                    report.note("screen width is zero".to_string());
                }
                if b.screen_height() < 1 {
                    report.note("screen height is zero".to_string());
                }
                let table = b.color_table_config();
                let bg = usize::from(b.background_color_idx());
                if !table.is_empty() && bg >= table.len() {
                    report.note(format!(
                        "background color index {} outside color table of {}",
                        bg,
                        table.len(),
                    ));
                }
            }
            Block::ImageDesc(b) => {
                if b.width() < 1 || b.height() < 1 {
                    report.note(format!(
                        "image dimensions {}x{} invalid",
                        b.width(),
                        b.height(),
                    ));
                }
                let right = u32::from(b.left()) + u32::from(b.width());
                if right > u32::from(screen.screen_width()) {
                    report.note(format!(
                        "image right edge {} outside screen width {}",
                        right,
                        screen.screen_width(),
                    ));
                }
                let bottom = u32::from(b.top()) + u32::from(b.height());
                if bottom > u32::from(screen.screen_height()) {
                    report.note(format!(
                        "image bottom edge {} outside screen height {}",
                        bottom,
                        screen.screen_height(),
                    ));
                }
            }
            Block::Unknown(b) => {
                let label = b.ext_id().first().copied().unwrap_or(0);
                report.note(format!("unknown extension label {:#04x}", label));
            }
            Block::Application(b) => {
                if !b.is_xmp() && b.loop_count().is_none() {
                    report.note(format!(
                        "unknown application extension ({})",
                        String::from_utf8_lossy(b.app_id()),
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block::*;
    use crate::{
        check_compliance, read_dimensions, read_info, read_metadata, Encoder,
    };

    /// Build a GIF with the given frame count and graphic control blocks
    fn build_gif(
        frames: usize,
        controls: &[Option<GraphicControl>],
        comments: &[&str],
        loop_count: Option<u16>,
    ) -> Vec<u8> {
        let g_tbl = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            2,
        );
        let mut bytes = vec![];
        let mut enc = Encoder::new_unbuffered(&mut bytes).into_block_enc();
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
        if let Some(count) = loop_count {
            enc.encode(Application::with_loop_count(count)).unwrap();
        }
        for text in comments {
            let mut comment = Comment::default();
            comment.add_comment(text.as_bytes());
            enc.encode(comment).unwrap();
        }
        for i in 0..frames {
            if let Some(Some(control)) = controls.get(i) {
                enc.encode(*control).unwrap();
            }
            enc.encode(
                ImageDesc::default().with_width(2).with_height(2),
            )
            .unwrap();
            let mut image_data = ImageData::new(4, 2);
            image_data.add_data(&[0, 1, 1, 0]);
            enc.encode(image_data).unwrap();
        }
        enc.encode(Trailer::default()).unwrap();
        bytes
    }

    #[test]
    fn info_basic() {
        let gif = build_gif(2, &[], &["first comment"], None);
        let info = read_info(&gif[..]).unwrap();
        assert_eq!(info.version(), *b"89a");
        assert_eq!(info.width(), 2);
        assert_eq!(info.height(), 2);
        assert_eq!(info.frame_count(), 2);
        assert!(!info.interlaced());
        assert!(!info.transparent());
        assert_eq!(info.comments(), ["first comment".to_string()]);
        assert_eq!(info.compression(), "LZW");
        // color resolution bits are zero for a 2 entry table
        assert_eq!(info.bits_per_pixel(), 1);
    }

    #[test]
    fn info_transparent() {
        let mut control = GraphicControl::default();
        control.set_transparent_color(Some(0));
        let gif = build_gif(1, &[Some(control)], &[], None);
        let info = read_info(&gif[..]).unwrap();
        assert!(info.transparent());
    }

    #[test]
    fn info_no_image() {
        let gif = build_gif(0, &[], &[], None);
        assert!(matches!(
            read_info(&gif[..]),
            Err(Error::MissingImageDescriptor)
        ));
    }

    #[test]
    fn dimensions_only() {
        let gif = build_gif(1, &[], &[], None);
        assert_eq!(read_dimensions(&gif[..]).unwrap(), (2, 2));
    }

    #[test]
    fn metadata_frames() {
        let mut first = GraphicControl::default();
        first.set_delay_time_cs(150);
        first.set_disposal_method(DisposalMethod::Background);
        let mut second = GraphicControl::default();
        second.set_delay_time_cs(25);
        let gif = build_gif(2, &[Some(first), Some(second)], &[], Some(3));
        let metadata = read_metadata(&gif[..]).unwrap();
        assert_eq!(metadata.screen_width(), 2);
        assert_eq!(metadata.screen_height(), 2);
        assert_eq!(metadata.loop_count(), Some(3));
        assert_eq!(metadata.frames().len(), 2);
        assert_eq!(metadata.frames()[0].delay_time_cs(), 150);
        assert_eq!(
            metadata.frames()[0].disposal_method(),
            DisposalMethod::Background
        );
        assert_eq!(metadata.frames()[1].delay_time_cs(), 25);
        assert_eq!(
            metadata.frames()[1].disposal_method(),
            DisposalMethod::NoAction
        );
    }

    #[test]
    fn metadata_without_controls() {
        let gif = build_gif(2, &[], &[], None);
        let metadata = read_metadata(&gif[..]).unwrap();
        assert_eq!(metadata.frames().len(), 2);
        assert_eq!(metadata.frames()[0].delay_time_cs(), 0);
        assert_eq!(
            metadata.frames()[0].disposal_method(),
            DisposalMethod::NoAction
        );
    }

    #[test]
    fn metadata_control_count_mismatch() {
        let control = GraphicControl::default();
        let gif = build_gif(2, &[Some(control), None], &[], None);
        assert!(matches!(
            read_metadata(&gif[..]),
            Err(Error::InvalidGraphicControlCount {
                controls: 1,
                images: 2,
            })
        ));
    }

    #[test]
    fn compliance_clean() {
        let gif = build_gif(1, &[], &[], None);
        let report = check_compliance(&gif[..]).unwrap();
        assert_eq!(report.version(), *b"89a");
        assert!(report.is_clean(), "notes: {:?}", report.notes());
    }

    #[test]
    fn compliance_notes() {
        let g_tbl = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            2,
        );
        let mut bytes = vec![];
        let mut enc = Encoder::new_unbuffered(&mut bytes).into_block_enc();
        enc.encode(Header::default()).unwrap();
        enc.encode(
            LogicalScreenDesc::default()
                .with_screen_width(1)
                .with_screen_height(1)
                .with_color_table_config(&g_tbl)
                .with_background_color_idx(5),
        )
        .unwrap();
        enc.encode(GlobalColorTable::with_colors(&[0, 0, 0, 0xFF, 0, 0]))
            .unwrap();
        let mut unknown = Unknown::default();
        unknown.add_sub_block(&[0xAB]);
        unknown.add_sub_block(&[1, 2, 3]);
        enc.encode(unknown).unwrap();
        enc.encode(
            ImageDesc::default().with_width(2).with_height(2),
        )
        .unwrap();
        let mut image_data = ImageData::new(4, 2);
        image_data.add_data(&[0, 1, 1, 0]);
        enc.encode(image_data).unwrap();
        enc.encode(Trailer::default()).unwrap();
        let report = check_compliance(&bytes[..]).unwrap();
        assert_eq!(report.notes().len(), 4);
        assert!(report.notes()[0].contains("background color index 5"));
        assert!(report.notes()[1].contains("0xab"));
        assert!(report.notes()[2].contains("right edge"));
        assert!(report.notes()[3].contains("bottom edge"));
    }
}
