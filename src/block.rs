// block.rs
//
// Copyright (c) 2025  Douglas Lau
//
//! GIF block types

/// Channels in a color table entry
const CHANNELS: usize = 3;

/// Presence of a color table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    /// Color table absent
    Absent,
    /// Color table present
    Present,
}

/// Ordering of entries in a color table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableOrdering {
    /// Entries in no particular order
    NotSorted,
    /// Entries sorted by decreasing importance
    Sorted,
}

/// Configuration of a color table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    ordering: ColorTableOrdering,
    table_len: usize, // must be between 2...256
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        let existence = ColorTableExistence::Absent;
        let ordering = ColorTableOrdering::NotSorted;
        let table_len = 2;
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }
}

impl ColorTableConfig {
    /// Create a new color table configuration
    pub fn new(
        existence: ColorTableExistence,
        ordering: ColorTableOrdering,
        table_len: u16,
    ) -> Self {
        let table_len =
            (table_len as usize).max(2).next_power_of_two().min(256);
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }

    /// Get the existence of a color table
    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    /// Get the ordering of a color table
    pub fn ordering(&self) -> ColorTableOrdering {
        self.ordering
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the on-wire size code: the table has `2 ^ (code + 1)` entries
    pub(crate) fn len_bits(&self) -> u8 {
        let sz = self.table_len;
        for b in 0..7 {
            if (sz >> (b + 1)) == 1 {
                return b;
            }
        }
        7
    }

    /// Get the size of the table, in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Disposal method for a frame, from the 3-bit dispose field
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// Unspecified disposal
    NoAction,
    /// Do not dispose of the frame
    Keep,
    /// Restore to background color
    Background,
    /// Restore to previous frame
    Previous,
    /// Reserved dispose values (4 to 7)
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::NoAction
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Block codes for the byte-stream state machine
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Header_,
    LogicalScreenDesc_,
    GlobalColorTable_,
    Extension_,
    ImageDesc_,
    LocalColorTable_,
    ImageData_,
    Trailer_,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    pub fn signature(&self) -> &'static [u8] {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b",", // (0x2C) Image separator
            Extension_ => b"!", // (0x21) Extension introducer
            Trailer_ => b";",   // (0x3B) GIF trailer
            _ => &[],
        }
    }

    pub fn size(&self) -> usize {
        use self::BlockCode::*;
        match self {
            Header_ => 6,
            LogicalScreenDesc_ => 7,
            ImageDesc_ => 10,
            Trailer_ => 1,
            Extension_ => 2, // +sub-blocks
            ImageData_ => 1, // +sub-blocks
            _ => 0,
        }
    }

    /// Describe the block for error context
    pub fn context(&self) -> &'static str {
        use self::BlockCode::*;
        match self {
            Header_ => "header",
            LogicalScreenDesc_ => "logical screen descriptor",
            GlobalColorTable_ => "global color table",
            Extension_ => "extension label",
            ImageDesc_ => "image descriptor",
            LocalColorTable_ => "local color table",
            ImageData_ => "image data",
            Trailer_ => "trailer",
        }
    }
}

/// Extension labels following an extension introducer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            PlainText_ => 0x01,
            GraphicControl_ => 0xF9,
            Comment_ => 0xFE,
            Application_ => 0xFF,
            Unknown_(n) => n,
        }
    }
}

/// Header block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Version bytes: `87a` or `89a`
    version: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Header::with_version(*b"89a")
    }
}

impl Header {
    /// Create a header block with a given version
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    /// Get the version bytes
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical Screen Descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Adjust the screen width
    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    /// Adjust the screen height
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    /// Adjust the packed flags
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    fn color_table_existence(&self) -> ColorTableExistence {
        if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        }
    }

    /// Get the color resolution field (3 bits)
    pub fn color_resolution(&self) -> u8 {
        (self.flags & Self::COLOR_RESOLUTION) >> 4
    }

    fn color_table_ordering(&self) -> ColorTableOrdering {
        if self.flags & Self::COLOR_TABLE_ORDERING != 0 {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        }
    }

    fn color_table_len(&self) -> usize {
        2 << ((self.flags & Self::COLOR_TABLE_SIZE) as usize)
    }

    /// Get the global color table configuration
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = self.color_table_existence();
        let ordering = self.color_table_ordering();
        let table_len = self.color_table_len();
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }

    /// Adjust the global color table configuration
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = tbl.len_bits() & Self::COLOR_TABLE_SIZE;
        flags |= (flags << 4) & Self::COLOR_RESOLUTION;
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
        self
    }

    /// Adjust the background color index
    pub fn with_background_color_idx(
        mut self,
        background_color_idx: u8,
    ) -> Self {
        self.background_color_idx = background_color_idx;
        self
    }

    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    /// Adjust the pixel aspect ratio
    pub fn with_pixel_aspect_ratio(mut self, pixel_aspect_ratio: u8) -> Self {
        self.pixel_aspect_ratio = pixel_aspect_ratio;
        self
    }

    /// Get the pixel aspect ratio
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Global Color Table block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalColorTable {
    colors: Vec<u8>,
}

impl GlobalColorTable {
    /// Create a global color table block from RGB triples
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() / CHANNELS * CHANNELS, colors.len());
        let colors = colors.to_vec();
        GlobalColorTable { colors }
    }

    /// Get the table length, in bytes
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the color data
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Plain Text extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainText {
    sub_blocks: Vec<Vec<u8>>, // sequence of sub-blocks
}

impl PlainText {
    /// Add a sub-block
    pub fn add_sub_block(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.sub_blocks.push(b.to_vec());
    }

    /// Get the sub-blocks
    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        &self.sub_blocks
    }
}

/// Graphic Control extension block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    #[allow(dead_code)]
    const RESERVED: u8 = 0b1110_0000;
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Set the packed flags
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    /// Set the disposal method
    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        let d: u8 = disposal_method.into();
        self.flags = (self.flags & !Self::DISPOSAL_METHOD) | (d << 2);
    }

    /// Get the user input flag
    pub fn user_input(&self) -> bool {
        (self.flags & Self::USER_INPUT) != 0
    }

    /// Set the user input flag
    pub fn set_user_input(&mut self, user_input: bool) {
        if user_input {
            self.flags |= Self::USER_INPUT;
        } else {
            self.flags &= !Self::USER_INPUT;
        }
    }

    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    /// Set the delay time in centiseconds
    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }

    /// Get the transparent color, if enabled
    pub fn transparent_color(&self) -> Option<u8> {
        if (self.flags & Self::TRANSPARENT_COLOR) != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }

    /// Get the raw transparent color index
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }

    /// Set the raw transparent color index
    pub fn set_transparent_color_idx(&mut self, transparent_color_idx: u8) {
        self.transparent_color_idx = transparent_color_idx;
    }

    /// Enable or disable the transparent color
    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        match transparent_color {
            Some(t) => {
                self.flags |= Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = t;
            }
            None => {
                self.flags &= !Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = 0;
            }
        }
    }
}

/// Comment extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Comment {
    comments: Vec<Vec<u8>>, // ascii only comments recommended
}

impl Comment {
    /// Add a comment sub-block
    pub fn add_comment(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.comments.push(b.to_vec());
    }

    /// Get the comment sub-blocks
    pub fn comments(&self) -> &[Vec<u8>] {
        &self.comments
    }
}

/// Application extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Application {
    app_data: Vec<Vec<u8>>, // sequence of sub-blocks (first has app ID)
}

impl Application {
    fn is_looping(app_id: &[u8]) -> bool {
        app_id == b"NETSCAPE2.0" || app_id == b"ANIMEXTS1.0"
    }

    /// Create an application block with an animation loop count
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut app_data = vec![];
        app_data.push(b"NETSCAPE2.0".to_vec());
        let mut v = vec![1];
        v.push((loop_count >> 8) as u8);
        v.push(loop_count as u8);
        app_data.push(v);
        Application { app_data }
    }

    /// Add an application data sub-block
    pub fn add_app_data(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.app_data.push(b.to_vec());
    }

    /// Get the application data sub-blocks
    pub fn app_data(&self) -> &[Vec<u8>] {
        &self.app_data
    }

    /// Get the 11-byte application identifier and auth code
    pub fn app_id(&self) -> &[u8] {
        match self.app_data.first() {
            Some(id) => id,
            None => &[],
        }
    }

    /// Get the animation loop count, if this is a looping extension
    pub fn loop_count(&self) -> Option<u16> {
        // NOTE: this block must follow immediately after GlobalColorTable
        //       (or LogicalScreenDesc if there is no GlobalColorTable).
        let d = &self.app_data;
        let exists = d.len() == 2 &&            // 2 sub-blocks
                     Self::is_looping(&d[0]) && // app ID / auth code
                     d[1].len() == 3 &&         // app data sub-block length
                     d[1][0] == 1; // sub-block ID
        if exists {
            // Number of times to loop animation (zero means loop forever)
            let c = (d[1][1] as u16) << 8 | d[1][2] as u16;
            Some(c)
        } else {
            None
        }
    }
}

/// Unknown extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unknown {
    sub_blocks: Vec<Vec<u8>>, // sequence of sub-blocks (first has ext_id)
}

impl Unknown {
    /// Get the extension ID
    pub fn ext_id(&self) -> &[u8] {
        match self.sub_blocks.first() {
            Some(b) => b,
            None => &[],
        }
    }

    /// Add a sub-block
    pub fn add_sub_block(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.sub_blocks.push(b.to_vec());
    }

    /// Get the sub-blocks following the extension ID
    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        if !self.sub_blocks.is_empty() {
            &self.sub_blocks[1..]
        } else {
            &[]
        }
    }
}

/// Image Descriptor block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    #[allow(dead_code)]
    const RESERVED: u8 = 0b0001_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    /// Adjust the left position
    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }

    /// Get the left position
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Adjust the top position
    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }

    /// Get the top position
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Adjust the width
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Get the width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Adjust the height
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    /// Get the height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Adjust the packed flags
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Get the packed flags
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Adjust the interlaced flag
    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        if interlaced {
            self.flags |= Self::INTERLACED;
        } else {
            self.flags &= !Self::INTERLACED;
        }
        self
    }

    /// Get the interlaced flag
    pub fn interlaced(&self) -> bool {
        (self.flags & Self::INTERLACED) != 0
    }

    fn color_table_existence(&self) -> ColorTableExistence {
        if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        }
    }

    fn color_table_ordering(&self) -> ColorTableOrdering {
        if self.flags & Self::COLOR_TABLE_ORDERING != 0 {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        }
    }

    fn color_table_len(&self) -> usize {
        2 << ((self.flags & Self::COLOR_TABLE_SIZE) as usize)
    }

    /// Get the local color table configuration
    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = self.color_table_existence();
        let ordering = self.color_table_ordering();
        let table_len = self.color_table_len();
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }

    /// Adjust the local color table configuration
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = self.flags & (Self::INTERLACED | Self::RESERVED);
        flags |= tbl.len_bits() & Self::COLOR_TABLE_SIZE;
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
        self
    }

    /// Get the image size, in pixels
    pub fn image_sz(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Local Color Table block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalColorTable {
    colors: Vec<u8>,
}

impl LocalColorTable {
    /// Create a local color table block from RGB triples
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() / CHANNELS * CHANNELS, colors.len());
        let colors = colors.to_vec();
        LocalColorTable { colors }
    }

    /// Get the table length, in bytes
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the color data
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Image Data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Image size, in pixels
    image_sz: usize,
    /// Data; first byte is the LZW minimum code size
    data: Vec<u8>,
}

impl ImageData {
    /// Create a new image data block
    pub fn new(image_sz: usize, min_code_size: u8) -> Self {
        let mut data = Vec::with_capacity(image_sz + 1);
        data.push(min_code_size);
        ImageData { image_sz, data }
    }

    /// Check if all pixels are present
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.image_sz + 1
    }

    /// Add image data (color indices)
    pub fn add_data(&mut self, data: &[u8]) {
        let rem = self.image_sz + 1 - self.data.len();
        if data.len() <= rem {
            self.data.extend_from_slice(data);
        } else {
            self.data.extend_from_slice(&data[..rem]);
            warn!("{} extra bytes of image data ignored", data.len() - rem);
        }
    }

    /// Get the LZW minimum code size, as read
    pub fn min_code_size(&self) -> u8 {
        match self.data.first() {
            Some(sz) => *sz,
            None => 2,
        }
    }

    /// Get the image data (color indices)
    pub fn data(&self) -> &[u8] {
        // Remove the LZW minimum code size
        if !self.data.is_empty() {
            &self.data[1..]
        } else {
            b""
        }
    }
}

/// Trailer block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {}

/// One block of a GIF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Header block
    Header(Header),
    /// Logical screen descriptor block
    LogicalScreenDesc(LogicalScreenDesc),
    /// Global color table block
    GlobalColorTable(GlobalColorTable),
    /// Plain text extension block
    PlainText(PlainText),
    /// Graphic control extension block
    GraphicControl(GraphicControl),
    /// Comment extension block
    Comment(Comment),
    /// Application extension block
    Application(Application),
    /// Unknown extension block
    Unknown(Unknown),
    /// Image descriptor block
    ImageDesc(ImageDesc),
    /// Local color table block
    LocalColorTable(LocalColorTable),
    /// Image data block
    ImageData(ImageData),
    /// Trailer block
    Trailer(Trailer),
}

impl Block {
    /// Check if the block is followed by sub-blocks
    pub fn has_sub_blocks(&self) -> bool {
        use self::Block::*;
        matches!(
            self,
            PlainText(_)
                | GraphicControl(_)
                | Comment(_)
                | Application(_)
                | Unknown(_)
                | ImageData(_)
        )
    }
}

impl From<Header> for Block {
    fn from(b: Header) -> Self {
        Block::Header(b)
    }
}

impl From<LogicalScreenDesc> for Block {
    fn from(b: LogicalScreenDesc) -> Self {
        Block::LogicalScreenDesc(b)
    }
}

impl From<GlobalColorTable> for Block {
    fn from(b: GlobalColorTable) -> Self {
        Block::GlobalColorTable(b)
    }
}

impl From<PlainText> for Block {
    fn from(b: PlainText) -> Self {
        Block::PlainText(b)
    }
}

impl From<GraphicControl> for Block {
    fn from(b: GraphicControl) -> Self {
        Block::GraphicControl(b)
    }
}

impl From<Comment> for Block {
    fn from(b: Comment) -> Self {
        Block::Comment(b)
    }
}

impl From<Application> for Block {
    fn from(b: Application) -> Self {
        Block::Application(b)
    }
}

impl From<Unknown> for Block {
    fn from(b: Unknown) -> Self {
        Block::Unknown(b)
    }
}

impl From<ImageDesc> for Block {
    fn from(b: ImageDesc) -> Self {
        Block::ImageDesc(b)
    }
}

impl From<LocalColorTable> for Block {
    fn from(b: LocalColorTable) -> Self {
        Block::LocalColorTable(b)
    }
}

impl From<ImageData> for Block {
    fn from(b: ImageData) -> Self {
        Block::ImageData(b)
    }
}

impl From<Trailer> for Block {
    fn from(b: Trailer) -> Self {
        Block::Trailer(b)
    }
}

/// Preamble blocks of a GIF file, before any frames
#[derive(Debug, Default, Clone)]
pub struct Preamble {
    /// Header block
    pub header: Header,
    /// Logical screen descriptor block
    pub logical_screen_desc: LogicalScreenDesc,
    /// Global color table block
    pub global_color_table: Option<GlobalColorTable>,
    /// Loop count application extension block
    pub loop_count_ext: Option<Application>,
    /// Comment blocks
    pub comments: Vec<Comment>,
}

impl Preamble {
    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.logical_screen_desc.screen_width()
    }

    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.logical_screen_desc.screen_height()
    }
}

/// One frame of a GIF file
#[derive(Debug, Clone)]
pub struct Frame {
    /// Graphic control extension block
    pub graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor block
    pub image_desc: ImageDesc,
    /// Local color table block
    pub local_color_table: Option<LocalColorTable>,
    /// Image data block
    pub image_data: ImageData,
}

impl Frame {
    /// Create a new frame
    pub fn new(
        graphic_control_ext: Option<GraphicControl>,
        image_desc: ImageDesc,
        local_color_table: Option<LocalColorTable>,
        image_data: ImageData,
    ) -> Self {
        Frame {
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_table_len() {
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            0,
        ); // 0-2
        assert_eq!(t.len_bits(), 0);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            4,
        ); // 3-4
        assert_eq!(t.len_bits(), 1);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            7,
        ); // 5-8
        assert_eq!(t.len_bits(), 2);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            16,
        ); // 9-16
        assert_eq!(t.len_bits(), 3);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            17,
        ); // 17-32
        assert_eq!(t.len_bits(), 4);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            64,
        ); // 33-64
        assert_eq!(t.len_bits(), 5);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            65,
        ); // 65-128
        assert_eq!(t.len_bits(), 6);
        let t = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::NotSorted,
            130,
        ); // 129-256
        assert_eq!(t.len_bits(), 7);
        let t = ColorTableConfig::default();
        assert_eq!(t.len_bits(), 0);
    }

    #[test]
    fn table_size_codes() {
        for s in 0..=7u8 {
            let entries = 2u16 << s;
            let t = ColorTableConfig::new(
                ColorTableExistence::Present,
                ColorTableOrdering::NotSorted,
                entries,
            );
            assert_eq!(t.len_bits(), s);
            assert_eq!(t.size_bytes(), 3 * (2 << s as usize));
        }
    }

    #[test]
    fn loop_count() {
        let b = Application::default();
        assert_eq!(b.loop_count(), None);
        let b = Application::with_loop_count(0);
        assert_eq!(b.loop_count(), Some(0));
        let b = Application::with_loop_count(4);
        assert_eq!(b.loop_count(), Some(4));
    }

    #[test]
    fn disposal_round_trip() {
        for n in 0..=7u8 {
            let d = DisposalMethod::from(n);
            assert_eq!(u8::from(d), n);
        }
        assert_eq!(DisposalMethod::from(0u8), DisposalMethod::NoAction);
        assert_eq!(DisposalMethod::from(1u8), DisposalMethod::Keep);
        assert_eq!(DisposalMethod::from(2u8), DisposalMethod::Background);
        assert_eq!(DisposalMethod::from(3u8), DisposalMethod::Previous);
        assert_eq!(DisposalMethod::from(4u8), DisposalMethod::Reserved(4));
    }

    #[test]
    fn graphic_control_flags() {
        let mut gc = GraphicControl::default();
        assert_eq!(gc.transparent_color(), None);
        gc.set_transparent_color(Some(3));
        assert_eq!(gc.transparent_color(), Some(3));
        gc.set_disposal_method(DisposalMethod::Background);
        assert_eq!(gc.disposal_method(), DisposalMethod::Background);
        assert_eq!(gc.transparent_color(), Some(3));
        gc.set_transparent_color(None);
        assert_eq!(gc.transparent_color(), None);
        assert_eq!(gc.disposal_method(), DisposalMethod::Background);
    }

    #[test]
    fn image_data_overflow() {
        let mut b = ImageData::new(4, 2);
        b.add_data(&[1, 2, 3]);
        assert!(!b.is_complete());
        b.add_data(&[4, 5, 6]);
        assert!(b.is_complete());
        assert_eq!(b.data(), &[1, 2, 3, 4]);
        assert_eq!(b.min_code_size(), 2);
    }
}
