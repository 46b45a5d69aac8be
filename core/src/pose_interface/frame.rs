/// Decoded video frame handed from the capture device to the pose detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Position of the frame in its capture stream.
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    pub fn new(sequence: u64, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            sequence,
            width,
            height,
            pixels,
        }
    }
}
