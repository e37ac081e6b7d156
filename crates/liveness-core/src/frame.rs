/// Raw camera frame as delivered by the capture layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// NV21 pixel data.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Sensor rotation in degrees, clockwise.
    pub rotation: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, rotation: u32) -> Self {
        Self {
            data,
            width,
            height,
            rotation,
        }
    }

    /// Frame size with the long side vertical.
    pub fn portrait_size(&self) -> (u32, u32) {
        if self.width > self.height {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Nv21,
}

/// Image as handed to the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Rotation the detector must apply to get an upright image, 0..360.
    pub rotation_compensation: u32,
    pub format: ImageFormat,
}

impl InputImage {
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            data: frame.data.clone(),
            width: frame.width,
            height: frame.height,
            rotation_compensation: rotation_compensation(frame.rotation),
            format: ImageFormat::Nv21,
        }
    }
}

/// `(360 - rotation) % 360`, with `rotation` first reduced into 0..360.
pub fn rotation_compensation(rotation: u32) -> u32 {
    (360 - rotation % 360) % 360
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_compensation() {
        assert_eq!(rotation_compensation(0), 0);
        assert_eq!(rotation_compensation(90), 270);
        assert_eq!(rotation_compensation(180), 180);
        assert_eq!(rotation_compensation(270), 90);
        assert_eq!(rotation_compensation(360), 0);
        assert_eq!(rotation_compensation(450), 270);
    }

    #[test]
    fn test_portrait_size_flips_landscape() {
        assert_eq!(Frame::new(Vec::new(), 640, 480, 0).portrait_size(), (480, 640));
        assert_eq!(Frame::new(Vec::new(), 480, 640, 0).portrait_size(), (480, 640));
        assert_eq!(Frame::new(Vec::new(), 500, 500, 0).portrait_size(), (500, 500));
    }

    #[test]
    fn test_input_image_carries_compensation() {
        let image = InputImage::from_frame(&Frame::new(vec![1, 2, 3], 4, 2, 90));
        assert_eq!(image.rotation_compensation, 270);
        assert_eq!(image.format, ImageFormat::Nv21);
        assert_eq!(image.data, vec![1, 2, 3]);
    }
}
