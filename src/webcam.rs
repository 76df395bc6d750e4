// thin wrapper around openpnp_capture
use image::{DynamicImage, RgbImage};
use log::{info, warn};
use openpnp_capture::{Device, Format, Stream};

use crate::error::{Error, Result};
use crate::settings::CameraSettings;

/// Anything that yields RGB frames until it runs dry.
pub trait FrameSource {
    /// Blocks until the next frame. `None` once the source can no longer
    /// deliver frames.
    fn read_frame(&mut self) -> Option<DynamicImage>;
}

pub struct OpenpnpCamera {
    stream: Stream,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl OpenpnpCamera {
    pub fn open(settings: &CameraSettings) -> Result<OpenpnpCamera> {
        let devices = Device::enumerate();
        info!("There are {} available cameras.", devices.len());

        let id = *devices
            .get(settings.index)
            .ok_or_else(|| Error::Camera(format!("no camera at index {}", settings.index)))?;
        let device = Device::new(id)
            .ok_or_else(|| Error::Camera(format!("failed to open camera {}", settings.index)))?;

        let format = Format::default()
            .width(settings.width)
            .height(settings.height)
            .fps(settings.fps);
        let stream = Stream::new(&device, &format)
            .ok_or_else(|| Error::Camera(format!("failed to open stream on camera {}", settings.index)))?;

        let actual = stream.format();
        info!(
            "Opened camera {} ({}x{} @ {} fps)",
            settings.index, actual.width, actual.height, actual.fps
        );

        Ok(OpenpnpCamera {
            stream,
            width: actual.width,
            height: actual.height,
            buffer: Vec::new(),
        })
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for OpenpnpCamera {
    fn read_frame(&mut self) -> Option<DynamicImage> {
        self.stream.advance();
        if let Err(err) = self.stream.read(&mut self.buffer) {
            warn!("Camera read failed: {:?}", err);
            return None;
        }

        // the stream hands out packed RGB24
        let expected = (self.width * self.height * 3) as usize;
        if self.buffer.len() < expected {
            warn!(
                "Camera delivered a short frame ({} of {} bytes)",
                self.buffer.len(),
                expected
            );
            return None;
        }

        let frame = RgbImage::from_raw(self.width, self.height, self.buffer[..expected].to_vec())?;
        Some(DynamicImage::ImageRgb8(frame))
    }
}

impl Drop for OpenpnpCamera {
    fn drop(&mut self) {
        info!("Released camera");
    }
}
