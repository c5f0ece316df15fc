use std::fmt;

use bytes::Bytes;

/// A single image handed to the face detector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFrame {
    /// Encoded or raw pixel data, shared without copying
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// Clockwise rotation the detector must apply to get an upright image
    pub rotation_degrees: u32,
    pub timestamp_millis: i64,
}

impl ImageFrame {
    /// Creates an upright frame stamped with the current time
    pub fn new(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            rotation_degrees: 0,
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Sets the rotation, normalized to [0, 360)
    pub fn with_rotation(mut self, rotation_degrees: u32) -> Self {
        self.rotation_degrees = rotation_degrees % 360;
        self
    }

    /// Overrides the capture time
    pub fn with_timestamp(mut self, timestamp_millis: i64) -> Self {
        self.timestamp_millis = timestamp_millis;
        self
    }
}

type ReleaseHook = Box<dyn FnOnce(&ImageFrame) + Send>;

/// Ownership of a frame borrowed from a capture pipeline.
///
/// The release hook runs exactly once, when the lease is dropped, whether the
/// frame was classified, replaced by a newer frame, or abandoned mid-flight.
pub struct FrameLease {
    image: ImageFrame,
    release: Option<ReleaseHook>,
}

impl FrameLease {
    /// A lease with nothing to give back
    pub fn new(image: ImageFrame) -> Self {
        Self { image, release: None }
    }

    /// A lease that calls `release` once the frame is no longer needed
    pub fn with_release<F>(image: ImageFrame, release: F) -> Self
    where
        F: FnOnce(&ImageFrame) + Send + 'static,
    {
        Self {
            image,
            release: Some(Box::new(release)),
        }
    }

    /// The leased frame
    pub fn image(&self) -> &ImageFrame {
        &self.image
    }

    /// Releases the frame now
    pub fn close(self) {}
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.image);
        }
    }
}

impl fmt::Debug for FrameLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLease")
            .field("image", &self.image)
            .field("releasable", &self.release.is_some())
            .finish()
    }
}

impl From<ImageFrame> for FrameLease {
    fn from(image: ImageFrame) -> Self {
        Self::new(image)
    }
}
