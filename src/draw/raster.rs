//! Raster payloads, decoding and the decode side cache.
//!
//! Image bytes travel with primitives and documents as [`ImagePayload`]
//! (base64 when serialized). Decoding to a Cairo surface happens outside the
//! render pass: [`ImageCache::surface`] only reports what is ready and queues
//! misses, and [`ImageCache::process_pending`] performs the decodes. A render
//! that finds a payload still pending draws a placeholder and picks the bitmap
//! up on the next pass.

use base64::{Engine as _, engine::general_purpose};
use image::RgbaImage;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Encoded image bytes (PNG, JPEG, ...) shared between primitives and history
/// snapshots without copying.
#[derive(Clone)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    key: u64,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            key: hasher.finish(),
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content hash used as the cache key.
    pub fn key(&self) -> u64 {
        self.key
    }
}

impl PartialEq for ImagePayload {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.bytes == other.bytes
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.bytes.len())
            .field("key", &format_args!("{:016x}", self.key))
            .finish()
    }
}

impl Serialize for ImagePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(&self.bytes))
    }
}

impl<'de> Deserialize<'de> for ImagePayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map(ImagePayload::new)
            .map_err(serde::de::Error::custom)
    }
}

/// Why a payload could not be turned into a bitmap.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported or corrupt image data: {0}")]
    Image(#[from] image::ImageError),
    #[error("image of {width}x{height} exceeds surface limits")]
    TooLarge { width: u32, height: u32 },
    #[error("failed to create surface: {0}")]
    Surface(#[from] cairo::Error),
    #[error("surface data unavailable: {0}")]
    Borrow(#[from] cairo::BorrowError),
}

/// Decodes image bytes into an ARGB32 Cairo surface.
pub fn decode_raster(bytes: &[u8]) -> Result<cairo::ImageSurface, DecodeError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    rgba_to_surface(&rgba)
}

/// Copies straight RGBA into a premultiplied native-endian ARGB32 surface.
pub fn rgba_to_surface(rgba: &RgbaImage) -> Result<cairo::ImageSurface, DecodeError> {
    let (width, height) = rgba.dimensions();
    let (w, h) = match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(DecodeError::TooLarge { width, height }),
    };

    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, w, h)?;
    let stride = surface.stride() as usize;
    {
        let mut data = surface.data()?;
        for (y, row) in rgba.rows().enumerate() {
            let line = &mut data[y * stride..y * stride + width as usize * 4];
            for (px, out) in row.zip(line.chunks_exact_mut(4)) {
                let [r, g, b, a] = px.0;
                let pm = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
                let argb =
                    (a as u32) << 24 | (pm(r) as u32) << 16 | (pm(g) as u32) << 8 | pm(b) as u32;
                out.copy_from_slice(&argb.to_ne_bytes());
            }
        }
    }
    Ok(surface)
}

/// Copies an ARGB32 surface back to straight RGBA.
pub fn surface_to_rgba(surface: &mut cairo::ImageSurface) -> Result<RgbaImage, DecodeError> {
    surface.flush();
    let width = surface.width().max(0) as u32;
    let height = surface.height().max(0) as u32;
    let stride = surface.stride() as usize;
    let data = surface.data()?;

    let mut rgba = RgbaImage::new(width, height);
    for (y, row) in rgba.rows_mut().enumerate() {
        let line = &data[y * stride..y * stride + width as usize * 4];
        for (px, chunk) in row.zip(line.chunks_exact(4)) {
            let argb = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let a = (argb >> 24) as u8;
            let unpm = |c: u32| {
                let c = (c & 0xff) as u16;
                if a == 0 {
                    0
                } else {
                    ((c * 255 + a as u16 / 2) / a as u16).min(255) as u8
                }
            };
            px.0 = [unpm(argb >> 16), unpm(argb >> 8), unpm(argb), a];
        }
    }
    Ok(rgba)
}

enum CacheEntry {
    Pending(ImagePayload),
    Ready(cairo::ImageSurface),
    Failed,
}

/// Side cache of decoded bitmaps keyed by payload content.
///
/// Never touches primitives. Hosts call [`ImageCache::process_pending`] off
/// the render path (idle callback, timer) and re-render when it returns a
/// non-zero count.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<u64, CacheEntry>,
    queue: VecDeque<u64>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decoded surface if ready; otherwise queues the payload
    /// for decoding and returns `None`.
    pub fn surface(&mut self, payload: &ImagePayload) -> Option<&cairo::ImageSurface> {
        let key = payload.key();
        if !self.entries.contains_key(&key) {
            self.entries
                .insert(key, CacheEntry::Pending(payload.clone()));
            self.queue.push_back(key);
            debug!("Queued image decode ({} bytes)", payload.bytes().len());
        }
        match self.entries.get(&key) {
            Some(CacheEntry::Ready(surface)) => Some(surface),
            _ => None,
        }
    }

    /// True when the payload has been decoded or has definitively failed.
    pub fn is_resolved(&self, payload: &ImagePayload) -> bool {
        matches!(
            self.entries.get(&payload.key()),
            Some(CacheEntry::Ready(_) | CacheEntry::Failed)
        )
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Decodes every queued payload. Returns how many became ready, which is
    /// the signal that a re-render will show new content.
    pub fn process_pending(&mut self) -> usize {
        let mut ready = 0;
        while let Some(key) = self.queue.pop_front() {
            let Some(CacheEntry::Pending(payload)) = self.entries.remove(&key) else {
                continue;
            };
            let entry = match decode_raster(payload.bytes()) {
                Ok(surface) => {
                    ready += 1;
                    CacheEntry::Ready(surface)
                }
                Err(err) => {
                    warn!("Image decode failed, rendering placeholder: {}", err);
                    CacheEntry::Failed
                }
            };
            self.entries.insert(key, entry);
        }
        ready
    }

    /// Queues and decodes the given payloads immediately (used by export).
    pub fn preload<'a>(&mut self, payloads: impl IntoIterator<Item = &'a ImagePayload>) {
        for payload in payloads {
            let _ = self.surface(payload);
        }
        self.process_pending();
    }

    /// Stores a surface decoded elsewhere, replacing any pending entry.
    pub fn insert_decoded(&mut self, payload: &ImagePayload, surface: cairo::ImageSurface) {
        let key = payload.key();
        self.queue.retain(|queued| *queued != key);
        self.entries.insert(key, CacheEntry::Ready(surface));
    }

    /// Drops entries whose payload is no longer referenced.
    pub fn retain(&mut self, live: &[&ImagePayload]) {
        let keep: HashSet<u64> = live.iter().map(|p| p.key()).collect();
        let before = self.entries.len();
        self.entries.retain(|key, _| keep.contains(key));
        self.queue.retain(|key| keep.contains(key));
        if self.entries.len() < before {
            debug!("Evicted {} decoded image(s)", before - self.entries.len());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encodes a solid-color PNG for tests.
    pub(crate) fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn payload_serializes_as_base64() {
        let payload = ImagePayload::new(vec![1u8, 2, 3]);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, "\"AQID\"");
        let back: ImagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn cache_defers_decode_until_processed() {
        let payload = ImagePayload::new(solid_png(4, 3, [255, 0, 0, 255]));
        let mut cache = ImageCache::new();

        assert!(cache.surface(&payload).is_none());
        assert!(cache.has_pending());
        assert_eq!(cache.process_pending(), 1);

        let surface = cache.surface(&payload).unwrap();
        assert_eq!((surface.width(), surface.height()), (4, 3));
    }

    #[test]
    fn failed_decode_is_resolved_without_surface() {
        let payload = ImagePayload::new(b"not an image".to_vec());
        let mut cache = ImageCache::new();
        let _ = cache.surface(&payload);
        assert_eq!(cache.process_pending(), 0);
        assert!(cache.is_resolved(&payload));
        assert!(cache.surface(&payload).is_none());
        assert!(!cache.has_pending());
    }

    #[test]
    fn surface_conversion_preserves_opaque_pixels() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([10, 200, 30, 255]));
        let mut surface = rgba_to_surface(&img).unwrap();
        let back = surface_to_rgba(&mut surface).unwrap();
        assert_eq!(back.get_pixel(1, 1).0, [10, 200, 30, 255]);
    }

    #[test]
    fn retain_evicts_unreferenced_payloads() {
        let kept = ImagePayload::new(solid_png(2, 2, [0, 0, 0, 255]));
        let dropped = ImagePayload::new(solid_png(3, 3, [0, 0, 0, 255]));
        let mut cache = ImageCache::new();
        cache.preload([&kept, &dropped]);
        assert_eq!(cache.len(), 2);

        cache.retain(&[&kept]);
        assert_eq!(cache.len(), 1);
        assert!(cache.is_resolved(&kept));
        assert!(!cache.is_resolved(&dropped));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let bytes = solid_png(64, 64, [0, 0, 0, 255]);
        assert!(decode_raster(&bytes[..40]).is_err());
        assert!(decode_raster(b"junk").is_err());
    }
}
