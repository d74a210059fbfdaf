//! Scene model and Cairo-based rendering.
//!
//! This module defines the core drawing types of an annotation document:
//! - [`Primitive`]: one annotation object (stroke, shape, text, stamp, effect, image)
//! - [`Color`] and [`FontDescriptor`]: styling
//! - [`ViewTransform`]: screen / canvas / device coordinate conversions
//! - [`ImageCache`]: decoded bitmaps for background and image layers
//! - [`render_scene`]: the full render pass

pub mod color;
pub mod effects;
pub mod font;
pub mod primitive;
pub mod raster;
pub mod render;
pub mod selection;
pub mod transform;

pub use color::Color;
pub use font::FontDescriptor;
pub use primitive::{ArrowStyle, PixelateStyle, Primitive, PrimitiveId, PrimitiveKind, StampStyle};
pub use raster::{DecodeError, ImageCache, ImagePayload};
pub use render::{ActiveItem, Scene, render_primitive, render_scene};
pub use transform::ViewTransform;

pub use color::{BLACK, BLUE, GREEN, ORANGE, PALETTE, PURPLE, RED, WHITE, YELLOW};
