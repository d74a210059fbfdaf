//! Region effects: pixelate and blur over already-composited pixels.
//!
//! Both effects read back whatever the target surface holds beneath the
//! region at the moment they run, so they must be emitted after everything
//! stacked below them and before anything stacked above. The renderer calls
//! [`apply_region_effect`] in list order to keep that guarantee.
//!
//! Work happens in device pixels: the region is mapped through the context's
//! current matrix (zoom, pixel ratio and the primitive's rotation), the
//! covering device rectangle is copied to a scratch surface, processed, and
//! painted back clipped to the region outline.

use super::primitive::PixelateStyle;
use super::raster::{rgba_to_surface, surface_to_rgba};
use super::transform::device_bounds;
use crate::util::Rect;
use image::imageops;
use log::debug;

/// Mosaic block edge in device pixels.
pub const PIXEL_BLOCK_SIZE: i32 = 10;

/// Gaussian sigma in device pixels.
pub const BLUR_SIGMA: f32 = 8.0;

/// Applies a region effect to the pixels under `bounds` (user space).
///
/// Degenerate regions, regions entirely off-surface and non-image targets
/// are skipped silently.
pub fn apply_region_effect(ctx: &cairo::Context, bounds: Rect, style: PixelateStyle) {
    if bounds.is_smaller_than(1.0) {
        debug!("Skipping {:?} effect on degenerate region {:?}", style, bounds);
        return;
    }

    let Ok(target) = cairo::ImageSurface::try_from(ctx.target()) else {
        debug!("Region effect needs an image surface target; skipping");
        return;
    };
    let Some((x0, y0, width, height)) =
        device_bounds(ctx, bounds, target.width(), target.height())
    else {
        debug!("Effect region {:?} is off-surface; skipping", bounds);
        return;
    };

    let Some(mut scratch) = copy_device_region(&target, x0, y0, width, height) else {
        return;
    };
    drop(target);

    let processed = match style {
        PixelateStyle::Pixel => {
            pixelate_in_place(&mut scratch, PIXEL_BLOCK_SIZE);
            Some(scratch)
        }
        PixelateStyle::Blur => blur_surface(&mut scratch, BLUR_SIGMA),
    };
    let Some(processed) = processed else {
        return;
    };

    let r = bounds.normalized();
    let _ = ctx.save();
    ctx.rectangle(r.x, r.y, r.width, r.height);
    ctx.clip();
    ctx.identity_matrix();
    ctx.set_operator(cairo::Operator::Source);
    if ctx
        .set_source_surface(&processed, x0 as f64, y0 as f64)
        .is_ok()
    {
        let _ = ctx.paint();
    }
    let _ = ctx.restore();
}

fn copy_device_region(
    source: &cairo::ImageSurface,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> Option<cairo::ImageSurface> {
    let scratch = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).ok()?;
    {
        let sctx = cairo::Context::new(&scratch).ok()?;
        sctx.set_operator(cairo::Operator::Source);
        sctx.set_source_surface(source, -(x as f64), -(y as f64)).ok()?;
        sctx.paint().ok()?;
    }
    scratch.flush();
    Some(scratch)
}

/// Replaces each `block`x`block` cell with the color of its center pixel.
///
/// Operates on premultiplied ARGB32 data directly; copying whole pixels needs
/// no conversion.
pub fn pixelate_in_place(surface: &mut cairo::ImageSurface, block: i32) {
    let width = surface.width();
    let height = surface.height();
    let stride = surface.stride() as usize;
    let block = block.max(1);
    let Ok(mut data) = surface.data() else {
        return;
    };

    let mut by = 0;
    while by < height {
        let bh = block.min(height - by);
        let mut bx = 0;
        while bx < width {
            let bw = block.min(width - bx);
            let sx = (bx + bw / 2) as usize;
            let sy = (by + bh / 2) as usize;
            let offset = sy * stride + sx * 4;
            let mut sample = [0u8; 4];
            sample.copy_from_slice(&data[offset..offset + 4]);

            for y in by..by + bh {
                let row = y as usize * stride;
                for x in bx..bx + bw {
                    let o = row + x as usize * 4;
                    data[o..o + 4].copy_from_slice(&sample);
                }
            }
            bx += block;
        }
        by += block;
    }
}

fn blur_surface(surface: &mut cairo::ImageSurface, sigma: f32) -> Option<cairo::ImageSurface> {
    let rgba = surface_to_rgba(surface).ok()?;
    let blurred = imageops::blur(&rgba, sigma);
    rgba_to_surface(&blurred).ok()
}
