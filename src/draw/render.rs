//! Cairo-based scene rendering.

use super::color::{Color, WHITE};
use super::effects::apply_region_effect;
use super::font::FontDescriptor;
use super::primitive::{
    ArrowStyle, HIGHLIGHT_ALPHA, HIGHLIGHT_WIDTH_FACTOR, Primitive, PrimitiveKind, StampStyle,
    stamp_radius, text_font_size,
};
use super::raster::{ImageCache, ImagePayload};
use super::selection::render_selection;
use super::transform::ViewTransform;
use crate::util::{self, Point, Rect};

/// Shown on an empty document.
pub const EMPTY_HINT: &str = "Paste an image (Ctrl+V) to start";

/// Narrowest wrap width for text boxes.
const MIN_TEXT_WRAP_WIDTH: f64 = 20.0;

const HINT_COLOR: Color = Color::rgb8(0xcb, 0xd5, 0xe1);
const GHOST_OUTLINE: Color = Color::rgb8(0x94, 0xa3, 0xb8);
const PLACEHOLDER_OUTLINE: Color = Color::rgb8(0x94, 0xa3, 0xb8);
const CROP_DIM: Color = Color::new(0.0, 0.0, 0.0, 0.5);
const ERASER_FILL: Color = Color::new(0.94, 0.27, 0.27, 0.1);

/// Transient decoration for the gesture in progress.
#[derive(Debug, Clone, Copy)]
pub enum ActiveItem<'a> {
    /// Primitive being drawn (drawn exactly like a committed one)
    Primitive(&'a Primitive),
    /// Text box being sized or edited: dashed ghost box plus the live text
    TextBox {
        bounds: Rect,
        text: &'a str,
        color: Color,
        stroke_width: f64,
    },
    /// Crop marquee: dims everything outside it
    Crop(Rect),
    /// Eraser marquee
    Eraser(Rect),
}

/// Everything one render pass needs.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub background: Option<&'a ImagePayload>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub primitives: &'a [Primitive],
    pub active: Option<ActiveItem<'a>>,
    pub selected: Option<&'a Primitive>,
    pub font: &'a FontDescriptor,
}

/// Renders a full frame.
///
/// Draw order: clear, device scale, background (or blank fill with a hint on
/// empty documents), primitives back-to-front, the active item, and finally
/// the selection decoration so it is never occluded. Region effects inside
/// the primitive list sample what was composited before them.
///
/// The only state consulted besides `scene` is the decode cache. Misses are
/// queued there and drawn as placeholders.
pub fn render_scene(
    ctx: &cairo::Context,
    scene: &Scene<'_>,
    view: &ViewTransform,
    cache: &mut ImageCache,
) {
    let _ = ctx.save();
    ctx.set_operator(cairo::Operator::Clear);
    let _ = ctx.paint();
    let _ = ctx.restore();

    let _ = ctx.save();
    view.apply(ctx);

    render_background(ctx, scene, cache);

    for primitive in scene.primitives {
        render_primitive(ctx, primitive, cache, scene.font);
    }

    if let Some(active) = scene.active {
        render_active(ctx, &active, scene, cache);
    }

    if let Some(selected) = scene.selected {
        render_selection(ctx, selected);
    }

    let _ = ctx.restore();
}

fn render_background(ctx: &cairo::Context, scene: &Scene<'_>, cache: &mut ImageCache) {
    let width = scene.canvas_width as f64;
    let height = scene.canvas_height as f64;

    if let Some(background) = scene.background {
        if let Some(surface) = cache.surface(background) {
            let _ = ctx.set_source_surface(surface, 0.0, 0.0);
            let _ = ctx.paint();
            return;
        }
    }

    WHITE.apply(ctx);
    ctx.rectangle(0.0, 0.0, width, height);
    let _ = ctx.fill();

    let is_empty =
        scene.background.is_none() && scene.primitives.is_empty() && scene.active.is_none();
    if is_empty {
        let layout = pangocairo::functions::create_layout(ctx);
        layout.set_font_description(Some(&scene.font.to_pango(20.0)));
        layout.set_text(EMPTY_HINT);
        let (_, logical) = layout.pixel_extents();
        HINT_COLOR.apply(ctx);
        ctx.move_to(
            (width - logical.width() as f64) / 2.0,
            (height - logical.height() as f64) / 2.0,
        );
        pangocairo::functions::show_layout(ctx, &layout);
    }
}

/// Renders one primitive, inside a rotation bracket for box variants.
pub fn render_primitive(
    ctx: &cairo::Context,
    primitive: &Primitive,
    cache: &mut ImageCache,
    font: &FontDescriptor,
) {
    let _ = ctx.save();
    apply_rotation(ctx, primitive);

    let color = primitive.color;
    let width = primitive.stroke_width;

    match &primitive.kind {
        PrimitiveKind::Pen { points } => render_path(ctx, points, color, width),
        PrimitiveKind::Highlight { points } => render_path(
            ctx,
            points,
            color.with_alpha(HIGHLIGHT_ALPHA),
            width * HIGHLIGHT_WIDTH_FACTOR,
        ),
        PrimitiveKind::HighlightRect { bounds } => {
            let r = bounds.normalized();
            color.with_alpha(HIGHLIGHT_ALPHA).apply(ctx);
            ctx.rectangle(r.x, r.y, r.width, r.height);
            let _ = ctx.fill();
        }
        PrimitiveKind::Rect { bounds } => {
            let r = bounds.normalized();
            ctx.rectangle(r.x, r.y, r.width, r.height);
            stroke_outline(ctx, color, width);
        }
        PrimitiveKind::Ellipse { bounds } => {
            if ellipse_path(ctx, *bounds) {
                stroke_outline(ctx, color, width);
            }
        }
        PrimitiveKind::Triangle { bounds } => {
            triangle_path(ctx, *bounds);
            stroke_outline(ctx, color, width);
        }
        PrimitiveKind::Diamond { bounds } => {
            diamond_path(ctx, *bounds);
            stroke_outline(ctx, color, width);
        }
        PrimitiveKind::Line { bounds } => {
            ctx.move_to(bounds.x, bounds.y);
            ctx.line_to(bounds.right(), bounds.bottom());
            stroke_outline(ctx, color, width);
        }
        PrimitiveKind::Arrow { bounds, style } => {
            render_arrow(ctx, *bounds, *style, color, width);
        }
        PrimitiveKind::Text { bounds, text } => {
            render_text(ctx, *bounds, text, color, width, font);
        }
        PrimitiveKind::Stamp {
            center,
            label,
            style,
        } => render_stamp(ctx, *center, label, *style, color, width, font),
        PrimitiveKind::Pixelate { bounds, style } => apply_region_effect(ctx, *bounds, *style),
        PrimitiveKind::Image { bounds, payload } => render_image(ctx, *bounds, payload, cache),
    }

    let _ = ctx.restore();
}

/// Rotates the context about the primitive's box center.
pub(crate) fn apply_rotation(ctx: &cairo::Context, primitive: &Primitive) {
    let rotation = primitive.effective_rotation();
    if rotation != 0.0 {
        let c = primitive.rotation_center();
        ctx.translate(c.x, c.y);
        ctx.rotate(rotation);
        ctx.translate(-c.x, -c.y);
    }
}

fn stroke_outline(ctx: &cairo::Context, color: Color, width: f64) {
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);
    let _ = ctx.stroke();
}

/// Poly-line through points with round caps and joins.
pub fn render_path(ctx: &cairo::Context, points: &[Point], color: Color, width: f64) {
    let Some(first) = points.first() else {
        return;
    };

    ctx.move_to(first.x, first.y);
    if points.len() == 1 {
        // Zero-length segment so a single click still leaves a round dot.
        ctx.line_to(first.x, first.y);
    }
    for p in &points[1..] {
        ctx.line_to(p.x, p.y);
    }
    stroke_outline(ctx, color, width);
}

/// Ellipse inscribed in the box. Returns false for degenerate boxes.
pub(crate) fn ellipse_path(ctx: &cairo::Context, bounds: Rect) -> bool {
    let r = bounds.normalized();
    if r.width <= 0.0 || r.height <= 0.0 {
        return false;
    }
    let c = r.center();
    let _ = ctx.save();
    ctx.translate(c.x, c.y);
    ctx.scale(r.width / 2.0, r.height / 2.0);
    ctx.new_path();
    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
    let _ = ctx.restore();
    true
}

/// Isosceles triangle: apex at top-center, base along the bottom edge.
pub(crate) fn triangle_path(ctx: &cairo::Context, bounds: Rect) {
    let r = bounds.normalized();
    ctx.move_to(r.x + r.width / 2.0, r.y);
    ctx.line_to(r.right(), r.bottom());
    ctx.line_to(r.x, r.bottom());
    ctx.close_path();
}

/// Rhombus through the edge midpoints.
pub(crate) fn diamond_path(ctx: &cairo::Context, bounds: Rect) {
    let r = bounds.normalized();
    let c = r.center();
    ctx.move_to(c.x, r.y);
    ctx.line_to(r.right(), c.y);
    ctx.line_to(c.x, r.bottom());
    ctx.line_to(r.x, c.y);
    ctx.close_path();
}

/// Arrow from the box origin to the opposite corner (`x + width`, `y + height`).
fn render_arrow(ctx: &cairo::Context, bounds: Rect, style: ArrowStyle, color: Color, width: f64) {
    let start = Point::new(bounds.x, bounds.y);
    let tip = Point::new(bounds.right(), bounds.bottom());
    let head = util::calculate_arrowhead(start, tip, width);

    match style {
        ArrowStyle::Filled => {
            ctx.move_to(start.x, start.y);
            ctx.line_to(head.base.x, head.base.y);
            stroke_outline(ctx, color, width);

            ctx.move_to(head.tip.x, head.tip.y);
            ctx.line_to(head.left.x, head.left.y);
            ctx.line_to(head.right.x, head.right.y);
            ctx.close_path();
            color.apply(ctx);
            let _ = ctx.fill();
        }
        ArrowStyle::Outline => {
            ctx.move_to(start.x, start.y);
            ctx.line_to(tip.x, tip.y);
            ctx.move_to(head.left.x, head.left.y);
            ctx.line_to(tip.x, tip.y);
            ctx.line_to(head.right.x, head.right.y);
            stroke_outline(ctx, color, width);
        }
    }
}

/// Word-wrapped text anchored at the box's top-left corner.
///
/// Embedded newlines start new paragraphs; lines wrap at the box width.
/// Line height is 1.2x the font size (`stroke_width * 6`).
pub fn render_text(
    ctx: &cairo::Context,
    bounds: Rect,
    text: &str,
    color: Color,
    stroke_width: f64,
    font: &FontDescriptor,
) {
    if text.is_empty() {
        return;
    }
    let r = bounds.normalized();
    let layout = text_layout(ctx, text, r.width, stroke_width, font);

    let _ = ctx.save();
    ctx.set_antialias(cairo::Antialias::Best);
    color.apply(ctx);
    ctx.move_to(r.x, r.y);
    pangocairo::functions::show_layout(ctx, &layout);
    let _ = ctx.restore();
}

pub(crate) fn text_layout(
    ctx: &cairo::Context,
    text: &str,
    wrap_width: f64,
    stroke_width: f64,
    font: &FontDescriptor,
) -> pango::Layout {
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.to_pango(text_font_size(stroke_width))));
    layout.set_wrap(pango::WrapMode::WordChar);
    layout.set_width((wrap_width.max(MIN_TEXT_WRAP_WIDTH) * pango::SCALE as f64) as i32);
    layout.set_line_spacing(1.2);
    layout.set_text(text);
    layout
}

/// Filled badge with a white border and a centered bold white label.
fn render_stamp(
    ctx: &cairo::Context,
    center: Point,
    label: &str,
    style: StampStyle,
    color: Color,
    stroke_width: f64,
    font: &FontDescriptor,
) {
    let radius = stamp_radius(stroke_width);
    match style {
        StampStyle::Circle => {
            ctx.new_path();
            ctx.arc(center.x, center.y, radius, 0.0, 2.0 * std::f64::consts::PI);
        }
        StampStyle::Square => {
            ctx.rectangle(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0)
        }
    }
    color.apply(ctx);
    let _ = ctx.fill_preserve();
    WHITE.apply(ctx);
    ctx.set_line_width(2.0);
    let _ = ctx.stroke();

    if label.is_empty() {
        return;
    }
    let layout = pangocairo::functions::create_layout(ctx);
    layout.set_font_description(Some(&font.bold().to_pango(radius * 1.2)));
    layout.set_text(label);
    let (ink, _) = layout.pixel_extents();
    ctx.move_to(
        center.x - ink.x() as f64 - ink.width() as f64 / 2.0,
        center.y - ink.y() as f64 - ink.height() as f64 / 2.0,
    );
    WHITE.apply(ctx);
    pangocairo::functions::show_layout(ctx, &layout);
}

/// Decoded bitmap scaled to the box, or a stroked placeholder while the
/// decode is pending or failed.
fn render_image(
    ctx: &cairo::Context,
    bounds: Rect,
    payload: &ImagePayload,
    cache: &mut ImageCache,
) {
    let r = bounds.normalized();
    match cache.surface(payload) {
        Some(surface) if surface.width() > 0 && surface.height() > 0 && r.width > 0.0 => {
            let _ = ctx.save();
            ctx.translate(r.x, r.y);
            ctx.scale(
                r.width / surface.width() as f64,
                r.height.max(f64::EPSILON) / surface.height() as f64,
            );
            let _ = ctx.set_source_surface(surface, 0.0, 0.0);
            let _ = ctx.paint();
            let _ = ctx.restore();
        }
        _ => {
            ctx.rectangle(r.x, r.y, r.width, r.height);
            PLACEHOLDER_OUTLINE.apply(ctx);
            ctx.set_line_width(1.0);
            let _ = ctx.stroke();
        }
    }
}

fn dashed_box(ctx: &cairo::Context, rect: Rect, color: Color) {
    let r = rect.normalized();
    let _ = ctx.save();
    color.apply(ctx);
    ctx.set_line_width(1.0);
    ctx.set_dash(&[5.0, 5.0], 0.0);
    ctx.rectangle(r.x, r.y, r.width, r.height);
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

fn render_active(
    ctx: &cairo::Context,
    active: &ActiveItem<'_>,
    scene: &Scene<'_>,
    cache: &mut ImageCache,
) {
    match *active {
        ActiveItem::Primitive(primitive) => render_primitive(ctx, primitive, cache, scene.font),
        ActiveItem::TextBox {
            bounds,
            text,
            color,
            stroke_width,
        } => {
            render_text(ctx, bounds, text, color, stroke_width, scene.font);
            dashed_box(ctx, bounds, GHOST_OUTLINE);
        }
        ActiveItem::Crop(rect) => {
            let r = rect.normalized();
            let w = scene.canvas_width as f64;
            let h = scene.canvas_height as f64;
            CROP_DIM.apply(ctx);
            // Above, below, left and right of the selection.
            ctx.rectangle(0.0, 0.0, w, r.y);
            ctx.rectangle(0.0, r.bottom(), w, h - r.bottom());
            ctx.rectangle(0.0, r.y, r.x, r.height);
            ctx.rectangle(r.right(), r.y, w - r.right(), r.height);
            let _ = ctx.fill();
            dashed_box(ctx, r, WHITE);
        }
        ActiveItem::Eraser(rect) => {
            let r = rect.normalized();
            ERASER_FILL.apply(ctx);
            ctx.rectangle(r.x, r.y, r.width, r.height);
            let _ = ctx.fill();
            dashed_box(ctx, r, super::color::RED);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};

    fn surface(w: i32, h: i32) -> cairo::ImageSurface {
        cairo::ImageSurface::create(cairo::Format::ARgb32, w, h).unwrap()
    }

    fn argb(surface: &mut cairo::ImageSurface, x: i32, y: i32) -> u32 {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let o = y as usize * stride + x as usize * 4;
        u32::from_ne_bytes([data[o], data[o + 1], data[o + 2], data[o + 3]])
    }

    fn scene<'a>(primitives: &'a [Primitive], font: &'a FontDescriptor) -> Scene<'a> {
        Scene {
            background: None,
            canvas_width: 100,
            canvas_height: 100,
            primitives,
            active: None,
            selected: None,
            font,
        }
    }

    #[test]
    fn empty_scene_fills_white() {
        let mut target = surface(100, 100);
        let font = FontDescriptor::default();
        {
            let ctx = cairo::Context::new(&target).unwrap();
            render_scene(
                &ctx,
                &scene(&[], &font),
                &ViewTransform::identity(),
                &mut ImageCache::new(),
            );
        }
        assert_eq!(argb(&mut target, 1, 1), 0xffff_ffff);
    }

    #[test]
    fn later_primitives_paint_over_earlier_ones() {
        let mut target = surface(100, 100);
        let font = FontDescriptor::default();
        let under = Primitive::new(
            PrimitiveKind::HighlightRect {
                bounds: Rect::new(10.0, 10.0, 40.0, 40.0),
            },
            BLUE,
            4.0,
        );
        let over = Primitive::new(
            PrimitiveKind::Rect {
                bounds: Rect::new(20.0, 20.0, 20.0, 20.0),
            },
            RED,
            10.0,
        );
        let prims = [under, over];
        {
            let ctx = cairo::Context::new(&target).unwrap();
            render_scene(
                &ctx,
                &scene(&prims, &font),
                &ViewTransform::identity(),
                &mut ImageCache::new(),
            );
        }
        // On the red outline: opaque red.
        assert_eq!(argb(&mut target, 20, 30), 0xffef_4444);
        // Inside the highlight only: translucent blue over white.
        let px = argb(&mut target, 12, 12);
        assert_ne!(px, 0xffff_ffff);
        assert!((px >> 16) & 0xff < 200, "red channel of {:08x}", px);
    }

    #[test]
    fn pending_image_renders_placeholder_then_bitmap() {
        let font = FontDescriptor::default();
        let png = crate::draw::raster::tests::solid_png(2, 2, [0, 255, 0, 255]);
        let image = Primitive::new(
            PrimitiveKind::Image {
                bounds: Rect::new(10.0, 10.0, 40.0, 40.0),
                payload: ImagePayload::new(png),
            },
            RED,
            4.0,
        );
        let prims = [image];
        let mut cache = ImageCache::new();

        let mut first = surface(100, 100);
        {
            let ctx = cairo::Context::new(&first).unwrap();
            render_scene(&ctx, &scene(&prims, &font), &ViewTransform::identity(), &mut cache);
        }
        assert_eq!(argb(&mut first, 30, 30), 0xffff_ffff);
        assert_eq!(cache.process_pending(), 1);

        let mut second = surface(100, 100);
        {
            let ctx = cairo::Context::new(&second).unwrap();
            render_scene(&ctx, &scene(&prims, &font), &ViewTransform::identity(), &mut cache);
        }
        assert_eq!(argb(&mut second, 30, 30), 0xff00_ff00);
    }

    #[test]
    fn crop_marquee_dims_outside_only() {
        let mut target = surface(100, 100);
        let font = FontDescriptor::default();
        let prims = [];
        let mut s = scene(&prims, &font);
        s.active = Some(ActiveItem::Crop(Rect::new(60.0, 60.0, -40.0, -40.0)));
        {
            let ctx = cairo::Context::new(&target).unwrap();
            render_scene(&ctx, &s, &ViewTransform::identity(), &mut ImageCache::new());
        }
        assert_eq!(argb(&mut target, 40, 40), 0xffff_ffff);
        assert_ne!(argb(&mut target, 5, 5), 0xffff_ffff);
        assert_ne!(argb(&mut target, 90, 40), 0xffff_ffff);
    }

    #[test]
    fn device_scale_doubles_geometry() {
        let mut target = surface(200, 200);
        let font = FontDescriptor::default();
        let prims = [Primitive::new(
            PrimitiveKind::HighlightRect {
                bounds: Rect::new(50.0, 50.0, 10.0, 10.0),
            },
            BLUE,
            4.0,
        )];
        {
            let ctx = cairo::Context::new(&target).unwrap();
            render_scene(
                &ctx,
                &scene(&prims, &font),
                &ViewTransform::new(1.0, 2.0),
                &mut ImageCache::new(),
            );
        }
        assert_ne!(argb(&mut target, 110, 110), 0xffff_ffff);
        assert_eq!(argb(&mut target, 90, 90), 0xffff_ffff);
    }
}
