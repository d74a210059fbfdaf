//! Selection decoration drawn on top of everything else.

use super::color::{BLUE, Color, RED, WHITE};
use super::primitive::Primitive;
use super::render::apply_rotation;
use crate::hit_test::{HANDLE_DRAW_SIZE, Handle, SELECTION_PADDING, handle_positions};

/// Draws the dashed outline and, for unlocked box variants, the eight resize
/// handles plus the rotation handle on its spoke.
///
/// Locked primitives get a red outline and no handles.
pub fn render_selection(ctx: &cairo::Context, primitive: &Primitive) {
    let outline: Color = if primitive.locked { RED } else { BLUE };
    let bbox = primitive.bounding_box();
    let padded = bbox.inflate(SELECTION_PADDING);

    let _ = ctx.save();
    apply_rotation(ctx, primitive);

    outline.apply(ctx);
    ctx.set_line_width(1.0);
    ctx.set_dash(&[5.0, 5.0], 0.0);
    ctx.rectangle(padded.x, padded.y, padded.width, padded.height);
    let _ = ctx.stroke();
    ctx.set_dash(&[], 0.0);

    if primitive.has_handles() {
        let handles = handle_positions(&bbox);
        let top_center = padded.x + padded.width / 2.0;

        // Spoke from the top edge to the rotation knob.
        ctx.move_to(top_center, padded.y);
        if let Some((_, knob)) = handles.iter().find(|(h, _)| *h == Handle::Rotate) {
            ctx.line_to(knob.x, knob.y);
        }
        outline.apply(ctx);
        let _ = ctx.stroke();

        let half = HANDLE_DRAW_SIZE / 2.0;
        for (handle, p) in handles {
            if handle == Handle::Rotate {
                ctx.new_path();
                ctx.arc(p.x, p.y, half, 0.0, 2.0 * std::f64::consts::PI);
            } else {
                ctx.rectangle(p.x - half, p.y - half, HANDLE_DRAW_SIZE, HANDLE_DRAW_SIZE);
            }
            WHITE.apply(ctx);
            let _ = ctx.fill_preserve();
            outline.apply(ctx);
            let _ = ctx.stroke();
        }
    }

    let _ = ctx.restore();
}
