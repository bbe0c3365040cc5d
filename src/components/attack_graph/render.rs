use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::AppState;
use super::types::{Node, NodeKind, Point};

const BACKGROUND: &str = "#2c3e50";
const EDGE_COLOR: &str = "#95a5a6";
const PATH_COLOR: &str = "#e74c3c";
const HIGHLIGHT_COLOR: &str = "#f1c40f";

/// User nodes.
pub const USER_COLOR: &str = "#3498db";
/// Group nodes.
pub const GROUP_COLOR: &str = "#2ecc71";
/// Computers and every other kind.
pub const COMPUTER_COLOR: &str = "#e67e22";
/// High-value nodes, regardless of kind.
pub const HIGH_VALUE_COLOR: &str = HIGHLIGHT_COLOR;

/// Fill color for a node. High-value wins over kind.
pub fn node_color(node: &Node) -> &'static str {
	if node.is_high_value {
		return HIGH_VALUE_COLOR;
	}
	match node.kind {
		NodeKind::User => USER_COLOR,
		NodeKind::Group => GROUP_COLOR,
		_ => COMPUTER_COLOR,
	}
}

/// Text under a node: the identity up to the first `@`.
pub fn short_label(identity: &str) -> &str {
	identity.split('@').next().unwrap_or(identity)
}

/// Draws one frame: background, edges, then nodes on top.
pub fn render(state: &AppState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_edges(state: &AppState, ctx: &CanvasRenderingContext2d) {
	let vp = &state.viewport;
	let (radius, k) = (vp.screen_radius(), vp.zoom);
	let arrow_size = 10.0 * k.clamp(0.4, 1.0);

	for edge in state.store.edges() {
		let (Some(from), Some(to)) = (state.store.node(&edge.from), state.store.node(&edge.to)) else {
			continue;
		};
		let (a, b) = (vp.to_screen(from.position), vp.to_screen(to.position));
		let d = b - a;
		let dist = d.distance(Point::default());
		if dist < 0.001 {
			continue;
		}

		let on_path = state.is_path_edge(edge);
		let color = if on_path { PATH_COLOR } else { EDGE_COLOR };
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(if on_path { 3.0 } else { 1.0 });

		let u = d.scale(1.0 / dist);
		let tip = b - u.scale(radius);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(tip.x, tip.y);
		ctx.stroke();

		let back = tip - u.scale(arrow_size);
		let side = Point::new(-u.y, u.x).scale(arrow_size * 0.5);
		ctx.set_fill_style_str(color);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(back.x + side.x, back.y + side.y);
		ctx.line_to(back.x - side.x, back.y - side.y);
		ctx.close_path();
		ctx.fill();

		if k > state.config.label_zoom_threshold {
			let mid = (a + b).scale(0.5);
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("{}px Arial", (7.0 * k).floor()));
			let _ = ctx.fill_text(&edge.label, mid.x, mid.y);
		}
	}
}

fn draw_nodes(state: &AppState, ctx: &CanvasRenderingContext2d) {
	let vp = &state.viewport;
	let (r, k) = (vp.screen_radius(), vp.zoom);
	ctx.set_text_align("center");

	for node in state.store.nodes() {
		let p = vp.to_screen(node.position);

		if state.is_path_node(&node.identity) {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, r + 6.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(HIGHLIGHT_COLOR);
			ctx.set_line_width(3.0);
			ctx.stroke();
		}

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, r, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node));
		ctx.fill();
		ctx.set_stroke_style_str("white");
		ctx.set_line_width(2.0);
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("bold {}px Arial", (9.0 * k).floor()));
		let _ = ctx.fill_text(short_label(&node.identity), p.x, p.y + r + 12.0);
	}
	ctx.set_text_align("start");
}
