use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::AppState;
use super::types::Point;
use super::viewport::{PointerButton, PointerEvent, Response, WheelDirection};

fn button(ev: &MouseEvent) -> PointerButton {
	match ev.button() {
		0 => PointerButton::Primary,
		2 => PointerButton::Secondary,
		_ => PointerButton::Other,
	}
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0))
}

/// Canvas view of the attack graph. Every animation frame redraws `app`;
/// pointer input is routed through [`AppState::pointer`] and its outcome is
/// mirrored into the page signals.
#[component]
pub fn AttackGraphCanvas(
	/// State shared with the toolbar.
	app: Rc<RefCell<AppState>>,
	/// Mirrors `AppState::status`.
	status: RwSignal<String>,
	/// Detail-panel text of the grabbed node.
	details: RwSignal<String>,
	/// Start-node box, filled with the grabbed node.
	query: RwSignal<String>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (app_init, animate_init, resize_cb_init) = (app.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		app_init.borrow_mut().resize(w, h);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let (app_resize, canvas_resize) = (app_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			app_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (app_anim, animate_inner) = (app_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			render::render(&app_anim.borrow(), &ctx);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Canvas-local coordinates of a mouse event.
	let local = move |ev: &MouseEvent| -> Option<Point> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some(Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let dispatch = {
		let app = app.clone();
		move |event: PointerEvent| {
			let mut s = app.borrow_mut();
			let response = s.pointer(event);
			if let Response::Grabbed(node) = &response {
				query.set(node.clone());
				details.set(s.details(node).unwrap_or_default());
			}
			if status.get_untracked() != s.status {
				status.set(s.status.clone());
			}
		}
	};

	let dispatch_md = dispatch.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(at) = local(&ev) {
			dispatch_md(PointerEvent::Press {
				button: button(&ev),
				at,
			});
		}
	};

	let dispatch_mm = dispatch.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(at) = local(&ev) {
			dispatch_mm(PointerEvent::Move { at });
		}
	};

	let dispatch_mu = dispatch.clone();
	let on_mouseup = move |ev: MouseEvent| {
		dispatch_mu(PointerEvent::Release { button: button(&ev) });
	};

	let dispatch_ml = dispatch.clone();
	let on_mouseleave = move |_: MouseEvent| dispatch_ml(PointerEvent::Leave);

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(direction) = WheelDirection::from_delta_y(ev.delta_y()) {
			dispatch(PointerEvent::Wheel { direction });
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="attack-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:contextmenu=|ev: MouseEvent| ev.prevent_default()
			style="display: block; cursor: grab;"
		/>
	}
}
