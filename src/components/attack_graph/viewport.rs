use log::debug;

use super::config::GraphConfig;
use super::store::GraphStore;
use super::types::Point;

/// Mouse button, as far as the gestures care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	/// Grabs and drags nodes.
	Primary,
	/// Pans the view.
	Secondary,
	/// Ignored.
	Other,
}

/// One wheel notch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
	/// Away from the user: zoom in.
	Up,
	/// Toward the user: zoom out.
	Down,
}

impl WheelDirection {
	/// Direction of a DOM wheel event's `deltaY`. Purely horizontal scrolls
	/// report zero and are not a notch.
	pub fn from_delta_y(delta_y: f64) -> Option<Self> {
		if delta_y < 0.0 {
			Some(Self::Up)
		} else if delta_y > 0.0 {
			Some(Self::Down)
		} else {
			None
		}
	}
}

/// Normalized pointer input, in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
	/// A button went down.
	Press {
		/// Which button.
		button: PointerButton,
		/// Where, on screen.
		at: Point,
	},
	/// The pointer moved.
	Move {
		/// New screen position.
		at: Point,
	},
	/// A button went up.
	Release {
		/// Which button.
		button: PointerButton,
	},
	/// One wheel notch.
	Wheel {
		/// Zoom in or out.
		direction: WheelDirection,
	},
	/// Pointer left the surface; ends any gesture.
	Leave,
}

/// Current gesture. Exactly one is active at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	/// No button held.
	#[default]
	Idle,
	/// Primary button held on a node.
	Dragging {
		/// Identity of the grabbed node.
		node: String,
		/// Screen position of the previous event.
		last: Point,
	},
	/// Secondary button held.
	Panning {
		/// Screen position of the previous event.
		last: Point,
	},
}

/// What an event did, for the caller to reflect in the UI.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
	/// Nothing changed.
	Ignored,
	/// Idle motion: the node under the pointer, if any.
	Hover(Option<String>),
	/// A primary press picked up this node.
	Grabbed(String),
	/// The grabbed node moved.
	Dragged,
	/// A secondary press started panning.
	PanStarted,
	/// The view moved.
	Panned,
	/// The gesture ended.
	Released,
	/// New zoom factor after a wheel notch.
	Zoomed(f64),
}

/// Zoom, pan and the pointer state machine.
///
/// `screen = world * zoom + pan`. Zoom is always about the world origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Scale from world to screen.
	pub zoom: f64,
	/// Screen offset of the world origin.
	pub pan: Point,
	/// Gesture in progress.
	pub interaction: Interaction,
	node_radius: f64,
	zoom_in_step: f64,
	zoom_out_step: f64,
	zoom_bounds: Option<(f64, f64)>,
}

impl Viewport {
	/// Identity transform, idle. Reversed zoom bounds are swapped and bounds
	/// that are not numbers are dropped.
	pub fn new(config: &GraphConfig) -> Self {
		let zoom_bounds = config
			.zoom_bounds
			.filter(|(min, max)| !min.is_nan() && !max.is_nan())
			.map(|(min, max)| (min.min(max), min.max(max)));
		Self {
			zoom: 1.0,
			pan: Point::default(),
			interaction: Interaction::Idle,
			node_radius: config.node_radius,
			zoom_in_step: config.zoom_in_step,
			zoom_out_step: config.zoom_out_step,
			zoom_bounds,
		}
	}

	/// World to screen.
	pub fn to_screen(&self, world: Point) -> Point {
		world.scale(self.zoom) + self.pan
	}

	/// Drawn node radius at the current zoom.
	pub fn screen_radius(&self) -> f64 {
		self.node_radius * self.zoom
	}

	/// Nearest node whose drawn disc contains `at`. On equal distance the
	/// later node wins, since it is drawn on top.
	pub fn node_at(&self, store: &GraphStore, at: Point) -> Option<String> {
		let radius = self.screen_radius();
		let mut best: Option<(f64, &str)> = None;
		for node in store.nodes() {
			let d = self.to_screen(node.position).distance(at);
			if d > radius {
				continue;
			}
			if best.is_none_or(|(bd, _)| d <= bd) {
				best = Some((d, node.identity.as_str()));
			}
		}
		best.map(|(_, id)| id.to_string())
	}

	/// Whether a node is being dragged.
	pub fn is_dragging(&self) -> bool {
		matches!(self.interaction, Interaction::Dragging { .. })
	}

	/// Whether the view is being panned.
	pub fn is_panning(&self) -> bool {
		matches!(self.interaction, Interaction::Panning { .. })
	}

	/// Node currently being dragged.
	pub fn dragged(&self) -> Option<&str> {
		match &self.interaction {
			Interaction::Dragging { node, .. } => Some(node),
			_ => None,
		}
	}

	/// Multiplies the zoom by one wheel step, then applies the optional clamp.
	pub fn zoom_by(&mut self, direction: WheelDirection) -> f64 {
		let step = match direction {
			WheelDirection::Up => self.zoom_in_step,
			WheelDirection::Down => self.zoom_out_step,
		};
		self.zoom *= step;
		if let Some((min, max)) = self.zoom_bounds {
			self.zoom = self.zoom.clamp(min, max);
		}
		self.zoom
	}

	fn drag_or_pan(&mut self, store: &mut GraphStore, at: Point) -> Response {
		let zoom = self.zoom;
		match &mut self.interaction {
			Interaction::Idle => Response::Ignored,
			Interaction::Dragging { node, last } => {
				let delta = (at - *last).scale(1.0 / zoom);
				*last = at;
				if let Some(n) = store.node_mut(node) {
					n.position += delta;
				}
				Response::Dragged
			}
			Interaction::Panning { last } => {
				let delta = at - *last;
				*last = at;
				self.pan += delta;
				Response::Panned
			}
		}
	}

	/// Feeds one event through the state machine. Drag moves write straight
	/// into the dragged node's world position.
	pub fn handle(&mut self, store: &mut GraphStore, event: PointerEvent) -> Response {
		match event {
			PointerEvent::Press {
				button: PointerButton::Primary,
				at,
			} => {
				if self.is_panning() {
					return Response::Ignored;
				}
				match self.node_at(store, at) {
					Some(node) => {
						debug!("drag start {node}");
						self.interaction = Interaction::Dragging {
							node: node.clone(),
							last: at,
						};
						Response::Grabbed(node)
					}
					None => Response::Ignored,
				}
			}
			PointerEvent::Press {
				button: PointerButton::Secondary,
				at,
			} => {
				self.interaction = Interaction::Panning { last: at };
				Response::PanStarted
			}
			PointerEvent::Press { .. } => Response::Ignored,
			PointerEvent::Move { at } => {
				if self.interaction == Interaction::Idle {
					return Response::Hover(self.node_at(store, at));
				}
				self.drag_or_pan(store, at)
			}
			PointerEvent::Release { button } => {
				let ends = matches!(
					(&self.interaction, button),
					(Interaction::Dragging { .. }, PointerButton::Primary)
						| (Interaction::Panning { .. }, PointerButton::Secondary)
				);
				if !ends {
					return Response::Ignored;
				}
				self.interaction = Interaction::Idle;
				Response::Released
			}
			PointerEvent::Wheel { direction } => Response::Zoomed(self.zoom_by(direction)),
			PointerEvent::Leave => {
				if self.interaction == Interaction::Idle {
					return Response::Hover(None);
				}
				self.interaction = Interaction::Idle;
				Response::Released
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::attack_graph::store::FixedPlacement;
	use crate::components::attack_graph::types::NodeKind;

	fn setup(at: Point) -> (Viewport, GraphStore) {
		let config = GraphConfig::default();
		let mut store = GraphStore::new(&config, FixedPlacement(at));
		store.upsert_node("ALICE", NodeKind::User, None);
		(Viewport::new(&config), store)
	}

	fn press(button: PointerButton, x: f64, y: f64) -> PointerEvent {
		PointerEvent::Press {
			button,
			at: Point::new(x, y),
		}
	}

	fn move_to(x: f64, y: f64) -> PointerEvent {
		PointerEvent::Move { at: Point::new(x, y) }
	}

	#[test]
	fn forward_mapping() {
		let (mut vp, _) = setup(Point::default());
		vp.zoom = 2.0;
		vp.pan = Point::new(10.0, -5.0);
		assert_eq!(vp.to_screen(Point::new(3.0, 4.0)), Point::new(16.0, 3.0));
	}

	#[test]
	fn drag_is_scaled_by_zoom() {
		let (mut vp, mut store) = setup(Point::new(50.0, 50.0));
		vp.zoom = 2.0;
		// node is drawn at (100, 100)
		assert_eq!(
			vp.handle(&mut store, press(PointerButton::Primary, 100.0, 100.0)),
			Response::Grabbed("ALICE".into())
		);
		assert_eq!(vp.handle(&mut store, move_to(110.0, 120.0)), Response::Dragged);
		assert_eq!(store.node("ALICE").unwrap().position, Point::new(55.0, 60.0));
		vp.handle(&mut store, move_to(110.0, 120.0));
		assert_eq!(store.node("ALICE").unwrap().position, Point::new(55.0, 60.0));

		assert_eq!(
			vp.handle(&mut store, PointerEvent::Release { button: PointerButton::Primary }),
			Response::Released
		);
		assert_eq!(vp.interaction, Interaction::Idle);
		vp.handle(&mut store, move_to(0.0, 0.0));
		assert_eq!(store.node("ALICE").unwrap().position, Point::new(55.0, 60.0));
	}

	#[test]
	fn press_on_empty_space_stays_idle() {
		let (mut vp, mut store) = setup(Point::new(50.0, 50.0));
		assert_eq!(
			vp.handle(&mut store, press(PointerButton::Primary, 300.0, 300.0)),
			Response::Ignored
		);
		assert_eq!(vp.interaction, Interaction::Idle);
	}

	#[test]
	fn hit_radius_follows_zoom() {
		let (mut vp, store) = setup(Point::new(100.0, 0.0));
		assert!(vp.node_at(&store, Point::new(114.0, 0.0)).is_some());
		vp.zoom = 0.5;
		// node drawn at (50, 0) with radius 7.5
		assert!(vp.node_at(&store, Point::new(57.0, 0.0)).is_some());
		assert!(vp.node_at(&store, Point::new(58.0, 0.0)).is_none());
	}

	#[test]
	fn nearest_node_wins() {
		let config = GraphConfig::default();
		let mut store = GraphStore::new(&config, FixedPlacement(Point::default()));
		store.upsert_node("A", NodeKind::User, None);
		store.upsert_node("B", NodeKind::User, None);
		store.node_mut("B").unwrap().position = Point::new(10.0, 0.0);
		let vp = Viewport::new(&config);
		assert_eq!(vp.node_at(&store, Point::new(3.0, 0.0)).as_deref(), Some("A"));
		assert_eq!(vp.node_at(&store, Point::new(5.0, 0.0)).as_deref(), Some("B"));
	}

	#[test]
	fn pan_adds_raw_delta() {
		let (mut vp, mut store) = setup(Point::default());
		vp.zoom = 3.0;
		assert_eq!(
			vp.handle(&mut store, press(PointerButton::Secondary, 10.0, 10.0)),
			Response::PanStarted
		);
		vp.handle(&mut store, move_to(15.0, 30.0));
		vp.handle(&mut store, move_to(20.0, 30.0));
		assert_eq!(vp.pan, Point::new(10.0, 20.0));
		assert_eq!(store.node("ALICE").unwrap().position, Point::default());

		assert_eq!(
			vp.handle(&mut store, PointerEvent::Release { button: PointerButton::Primary }),
			Response::Ignored
		);
		assert!(vp.is_panning());
		vp.handle(&mut store, PointerEvent::Release { button: PointerButton::Secondary });
		assert_eq!(vp.interaction, Interaction::Idle);
	}

	#[test]
	fn secondary_press_cancels_drag() {
		let (mut vp, mut store) = setup(Point::default());
		vp.handle(&mut store, press(PointerButton::Primary, 0.0, 0.0));
		assert_eq!(vp.dragged(), Some("ALICE"));
		vp.handle(&mut store, press(PointerButton::Secondary, 0.0, 0.0));
		assert!(vp.is_panning());
		assert_eq!(vp.dragged(), None);
	}

	#[test]
	fn idle_motion_only_hovers() {
		let (mut vp, mut store) = setup(Point::default());
		assert_eq!(
			vp.handle(&mut store, move_to(1.0, 1.0)),
			Response::Hover(Some("ALICE".into()))
		);
		assert_eq!(vp.handle(&mut store, move_to(100.0, 1.0)), Response::Hover(None));
		assert_eq!(vp.pan, Point::default());
	}

	#[test]
	fn wheel_zoom_is_unbounded_by_default() {
		let (mut vp, mut store) = setup(Point::default());
		for _ in 0..100 {
			vp.handle(&mut store, PointerEvent::Wheel { direction: WheelDirection::Down });
		}
		assert!(vp.zoom < 1e-4);
		let (mut vp, _) = setup(Point::default());
		assert_eq!(vp.zoom_by(WheelDirection::Up), 1.1);
		assert_eq!(vp.zoom_by(WheelDirection::Down), 1.1 * 0.9);
	}

	#[test]
	fn configured_zoom_bounds_clamp() {
		let config = GraphConfig {
			zoom_bounds: Some((0.5, 2.0)),
			..GraphConfig::default()
		};
		let mut vp = Viewport::new(&config);
		for _ in 0..20 {
			vp.zoom_by(WheelDirection::Up);
		}
		assert_eq!(vp.zoom, 2.0);
		for _ in 0..40 {
			vp.zoom_by(WheelDirection::Down);
		}
		assert_eq!(vp.zoom, 0.5);
	}

	#[test]
	fn reversed_zoom_bounds_are_swapped() {
		let config: GraphConfig = serde_json::from_str(r#"{ "zoom_bounds": [10.0, 0.1] }"#).unwrap();
		let mut vp = Viewport::new(&config);
		assert_eq!(vp.zoom_by(WheelDirection::Up), 1.1);
		for _ in 0..100 {
			vp.zoom_by(WheelDirection::Down);
		}
		assert_eq!(vp.zoom, 0.1);

		let nan = GraphConfig {
			zoom_bounds: Some((f64::NAN, 2.0)),
			..GraphConfig::default()
		};
		let mut vp = Viewport::new(&nan);
		for _ in 0..20 {
			vp.zoom_by(WheelDirection::Up);
		}
		assert!(vp.zoom > 2.0);
	}

	#[test]
	fn wheel_direction_from_delta() {
		assert_eq!(WheelDirection::from_delta_y(-120.0), Some(WheelDirection::Up));
		assert_eq!(WheelDirection::from_delta_y(3.0), Some(WheelDirection::Down));
		// horizontal swipe or shift+wheel
		assert_eq!(WheelDirection::from_delta_y(0.0), None);
		assert_eq!(WheelDirection::from_delta_y(-0.0), None);
	}

	#[test]
	fn leave_ends_gesture() {
		let (mut vp, mut store) = setup(Point::default());
		vp.handle(&mut store, press(PointerButton::Primary, 0.0, 0.0));
		assert_eq!(vp.handle(&mut store, PointerEvent::Leave), Response::Released);
		assert_eq!(vp.interaction, Interaction::Idle);
	}
}
