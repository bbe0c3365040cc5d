use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::components::CollectorFilePicker;
use crate::components::attack_graph::{
	AppState, AttackGraphCanvas, COMPUTER_COLOR, GROUP_COLOR, GraphConfig, HIGH_VALUE_COLOR,
	READY_STATUS, RingPlacement, USER_COLOR,
};

const LEGEND: &[(&str, &str)] = &[
	("User", USER_COLOR),
	("Group", GROUP_COLOR),
	("Computer", COMPUTER_COLOR),
	("High Value", HIGH_VALUE_COLOR),
];

/// Explorer page: toolbar, graph canvas, detail panel and status bar.
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphConfig::default();
	let placement = RingPlacement::new(&config, js_sys::Date::now() as u64);
	let app = Rc::new(RefCell::new(AppState::new(config, placement)));

	let status = RwSignal::new(READY_STATUS.to_string());
	let details = RwSignal::new(String::new());
	let query = RwSignal::new(String::new());

	let app_clear = app.clone();
	let on_clear = move |_| {
		let mut s = app_clear.borrow_mut();
		s.clear();
		status.set(s.status.clone());
		details.set(String::new());
	};

	let app_find = app.clone();
	let on_find = move |_| {
		let mut s = app_find.borrow_mut();
		// failures are reported through the status line
		let _ = s.find_path(&query.get_untracked());
		status.set(s.status.clone());
	};

	// `app` is not `Send` and cannot live inside an `ErrorBoundary`.
	view! {
		<div class="explorer" style="display: flex; flex-direction: column; height: 100vh;">
			<div class="toolbar" style="display: flex; align-items: center; gap: 8px; padding: 8px; background: #f8f9fa;">
				<CollectorFilePicker app=app.clone() status=status details=details />
				<button on:click=on_clear>"Clear"</button>
				<label style="margin-left: 20px;">"Start Node:"</label>
				<input
					type="text"
					size="25"
					prop:value=move || query.get()
					on:input=move |ev| query.set(event_target_value(&ev))
				/>
				<button on:click=on_find>"Find Path to Admin"</button>
				<div class="legend" style="margin-left: auto;">
					{LEGEND
						.iter()
						.map(|(name, color)| {
							view! {
								<span style=format!("color: {color}; font-weight: bold; margin: 0 5px;")>
									{*name}
								</span>
							}
						})
						.collect_view()}
				</div>
			</div>

			<div class="main" style="display: flex; flex: 1; min-height: 0;">
				<div class="graph-area" style="flex: 1; min-width: 0;">
					<AttackGraphCanvas app=app status=status details=details query=query />
				</div>
				<div class="detail-panel" style="width: 400px; background: #ecf0f1; display: flex; flex-direction: column;">
					<h2 style="text-align: center;">"Object Details"</h2>
					<pre style="flex: 1; overflow: auto; margin: 5px; padding: 5px; background: white; white-space: pre-wrap;">
						{move || details.get()}
					</pre>
				</div>
			</div>

			<div class="status-bar" style="padding: 4px 8px; background: #34495e; color: white; font-size: 9pt;">
				{move || status.get()}
			</div>
		</div>
	}
}
