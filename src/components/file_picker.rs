use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, HtmlInputElement};

use super::attack_graph::{AppState, IngestError, is_archive, unpack_archive};

/// Contents of one selected file as the reader produced it.
#[derive(Clone, Debug)]
enum Contents {
	Text(String),
	Archive(Vec<u8>),
}

/// Files of one selection, kept in selection order so ingestion does not
/// depend on which reader finishes first.
struct PendingLoad {
	slots: Vec<Option<(String, Contents)>>,
	remaining: usize,
	failed: Option<String>,
}

impl PendingLoad {
	fn new(count: usize) -> Self {
		Self {
			slots: vec![None; count],
			remaining: count,
			failed: None,
		}
	}

	/// Records one finished read. Returns `true` once every read is done.
	fn finish(&mut self, index: usize, name: String, contents: Option<Contents>) -> bool {
		match contents {
			Some(contents) => self.slots[index] = Some((name, contents)),
			None => {
				self.failed.get_or_insert(name);
			}
		}
		self.remaining -= 1;
		self.remaining == 0
	}

	/// `(name, text)` documents of the selection with archives expanded in
	/// place.
	fn documents(&self) -> Result<Vec<(String, String)>, IngestError> {
		if let Some(name) = &self.failed {
			return Err(IngestError::ArchiveRead {
				file: name.clone(),
				reason: "the browser could not read the file".into(),
			});
		}
		let mut documents = Vec::new();
		for (name, contents) in self.slots.iter().flatten() {
			match contents {
				Contents::Text(text) => documents.push((name.clone(), text.clone())),
				Contents::Archive(bytes) => documents.extend(unpack_archive(name, bytes)?),
			}
		}
		Ok(documents)
	}
}

fn apply(app: &Rc<RefCell<AppState>>, pending: &PendingLoad) {
	let mut s = app.borrow_mut();
	let documents = match pending.documents() {
		Ok(documents) => documents,
		Err(e) => {
			s.load_failed(e);
			return;
		}
	};
	let count = documents.len();
	if let Ok(report) = s.load(documents.iter().map(|(name, text)| (name.as_str(), text.as_str()))) {
		info!("{count} documents loaded, {report:?}");
	}
}

fn read(file: File, index: usize, pending: Rc<RefCell<PendingLoad>>, done: Rc<dyn Fn(&PendingLoad)>) {
	let name = file.name();
	let archive = is_archive(&name);
	let reader = match FileReader::new() {
		Ok(reader) => reader,
		Err(_) => {
			error!("no FileReader for {name}");
			if pending.borrow_mut().finish(index, name, None) {
				done(&pending.borrow());
			}
			return;
		}
	};

	let reader_cb = reader.clone();
	let (pending_cb, done_cb, name_cb) = (pending.clone(), done.clone(), name.clone());
	let on_loadend = Closure::<dyn FnMut()>::new(move || {
		let result = reader_cb.result().ok();
		let contents = if archive {
			result
				.filter(|v| v.is_instance_of::<js_sys::ArrayBuffer>())
				.map(|v| Contents::Archive(js_sys::Uint8Array::new(&v).to_vec()))
		} else {
			result.and_then(|v| v.as_string()).map(Contents::Text)
		};
		let finished = pending_cb.borrow_mut().finish(index, name_cb.clone(), contents);
		if finished {
			done_cb(&pending_cb.borrow());
		}
	});
	reader.set_onloadend(Some(on_loadend.as_ref().unchecked_ref()));
	on_loadend.forget();

	let started = if archive {
		reader.read_as_array_buffer(&file)
	} else {
		reader.read_as_text(&file)
	};
	if started.is_err() {
		error!("could not start reading {name}");
		if pending.borrow_mut().finish(index, name, None) {
			done(&pending.borrow());
		}
	}
}

/// File input for collector output: zip archives and loose `.json`
/// documents. A selection replaces the loaded dataset once every file has
/// been read.
#[component]
pub fn CollectorFilePicker(
	/// State whose dataset a selection replaces.
	app: Rc<RefCell<AppState>>,
	/// Status line, updated when the load finishes.
	status: RwSignal<String>,
	/// Detail panel, emptied on load.
	details: RwSignal<String>,
) -> impl IntoView {
	let on_change = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(files) = input.files() else {
			return;
		};
		let count = files.length() as usize;
		if count == 0 {
			return;
		}
		status.set(format!("Reading {count} file(s)..."));

		let pending = Rc::new(RefCell::new(PendingLoad::new(count)));
		let app_done = app.clone();
		let done: Rc<dyn Fn(&PendingLoad)> = Rc::new(move |p: &PendingLoad| {
			apply(&app_done, p);
			status.set(app_done.borrow().status.clone());
			details.set(String::new());
		});
		for (index, file) in (0..files.length()).filter_map(|i| files.get(i)).enumerate() {
			read(file, index, pending.clone(), done.clone());
		}
		input.set_value("");
	};

	view! {
		<label class="toolbar-button">
			"Load ZIP / JSON"
			<input type="file" accept=".zip,.json" multiple=true style="display: none;" on:change=on_change />
		</label>
	}
}

#[cfg(test)]
mod tests {
	use std::io::{Cursor, Write};

	use zip::write::SimpleFileOptions;

	use super::*;
	use crate::components::attack_graph::{FixedPlacement, GraphConfig, Point};

	const GROUPS: &str = r#"{ "data": [
		{ "Properties": { "name": "DOMAIN ADMINS@CORP.LOCAL" },
		  "Members": [ { "ObjectIdentifier": "HELPDESK@CORP.LOCAL" } ] }
	] }"#;
	const USERS: &str = r#"{ "data": [ { "Properties": { "name": "ALICE@CORP.LOCAL" } } ] }"#;

	fn collection(entries: &[(&str, &str)]) -> Vec<u8> {
		let mut buffer = Cursor::new(Vec::new());
		{
			let mut zip = zip::ZipWriter::new(&mut buffer);
			let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
			for (name, content) in entries {
				zip.start_file(*name, options).unwrap();
				zip.write_all(content.as_bytes()).unwrap();
			}
			zip.finish().unwrap();
		}
		buffer.into_inner()
	}

	fn app() -> Rc<RefCell<AppState>> {
		Rc::new(RefCell::new(AppState::new(
			GraphConfig::default(),
			FixedPlacement(Point::default()),
		)))
	}

	#[test]
	fn pending_load_keeps_selection_order() {
		let mut p = PendingLoad::new(2);
		assert!(!p.finish(1, "b.json".into(), Some(Contents::Text("B".into()))));
		assert!(p.finish(0, "a.json".into(), Some(Contents::Text("A".into()))));
		let names: Vec<_> = p.documents().unwrap().into_iter().map(|(n, _)| n).collect();
		assert_eq!(names, ["a.json", "b.json"]);
		assert!(p.failed.is_none());
	}

	#[test]
	fn pending_load_remembers_first_failure() {
		let mut p = PendingLoad::new(3);
		p.finish(0, "a.json".into(), None);
		p.finish(1, "b.json".into(), None);
		assert!(p.finish(2, "c.json".into(), Some(Contents::Text("{}".into()))));
		assert_eq!(p.failed.as_deref(), Some("a.json"));
		assert!(matches!(p.documents(), Err(IngestError::ArchiveRead { file, .. }) if file == "a.json"));
	}

	#[test]
	fn archive_entries_are_loaded_with_their_names_as_categories() {
		let app = app();
		let mut p = PendingLoad::new(1);
		let bytes = collection(&[
			("20240101_groups.json", GROUPS),
			("notes.txt", "not a document"),
			("20240101_users.json", USERS),
		]);
		p.finish(0, "collection.zip".into(), Some(Contents::Archive(bytes)));
		apply(&app, &p);

		let s = app.borrow();
		assert_eq!(s.status, "Loaded 3 objects.");
		let kinds: Vec<_> = s.store.nodes().map(|n| (n.identity.as_str(), n.kind.as_str())).collect();
		assert_eq!(
			kinds,
			[
				("DOMAIN ADMINS@CORP.LOCAL", "Group"),
				("HELPDESK@CORP.LOCAL", "User"),
				("ALICE@CORP.LOCAL", "User"),
			]
		);
	}

	#[test]
	fn corrupt_archive_keeps_previous_graph() {
		let app = app();
		app.borrow_mut().load([("x_users.json", USERS)]).unwrap();

		let mut p = PendingLoad::new(2);
		p.finish(0, "x_groups.json".into(), Some(Contents::Text(GROUPS.into())));
		p.finish(1, "broken.zip".into(), Some(Contents::Archive(b"PK but not really".to_vec())));
		apply(&app, &p);

		let s = app.borrow();
		assert_eq!(s.store.len(), 1);
		assert!(s.status.starts_with("Error: failed to read broken.zip"));
	}
}
