//! UI components: the attack graph canvas and the collector file picker.

pub mod attack_graph;
mod file_picker;

pub use file_picker::CollectorFilePicker;
