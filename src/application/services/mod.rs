//! Application services

pub mod editor;
pub mod export;
pub mod script;

pub use editor::{EditCommand, EditOutcome, EditorService, Inserted};
pub use export::{deserialize, from_json, render, serialize, to_json, OutlineConvert};
pub use script::{parse_script, run_script, ScriptLine, ScriptReport, ScriptStep, Target};
