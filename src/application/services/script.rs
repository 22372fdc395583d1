//! Line-oriented edit scripts
//!
//! ```text
//! # comment
//! insert <node> <action|branch|end> [path <n>] [as <alias>]
//! remove <node>
//! relabel <node> [label text...]    (blank label: no change)
//! undo
//! redo
//! ```
//!
//! `<node>` is a literal id or `@alias` bound by an earlier `insert ... as`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::application::services::editor::{EditOutcome, EditorService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeId, NodeKind};

static INSERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^insert\s+(\S+)\s+(\S+)(?:\s+path\s+(\d+))?(?:\s+as\s+([A-Za-z_][A-Za-z0-9_-]*))?$",
    )
    .expect("insert pattern is valid")
});
static REMOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^remove\s+(\S+)$").expect("remove pattern is valid"));
static RELABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^relabel\s+(\S+)(?:\s+(.*))?$").expect("relabel pattern is valid")
});

/// Node reference in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(NodeId),
    Alias(String),
}

impl Target {
    fn parse(token: &str) -> Self {
        match token.strip_prefix('@') {
            Some(alias) => Target::Alias(alias.to_string()),
            None => Target::Id(NodeId::new(token)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Insert {
        parent: Target,
        kind: NodeKind,
        path_index: Option<usize>,
        alias: Option<String>,
    },
    Remove(Target),
    Relabel(Target, String),
    Undo,
    Redo,
}

/// A parsed step with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: ScriptStep,
}

/// Tally of step outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub steps: usize,
    pub committed: usize,
    pub unchanged: usize,
    pub moved: usize,
    pub at_boundary: usize,
}

impl ScriptReport {
    fn record(&mut self, outcome: EditOutcome) {
        self.steps += 1;
        match outcome {
            EditOutcome::Committed => self.committed += 1,
            EditOutcome::Unchanged => self.unchanged += 1,
            EditOutcome::Moved => self.moved += 1,
            EditOutcome::AtBoundary => self.at_boundary += 1,
        }
    }
}

/// Parse a whole script. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> ApplicationResult<Vec<ScriptLine>> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = parse_step(trimmed).map_err(|message| ApplicationError::Script { line, message })?;
        steps.push(ScriptLine { line, step });
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<ScriptStep, String> {
    let keyword = line.split_whitespace().next().unwrap_or_default();
    match keyword {
        "undo" if line == "undo" => Ok(ScriptStep::Undo),
        "redo" if line == "redo" => Ok(ScriptStep::Redo),
        "undo" | "redo" => Err(format!("'{}' takes no arguments", keyword)),
        "insert" => {
            let caps = INSERT_RE.captures(line).ok_or_else(|| {
                "expected: insert <node> <action|branch|end> [path <n>] [as <alias>]".to_string()
            })?;
            let kind = caps[2].parse::<NodeKind>().map_err(|e| e.to_string())?;
            let path_index = match caps.get(3) {
                Some(m) => Some(
                    m.as_str()
                        .parse::<usize>()
                        .map_err(|e| format!("invalid path index '{}': {}", m.as_str(), e))?,
                ),
                None => None,
            };
            Ok(ScriptStep::Insert {
                parent: Target::parse(&caps[1]),
                kind,
                path_index,
                alias: caps.get(4).map(|m| m.as_str().to_string()),
            })
        }
        "remove" => {
            let caps = REMOVE_RE
                .captures(line)
                .ok_or_else(|| "expected: remove <node>".to_string())?;
            Ok(ScriptStep::Remove(Target::parse(&caps[1])))
        }
        "relabel" => {
            let caps = RELABEL_RE
                .captures(line)
                .ok_or_else(|| "expected: relabel <node> [label]".to_string())?;
            let label = caps.get(2).map_or("", |m| m.as_str());
            Ok(ScriptStep::Relabel(
                Target::parse(&caps[1]),
                label.to_string(),
            ))
        }
        other => Err(format!("unknown command '{}'", other)),
    }
}

/// Parse and apply a script to `editor`.
///
/// Stops at the first failing step; steps before it stay applied.
#[instrument(level = "debug", skip(editor, source))]
pub fn run_script(editor: &mut EditorService, source: &str) -> ApplicationResult<ScriptReport> {
    let steps = parse_script(source)?;
    debug!("run_script: {} step(s)", steps.len());

    let mut aliases: HashMap<String, NodeId> = HashMap::new();
    let mut report = ScriptReport::default();

    for ScriptLine { line, step } in steps {
        let resolve = |target: &Target| -> ApplicationResult<NodeId> {
            match target {
                Target::Id(id) => Ok(id.clone()),
                Target::Alias(alias) => {
                    aliases
                        .get(alias)
                        .cloned()
                        .ok_or_else(|| ApplicationError::UnknownAlias {
                            line,
                            alias: alias.clone(),
                        })
                }
            }
        };

        let outcome = match &step {
            ScriptStep::Insert {
                parent,
                kind,
                path_index,
                alias,
            } => {
                let parent = resolve(parent)?;
                let inserted = editor
                    .insert(&parent, *kind, *path_index)
                    .map_err(|e| at_line(line, e))?;
                if let Some(alias) = alias {
                    match inserted.id {
                        Some(id) => {
                            aliases.insert(alias.clone(), id);
                        }
                        None => {
                            warn!("line {}: nothing inserted, @{} left unbound", line, alias);
                            aliases.remove(alias);
                        }
                    }
                }
                inserted.outcome
            }
            ScriptStep::Remove(target) => {
                let node = resolve(target)?;
                editor.remove(&node)
            }
            ScriptStep::Relabel(target, label) => {
                let node = resolve(target)?;
                editor.relabel(&node, label).map_err(|e| at_line(line, e))?
            }
            ScriptStep::Undo => editor.undo(),
            ScriptStep::Redo => editor.redo(),
        };
        debug!("line {}: {:?}", line, outcome);
        report.record(outcome);
    }

    Ok(report)
}

fn at_line(line: usize, error: ApplicationError) -> ApplicationError {
    match error {
        ApplicationError::Domain(source) => ApplicationError::Step { line, source },
        other => other,
    }
}
