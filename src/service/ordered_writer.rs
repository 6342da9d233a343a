// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders a group's settings in declaration order.

use crate::adapters::properties_file::{escape, render_comment, render_value};
use crate::domain::Setting;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EntryKind {
    // Captions sort before the setting they annotate
    Caption,
    Setting,
}

#[derive(Debug)]
struct Entry {
    line_number: u32,
    kind: EntryKind,
    name: String,
    text: String,
}

/// Collects rendered settings and captions and keeps them sorted.
///
/// Entries are ordered by line number; at equal line numbers a caption
/// comes first. Settings without a line number go last, in insertion order.
///
/// Each setting renders as a description comment followed by its values:
///
/// ```text
/// #Socket timeout in seconds (default = 30)
/// timeout=30
/// ```
///
/// Elements after the first one of a list setting are written as
/// `name[i]=value`.
///
/// # Examples
///
/// ```rust
/// use propcfg::domain::Setting;
/// use propcfg::service::OrderedWriter;
/// use std::collections::HashMap;
///
/// let late = Setting::integer(1).named("late").at_line(20).build().unwrap();
/// let early = Setting::integer(2).named("early").at_line(5).build().unwrap();
///
/// let mut writer = OrderedWriter::new();
/// writer.add_setting(&late);
/// writer.add_setting(&early);
/// writer.add_captions(&HashMap::from([("late".to_string(), "Later".to_string())]));
///
/// let text = writer.rendered_lines().concat();
/// assert_eq!(text, "#(default = 2)\nearly=2\n# Later\n#(default = 1)\nlate=1\n");
/// ```
#[derive(Debug, Default)]
pub struct OrderedWriter {
    entries: Vec<Entry>,
    captioned: HashSet<String>,
}

impl OrderedWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rendered entries, captions included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was added yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sort(&mut self) {
        // Stable, so unnumbered settings keep their insertion order
        self.entries.sort_by_key(|e| (e.line_number, e.kind));
    }

    /// Adds the rendering of one setting.
    pub fn add_setting(&mut self, setting: &Setting) {
        let kind = setting.kind();
        let name = setting.name();
        // Multi-line descriptions become one comment line each
        let mut text = render_comment(
            "#",
            &format!(
                "{}(default = {})",
                description_prefix(setting.description()),
                escape(setting.default_value())
            ),
        );
        for (index, value) in setting.values().iter().enumerate() {
            let value = render_value(kind, value);
            if index == 0 {
                text.push_str(&format!("{}={}\n", name, value));
            } else {
                text.push_str(&format!("{}[{}]={}\n", name, index, value));
            }
        }

        self.entries.push(Entry {
            line_number: setting.line_number().unwrap_or(u32::MAX),
            kind: EntryKind::Setting,
            name: name.to_string(),
            text,
        });
        self.sort();
    }

    /// Adds caption lines for settings already in the writer.
    ///
    /// `captions` maps setting names to caption text. Captions for unknown
    /// names are ignored, and a setting gets at most one caption.
    pub fn add_captions(&mut self, captions: &HashMap<String, String>) {
        let mut added = Vec::new();
        for entry in self.entries.iter().filter(|e| e.kind == EntryKind::Setting) {
            if self.captioned.contains(&entry.name) {
                continue;
            }
            if let Some(caption) = captions.get(&entry.name) {
                added.push(Entry {
                    line_number: entry.line_number,
                    kind: EntryKind::Caption,
                    name: entry.name.clone(),
                    text: render_comment("# ", caption),
                });
            }
        }
        if added.is_empty() {
            return;
        }
        self.captioned.extend(added.iter().map(|e| e.name.clone()));
        self.entries.extend(added);
        self.sort();
    }

    /// Returns the rendered entries in order, each ending with a newline.
    pub fn rendered_lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }
}

fn description_prefix(description: &str) -> String {
    if description.is_empty() {
        String::new()
    } else {
        format!("{} ", description)
    }
}
