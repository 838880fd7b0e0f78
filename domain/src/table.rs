//! Host-side representation of an interpreter table
//!
//! A Lua table is both array and map. The host side commits to one of a
//! small set of shapes (`TableKind`) the moment the first element is added,
//! then enforces that shape for every later element. Contradictions fail
//! with `InconsistentTableShape` instead of silently reshuffling entries;
//! see DESIGN.md for the policy rationale.

use crate::error::BridgeError;
use crate::value::ScriptValue;

/// Shape of a materialized table, decided incrementally during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// No elements seen yet.
    Unknown,
    /// Consecutive integer keys from 1, all values integers.
    IntList,
    /// Consecutive integer keys from 1, all values floats.
    FloatList,
    /// Consecutive integer keys from 1, all values strings.
    StringList,
    /// String-keyed map. Integer keys are stored as their decimal text.
    Dictionary,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::IntList => "int list",
            Self::FloatList => "float list",
            Self::StringList => "string list",
            Self::Dictionary => "dict",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::IntList | Self::FloatList | Self::StringList)
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for TableKind {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A table key as the interpreter presents it: integer or string.
/// Anything else is rejected during materialization.
#[derive(Debug, Clone, PartialEq)]
pub enum TableKey {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Insertion-ordered key/value collection mirroring one interpreter table.
///
/// Keys are stored as text regardless of their source type; the `kind`
/// discriminant records what shape the key/value stream turned out to be.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptTable {
    kind: TableKind,
    entries: Vec<(String, ScriptValue)>,
}

impl ScriptTable {
    pub fn new() -> Self {
        Self {
            kind: TableKind::Unknown,
            entries: Vec::new(),
        }
    }

    /// Build an int list the way the serializer expects it: keys 1..=len.
    pub fn from_int_list(values: &[i64]) -> Self {
        Self {
            kind: if values.is_empty() {
                TableKind::Unknown
            } else {
                TableKind::IntList
            },
            entries: values
                .iter()
                .enumerate()
                .map(|(i, v)| ((i + 1).to_string(), ScriptValue::Integer(*v)))
                .collect(),
        }
    }

    pub fn from_float_list(values: &[f64]) -> Self {
        Self {
            kind: if values.is_empty() {
                TableKind::Unknown
            } else {
                TableKind::FloatList
            },
            entries: values
                .iter()
                .enumerate()
                .map(|(i, v)| ((i + 1).to_string(), ScriptValue::Float(*v)))
                .collect(),
        }
    }

    pub fn from_string_list<S: Into<String>>(values: Vec<S>) -> Self {
        let entries: Vec<_> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), ScriptValue::String(v.into())))
            .collect();
        Self {
            kind: if entries.is_empty() {
                TableKind::Unknown
            } else {
                TableKind::StringList
            },
            entries,
        }
    }

    /// Build a dictionary from string-keyed pairs, preserving order.
    pub fn from_pairs<K: Into<String>>(pairs: Vec<(K, ScriptValue)>) -> Self {
        Self {
            kind: TableKind::Dictionary,
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one element, enforcing shape consistency on the fly.
    ///
    /// The first element decides the kind: integer key 1 with a scalar
    /// int/float/string value seeds the matching list kind; everything else
    /// seeds a dictionary. Once a list, every later element must carry the
    /// next consecutive integer key and the same scalar subtype, else this
    /// fails and the table must be discarded by the caller.
    pub fn add(&mut self, key: TableKey, value: ScriptValue) -> Result<(), BridgeError> {
        match self.kind {
            TableKind::Unknown => {
                self.kind = match (&key, &value) {
                    (TableKey::Int(1), ScriptValue::Integer(_)) => TableKind::IntList,
                    (TableKey::Int(1), ScriptValue::Float(_)) => TableKind::FloatList,
                    (TableKey::Int(1), ScriptValue::String(_)) => TableKind::StringList,
                    _ => TableKind::Dictionary,
                };
                self.entries.push((key.to_string(), value));
                Ok(())
            }
            TableKind::IntList | TableKind::FloatList | TableKind::StringList => {
                let expected = self.entries.len() as i64 + 1;
                let consecutive = matches!(key, TableKey::Int(n) if n == expected);
                let matching = match self.kind {
                    TableKind::IntList => matches!(value, ScriptValue::Integer(_)),
                    TableKind::FloatList => matches!(value, ScriptValue::Float(_)),
                    TableKind::StringList => matches!(value, ScriptValue::String(_)),
                    _ => false,
                };
                if !consecutive || !matching {
                    return Err(BridgeError::InconsistentTableShape {
                        reason: format!(
                            "{} expected key {} but got key {} with {} value",
                            self.kind,
                            expected,
                            key,
                            value.type_name()
                        ),
                    });
                }
                self.entries.push((key.to_string(), value));
                Ok(())
            }
            TableKind::Dictionary => {
                let text = key.to_string();
                if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == text) {
                    slot.1 = value;
                } else {
                    self.entries.push((text, value));
                }
                Ok(())
            }
        }
    }

    /// Dictionary-style lookup by key text.
    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Positional lookup, 0-based insertion order.
    pub fn get_index(&self, index: usize) -> Option<&ScriptValue> {
        self.entries.get(index).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn as_int_list(&self) -> Result<Vec<i64>, BridgeError> {
        if self.kind != TableKind::IntList {
            return Err(BridgeError::TypeMismatch {
                expected: "int list",
                found: self.kind.name(),
            });
        }
        Ok(self
            .entries
            .iter()
            .filter_map(|(_, v)| v.as_integer())
            .collect())
    }

    pub fn as_float_list(&self) -> Result<Vec<f64>, BridgeError> {
        if self.kind != TableKind::FloatList {
            return Err(BridgeError::TypeMismatch {
                expected: "float list",
                found: self.kind.name(),
            });
        }
        Ok(self
            .entries
            .iter()
            .filter_map(|(_, v)| v.as_float())
            .collect())
    }

    pub fn as_string_list(&self) -> Result<Vec<String>, BridgeError> {
        if self.kind != TableKind::StringList {
            return Err(BridgeError::TypeMismatch {
                expected: "string list",
                found: self.kind.name(),
            });
        }
        Ok(self
            .entries
            .iter()
            .filter_map(|(_, v)| v.as_str().map(str::to_string))
            .collect())
    }

    /// Render into indented multi-line text, one nesting level per 4 spaces.
    /// Used for debug logging and error context.
    pub fn render(&self, name: &str, indent: usize) -> String {
        let pad = " ".repeat(4 * indent);
        let mut lines: Vec<String> = Vec::new();

        if self.kind.is_list() {
            let vals: Vec<String> = self.entries.iter().map(|(_, v)| v.to_string()).collect();
            lines.push(format!("{}{}(array):[ {} ]", pad, name, vals.join(", ")));
        } else if self.kind == TableKind::Dictionary {
            lines.push(format!("{}{}(dict):", pad, name));
            let inner = format!("{}    ", pad);
            for (key, value) in &self.entries {
                match value {
                    ScriptValue::Table(t) => lines.push(t.render(key, indent + 1)),
                    other => lines.push(format!(
                        "{}{}({}):{}",
                        inner,
                        key,
                        other.type_name(),
                        other
                    )),
                }
            }
        } else {
            lines.push(format!("{}{}(empty)", pad, name));
        }

        lines.join("\n")
    }
}
