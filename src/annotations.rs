use std::iter::FromIterator;

use serde::{Deserialize, Serialize};

pub const EMITS_CHANGED_SIGNAL: &str = "org.freedesktop.DBus.Property.EmitsChangedSignal";

/// How a property reports changes to its value, as declared by its
/// `EmitsChangedSignal` annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitsChangedSignal {
    /// Changes are signalled along with the new value.
    True,
    /// Changes are signalled without the new value.
    Invalidates,
    /// The value never changes.
    Const,
    False,
}

impl EmitsChangedSignal {
    /// Unrecognized text counts as the default, `True`.
    pub fn from_annotation(text: &str) -> EmitsChangedSignal {
        match text {
            "invalidates" => EmitsChangedSignal::Invalidates,
            "const" => EmitsChangedSignal::Const,
            "false" => EmitsChangedSignal::False,
            _ => EmitsChangedSignal::True,
        }
    }
}

/// Annotations attached to an introspected interface, method, signal,
/// property or argument, in the order they were declared.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    entries: Vec<(String, String)>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`. A name that is already present keeps its
    /// position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emits_changed_signal(&self) -> EmitsChangedSignal {
        self.get(EMITS_CHANGED_SIGNAL)
            .map_or(EmitsChangedSignal::True, EmitsChangedSignal::from_annotation)
    }

    /// Whether a client should listen for change notifications of the
    /// annotated property.
    pub fn subscribes_to_changes(&self) -> bool {
        matches!(
            self.emits_changed_signal(),
            EmitsChangedSignal::True | EmitsChangedSignal::Invalidates
        )
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut annotations = Annotations::new();
        for (name, value) in iter {
            annotations.insert(name, value);
        }
        annotations
    }
}
