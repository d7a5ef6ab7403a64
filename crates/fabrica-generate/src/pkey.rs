use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::field::Field;
use crate::field_kind::FieldKind;

/// Kind of the distinguished id field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PkeyKind {
    Uid,
    Serial,
}

/// Primary-key policy: the id field's name and kind, plus the serial
/// counter cell.
///
/// The counter lives behind an `Rc` so the handle can be cloned into an
/// extending generator: parent and child then observe the same cell and
/// the sequence continues across both.
#[derive(Debug, Clone)]
pub struct PrimaryKey {
    name: String,
    kind: PkeyKind,
    counter: Rc<Cell<i64>>,
}

impl PrimaryKey {
    pub fn new(name: &str, kind: PkeyKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            counter: Rc::new(Cell::new(0)),
        }
    }

    /// The default policy: a `$id` field holding a uid.
    pub fn default_key() -> Self {
        Self::new("$id", PkeyKind::Uid)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PkeyKind {
        self.kind
    }

    /// Install the id field into a generator's field set.
    pub(crate) fn attach(&self, fields: &mut BTreeMap<String, Field>) {
        let kind = match self.kind {
            PkeyKind::Uid => FieldKind::Uid,
            PkeyKind::Serial => FieldKind::Serial {
                counter: Rc::clone(&self.counter),
            },
        };
        fields.insert(self.name.clone(), Field::new(kind, None, false));
    }
}
