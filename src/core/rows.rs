//! Repeated-group row stores.
//!
//! Every many-valued relation of an article (machinery parameters, materials,
//! critical issues, the three instruction families, check-materials) is edited as
//! an ordered list of rows. Each row carries a session-local `RowId` that is never
//! sent to the backend and never reused, so a removed row can't be confused with a
//! later one. Order is insertion order; removal never reorders the survivors.

use crate::core::value_kind::ValueKind;
use std::fmt;

/// Session-local row identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Behaviour shared by every relation row shape.
pub trait RelationRow: Default + Clone {
    /// Editable columns of the row
    type Field: Copy + fmt::Debug;

    /// Replaces one column.
    fn set(&mut self, field: Self::Field, value: String);

    /// Whether the row is filled enough to be submitted.
    fn is_complete(&self) -> bool;
}

/// A row and its local id
#[derive(Clone, Debug, PartialEq)]
pub struct Row<T> {
    pub id: RowId,
    pub data: T,
}

/// Ordered rows of one relation
#[derive(Clone, Debug, PartialEq)]
pub struct RowStore<T> {
    rows: Vec<Row<T>>,
    next_id: u64,
}

impl<T: RelationRow> Default for RowStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RelationRow> RowStore<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }

    /// Builds a store from existing relation entries, keeping their order. Ids are
    /// the entries' positions; fresh ids continue after the last one.
    pub fn seeded(entries: impl IntoIterator<Item = T>) -> Self {
        let rows: Vec<Row<T>> = entries
            .into_iter()
            .enumerate()
            .map(|(position, data)| Row {
                id: RowId(position as u64),
                data,
            })
            .collect();
        let next_id = rows.len() as u64;
        Self { rows, next_id }
    }

    fn fresh_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends an empty row and returns its id.
    pub fn add(&mut self) -> RowId {
        self.add_with(T::default())
    }

    /// Appends a pre-filled row and returns its id.
    pub fn add_with(&mut self, data: T) -> RowId {
        let id = self.fresh_id();
        self.rows.push(Row { id, data });
        id
    }

    /// Removes the row with `id`. Returns false when no such row exists.
    pub fn remove(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    /// Replaces one column of the row with `id`.
    pub fn update(&mut self, id: RowId, field: T::Field, value: String) -> bool {
        self.update_with(id, |data| data.set(field, value))
    }

    /// Applies `f` to the row with `id`.
    pub fn update_with(&mut self, id: RowId, f: impl FnOnce(&mut T)) -> bool {
        match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                f(&mut row.data);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: RowId) -> Option<&T> {
        self.rows.iter().find(|row| row.id == id).map(|row| &row.data)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|row| row.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows passing the completeness filter, in order. Their position in this
    /// iterator is the index they are submitted under.
    pub fn complete_rows(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows
            .iter()
            .map(|row| &row.data)
            .filter(|data| data.is_complete())
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Machinery parameter row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MachineryRow {
    pub machinery_uuid: String,
    pub value: String,
    pub kind: ValueKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineryField {
    Machinery,
    Value,
}

impl MachineryRow {
    /// Selects a machinery entity. The previous value is dropped so a value of the
    /// wrong shape never survives the change.
    pub fn select(&mut self, machinery_uuid: String, kind: ValueKind) {
        self.machinery_uuid = machinery_uuid;
        self.value.clear();
        self.kind = kind;
    }
}

impl RelationRow for MachineryRow {
    type Field = MachineryField;

    fn set(&mut self, field: Self::Field, value: String) {
        match field {
            // Without a catalog lookup the kind is unknown until `select` runs.
            MachineryField::Machinery => self.select(value, ValueKind::ReadOnly),
            MachineryField::Value => self.value = value,
        }
    }

    fn is_complete(&self) -> bool {
        filled(&self.machinery_uuid) && filled(&self.value)
    }
}

/// Row referencing a single entity by uuid: materials, critical issues, and the
/// packaging, operating and palletizing instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceRow {
    pub uuid: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceField {
    Uuid,
}

impl RelationRow for ReferenceRow {
    type Field = ReferenceField;

    fn set(&mut self, field: Self::Field, value: String) {
        match field {
            ReferenceField::Uuid => self.uuid = value,
        }
    }

    fn is_complete(&self) -> bool {
        filled(&self.uuid)
    }
}

pub type MaterialRow = ReferenceRow;
pub type CriticalIssueRow = ReferenceRow;
pub type InstructionRow = ReferenceRow;

/// Check-material verification row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckMaterialRow {
    pub material_uuid: String,
    pub unit_of_measure: String,
    pub quantity_expected: String,
    pub quantity_effective: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckMaterialField {
    Material,
    UnitOfMeasure,
    QuantityExpected,
    QuantityEffective,
}

impl RelationRow for CheckMaterialRow {
    type Field = CheckMaterialField;

    fn set(&mut self, field: Self::Field, value: String) {
        match field {
            CheckMaterialField::Material => self.material_uuid = value,
            CheckMaterialField::UnitOfMeasure => self.unit_of_measure = value,
            CheckMaterialField::QuantityExpected => self.quantity_expected = value,
            CheckMaterialField::QuantityEffective => self.quantity_effective = value,
        }
    }

    fn is_complete(&self) -> bool {
        filled(&self.material_uuid)
            && filled(&self.unit_of_measure)
            && filled(&self.quantity_expected)
            && filled(&self.quantity_effective)
    }
}
