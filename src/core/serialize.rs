//! Request body assembly.
//!
//! Flattens an `ArticleDraft` into the key-path encoding the backend reads:
//! plain fields by wire name, flags as `"1"`/`"0"`, relations as
//! `relation[index][column]` where `index` is the row's position among the rows
//! that pass its completeness filter. Incomplete rows are dropped, never sent as
//! partial entries.

use crate::core::{
    draft::{ApprovalField, ApprovalStage, ArticleDraft, FlagField, RelationKind, TextField},
    rows::{ReferenceRow, RowStore},
};

/// Hidden field carrying the id of the article being duplicated
pub const SOURCE_ARTICLE_FIELD: &str = "source_article_uuid";
/// Multipart field of a newly chosen attachment
pub const ATTACHMENT_FIELD: &str = "attachment";

/// File chosen for upload
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Flat request body of a create or update
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormBody {
    pub fields: Vec<(String, String)>,
    /// Only present when a new file was chosen; absence keeps the stored one.
    pub attachment: Option<Attachment>,
}

impl FormBody {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// First value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys starting with `prefix`, in emission order.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(move |k| k.starts_with(prefix))
    }
}

const fn flag_value(checked: bool) -> &'static str {
    if checked { "1" } else { "0" }
}

fn row_key(kind: RelationKind, index: usize, column: &str) -> String {
    format!("{}[{index}][{column}]", kind.wire_name())
}

fn push_references(body: &mut FormBody, kind: RelationKind, store: &RowStore<ReferenceRow>) {
    for (index, row) in store.complete_rows().enumerate() {
        body.push(row_key(kind, index, kind.reference_column()), row.uuid.clone());
    }
}

/// Builds the request body for `draft`.
#[must_use]
pub fn serialize(draft: &ArticleDraft) -> FormBody {
    let mut body = FormBody::default();

    for field in TextField::ALL {
        body.push(field.wire_name(), draft.text(field));
    }

    for flag in FlagField::ALL {
        body.push(flag.wire_name(), flag_value(draft.flag(flag)));
    }

    for stage in ApprovalStage::ALL {
        let approval = draft.approval(stage);
        body.push(stage.wire_name(), flag_value(approval.approved));
        for field in ApprovalField::ALL {
            body.push(field.wire_name(stage), approval.get(field));
        }
    }

    let relations = &draft.relations;

    // Values go out as typed text whatever the declared kind.
    for (index, row) in relations.machinery.complete_rows().enumerate() {
        let kind = RelationKind::Machinery;
        body.push(
            row_key(kind, index, kind.reference_column()),
            row.machinery_uuid.clone(),
        );
        body.push(row_key(kind, index, "value"), row.value.clone());
    }

    for kind in [
        RelationKind::Materials,
        RelationKind::CriticalIssues,
        RelationKind::PackagingInstructions,
        RelationKind::OperatingInstructions,
        RelationKind::PalletizingInstructions,
    ] {
        if let Some(store) = relations.references(kind) {
            push_references(&mut body, kind, store);
        }
    }

    for (index, row) in relations.check_materials.complete_rows().enumerate() {
        let kind = RelationKind::CheckMaterials;
        body.push(
            row_key(kind, index, kind.reference_column()),
            row.material_uuid.clone(),
        );
        body.push(
            row_key(kind, index, "unit_of_measure"),
            row.unit_of_measure.clone(),
        );
        body.push(
            row_key(kind, index, "quantity_expected"),
            row.quantity_expected.clone(),
        );
        body.push(
            row_key(kind, index, "quantity_effective"),
            row.quantity_effective.clone(),
        );
    }

    if let Some(source) = &draft.source_article_uuid {
        body.push(SOURCE_ARTICLE_FIELD, source.clone());
    }

    body.attachment.clone_from(&draft.new_attachment);
    body
}
