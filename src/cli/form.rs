//! Article page commands.

use super::EditArgs;
use crate::{
    backend::ArticleBackend,
    core::{
        draft::{ApprovalField, ApprovalStage, FlagField, FormAction, RelationKind, TextField},
        page::{ArticlePage, Phase},
        rows::{CheckMaterialField, RowId},
        serialize::{Attachment, FormBody},
        validation::ErrorMap,
        value_kind::ValueKind,
    },
    errors::{Error, Result},
};
use std::{fmt::Write, path::Path};
use tracing::{debug, info};

/// Maps a `--set` assignment to the action it stands for.
///
/// Text fields take the value verbatim; flags and approval stages take a boolean
/// (`1`/`0`, `yes`/`no`, `true`/`false`); approval columns take text.
pub fn field_action(name: &str, value: &str) -> Result<FormAction> {
    if let Some(field) = TextField::from_wire(name) {
        return Ok(FormAction::SetText(field, value.to_string()));
    }
    if let Some(flag) = FlagField::from_wire(name) {
        return Ok(FormAction::SetFlag(flag, parse_flag(name, value)?));
    }
    for stage in ApprovalStage::ALL {
        if stage.wire_name() == name {
            return Ok(FormAction::SetApproved(stage, parse_flag(name, value)?));
        }
        if let Some(field) = ApprovalField::ALL
            .into_iter()
            .find(|f| f.wire_name(stage) == name)
        {
            return Ok(FormAction::SetApprovalField(stage, field, value.to_string()));
        }
    }
    Err(Error::InvalidFieldName {
        name: name.to_string(),
    })
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" | "" => Ok(false),
        other => Err(Error::Validation {
            field: field.to_string(),
            message: format!("expected yes or no, got `{other}`"),
        }),
    }
}

/// Relation kind by wire name.
pub fn relation_kind(name: &str) -> Result<RelationKind> {
    RelationKind::ALL
        .into_iter()
        .find(|k| k.wire_name() == name)
        .ok_or_else(|| Error::InvalidFieldName {
            name: name.to_string(),
        })
}

/// Enumerated machinery values may be given by label; they are stored by key.
fn machinery_value(kind: &ValueKind, raw: &str) -> String {
    match kind {
        ValueKind::Enumerated(options) if !kind.accepts(raw) => options
            .iter()
            .find(|o| o.label.eq_ignore_ascii_case(raw.trim()))
            .map_or_else(|| raw.to_string(), |o| o.key.to_string()),
        _ => raw.to_string(),
    }
}

fn row_ids(page: &ArticlePage, kind: RelationKind) -> Vec<RowId> {
    let relations = &page.draft().relations;
    match kind {
        RelationKind::Machinery => relations.machinery.ids().collect(),
        RelationKind::CheckMaterials => relations.check_materials.ids().collect(),
        other => relations
            .references(other)
            .map(|store| store.ids().collect())
            .unwrap_or_default(),
    }
}

fn add_check_material(page: &mut ArticlePage, raw: &str) -> Result<()> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [material, unit, expected, effective] = parts.as_slice() else {
        return Err(Error::Validation {
            field: RelationKind::CheckMaterials.wire_name().to_string(),
            message: format!("expected MATERIAL:UNIT:EXPECTED:EFFECTIVE, got `{raw}`"),
        });
    };

    let id = page.add_row(RelationKind::CheckMaterials);
    let mut fields = vec![
        (CheckMaterialField::Material, *material),
        (CheckMaterialField::QuantityExpected, *expected),
        (CheckMaterialField::QuantityEffective, *effective),
    ];
    if !unit.trim().is_empty() {
        fields.push((CheckMaterialField::UnitOfMeasure, *unit));
    }
    for (field, value) in fields {
        page.dispatch(FormAction::SetCheckMaterial(id, field, value.to_string()));
    }
    Ok(())
}

/// Reads a file to attach. The MIME type is guessed from the extension.
pub fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());
    let mime = mime_guess::from_path(path).first_raw().map(str::to_string);
    Ok(Attachment {
        file_name,
        mime,
        bytes,
    })
}

/// Applies the command-line edits to `page`, in order: clears, field
/// assignments, new rows, attachment.
pub fn apply_edits(page: &mut ArticlePage, edits: &EditArgs) -> Result<()> {
    for name in &edits.clear {
        let kind = relation_kind(name)?;
        for id in row_ids(page, kind) {
            page.dispatch(FormAction::RemoveRow(kind, id));
        }
    }

    for (name, value) in &edits.set {
        page.dispatch(field_action(name, value)?);
    }

    for (name, uuid) in &edits.add {
        let kind = relation_kind(name)?;
        if page.draft().relations.references(kind).is_none() {
            return Err(Error::InvalidFieldName { name: name.clone() });
        }
        let id = page.add_row(kind);
        page.dispatch(FormAction::SetReference(kind, id, uuid.clone()));
    }

    for (uuid, value) in &edits.machinery {
        let id = page.add_row(RelationKind::Machinery);
        page.dispatch(FormAction::SelectMachinery(id, uuid.clone()));
        let value = machinery_value(&page.config().machinery_kind(uuid), value);
        if !page.dispatch(FormAction::SetMachineryValue(id, value)) {
            return Err(Error::Validation {
                field: format!("machinery {uuid}"),
                message: "This machinery takes no value.".to_string(),
            });
        }
    }

    for raw in &edits.check_materials {
        add_check_material(page, raw)?;
    }

    if let Some(path) = &edits.attach {
        page.dispatch(FormAction::ChooseAttachment(read_attachment(path)?));
    }

    debug!(phase = ?page.phase(), "edits applied");
    Ok(())
}

/// Renders a request body one field per line.
#[must_use]
pub fn format_body(body: &FormBody) -> String {
    let mut out = String::new();
    for (key, value) in &body.fields {
        let _ = writeln!(out, "{key} = {value}");
    }
    if let Some(attachment) = &body.attachment {
        let _ = writeln!(
            out,
            "attachment = {} ({} bytes)",
            attachment.file_name,
            attachment.bytes.len()
        );
    }
    out
}

#[must_use]
pub fn format_errors(errors: &ErrorMap) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}\n"))
        .collect()
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Human-readable summary of the page's draft.
#[must_use]
pub fn format_page<B: ArticleBackend>(page: &ArticlePage, backend: &B) -> String {
    let draft = page.draft();
    let config = page.config();
    let mut out = format!(
        "{}  {}\n",
        draft.text(TextField::Code),
        draft.text(TextField::Description)
    );

    for field in TextField::ALL {
        if matches!(field, TextField::Code | TextField::Description) {
            continue;
        }
        let value = draft.text(field);
        if !value.is_empty() {
            let _ = writeln!(out, "  {}: {value}", field.wire_name());
        }
    }

    let flags: Vec<String> = FlagField::ALL
        .into_iter()
        .map(|f| format!("{}={}", f.wire_name(), yes_no(draft.flag(f))))
        .collect();
    let _ = writeln!(out, "  flags: {}", flags.join(" "));

    for stage in ApprovalStage::ALL {
        let approval = draft.approval(stage);
        if approval.approved || !approval.date.is_empty() {
            let _ = writeln!(
                out,
                "  {}: approved={} employee={} date={}",
                stage.wire_name(),
                yes_no(approval.approved),
                approval.employee,
                approval.date
            );
        }
    }

    for row in draft.relations.machinery.rows() {
        let name = config
            .catalogs
            .machinery(&row.data.machinery_uuid)
            .map_or(row.data.machinery_uuid.as_str(), |m| m.name.as_str());
        let _ = writeln!(out, "  machinery: {name} = {}", row.data.kind.display(&row.data.value));
    }
    for kind in RelationKind::ALL {
        if matches!(kind, RelationKind::Machinery) {
            continue;
        }
        let count = draft.relations.len(kind);
        if count > 0 {
            let _ = writeln!(out, "  {}: {count} row(s)", kind.wire_name());
        }
    }

    let productivity = page.productivity();
    let _ = writeln!(
        out,
        "  expected boxes/hour/piece: {}",
        productivity.expected_boxes_per_hour_piece
    );
    let _ = writeln!(
        out,
        "  expected pieces/hour/station: {}",
        productivity.expected_pieces_per_hour_station
    );
    let _ = writeln!(
        out,
        "  actual pieces/hour/station: {}",
        productivity.actual_pieces_per_hour_station
    );

    if let Some(link) = page.attachment_link(backend) {
        let _ = writeln!(out, "  attachment: {link}");
    }
    out
}

/// Submits the page, or prints the body under `--dry-run`.
async fn save<B: ArticleBackend>(page: &mut ArticlePage, backend: &B, dry_run: bool) -> Result<()> {
    if dry_run {
        let body = page.begin_submit()?;
        print!("{}", format_body(&body));
        let errors = page.visible_errors();
        if !errors.is_empty() {
            println!("Would be refused locally:\n{}", format_errors(&errors));
        }
        return Ok(());
    }

    let phase = page.submit(backend).await?.clone();
    if let Phase::Succeeded { redirect } = phase {
        println!("Saved: {redirect}");
        return Ok(());
    }

    let errors = page.visible_errors();
    eprint!("Not saved:\n{}", format_errors(&errors));
    match errors.iter().next() {
        Some((field, message)) => Err(Error::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

pub async fn show<B: ArticleBackend>(backend: &B, uuid: &str) -> Result<()> {
    let props = backend.edit_page(uuid).await?;
    let page = ArticlePage::edit(&props);
    print!("{}", format_page(&page, backend));
    Ok(())
}

pub async fn create<B: ArticleBackend>(
    backend: &B,
    offer: Option<&str>,
    edits: &EditArgs,
) -> Result<()> {
    info!(offer, "creating article");
    let props = backend.create_page(offer, None).await?;
    let mut page = ArticlePage::create(&props);
    apply_edits(&mut page, edits)?;
    save(&mut page, backend, edits.dry_run).await
}

pub async fn duplicate<B: ArticleBackend>(backend: &B, source: &str, edits: &EditArgs) -> Result<()> {
    info!(source, "duplicating article");
    let props = backend.create_page(None, Some(source)).await?;
    let mut page = ArticlePage::create(&props);
    apply_edits(&mut page, edits)?;
    save(&mut page, backend, edits.dry_run).await
}

pub async fn update<B: ArticleBackend>(backend: &B, uuid: &str, edits: &EditArgs) -> Result<()> {
    info!(uuid, "updating article");
    let props = backend.edit_page(uuid).await?;
    let mut page = ArticlePage::edit(&props);
    apply_edits(&mut page, edits)?;
    save(&mut page, backend, edits.dry_run).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::serialize::serialize,
        test_utils::{FakeBackend, create_props, edit_props},
    };

    #[test]
    fn test_field_action_resolves_every_field_family() {
        assert_eq!(
            field_action("code", "ART-2").unwrap(),
            FormAction::SetText(TextField::Code, "ART-2".to_string())
        );
        assert_eq!(
            field_action("allergens", "yes").unwrap(),
            FormAction::SetFlag(FlagField::Allergens, true)
        );
        assert_eq!(
            field_action("client_approval", "0").unwrap(),
            FormAction::SetApproved(ApprovalStage::Client, false)
        );
        assert_eq!(
            field_action("quality_approval_employee", "Bianchi").unwrap(),
            FormAction::SetApprovalField(
                ApprovalStage::Quality,
                ApprovalField::Employee,
                "Bianchi".to_string()
            )
        );
        assert!(matches!(
            field_action("weight", "3"),
            Err(Error::InvalidFieldName { .. })
        ));
        assert!(matches!(
            field_action("visible", "maybe"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_apply_edits_adds_and_clears_rows() {
        let mut page = ArticlePage::edit(&edit_props());
        let edits = EditArgs {
            clear: vec!["materials".to_string()],
            add: vec![("materials".to_string(), "mat-9".to_string())],
            machinery: vec![("mach-color".to_string(), "verde".to_string())],
            check_materials: vec!["mat-1::4:4".to_string()],
            ..EditArgs::default()
        };
        apply_edits(&mut page, &edits).unwrap();

        let body = serialize(page.draft());
        assert_eq!(body.get("materials[0][material_uuid]"), Some("mat-9"));
        assert!(!body.contains("materials[1][material_uuid]"));
        assert_eq!(body.get("machinery[2][machinery_uuid]"), Some("mach-color"));
        assert_eq!(body.get("machinery[2][value]"), Some("1"));
        assert_eq!(body.get("check_materials[0][unit_of_measure]"), Some("kg"));
    }

    #[test]
    fn test_apply_edits_rejects_bad_relations() {
        let mut page = ArticlePage::create(&create_props(None, None));
        let edits = EditArgs {
            add: vec![("machinery".to_string(), "mach-speed".to_string())],
            ..EditArgs::default()
        };
        assert!(matches!(
            apply_edits(&mut page, &edits),
            Err(Error::InvalidFieldName { .. })
        ));

        let edits = EditArgs {
            check_materials: vec!["mat-1:kg".to_string()],
            ..EditArgs::default()
        };
        assert!(matches!(
            apply_edits(&mut page, &edits),
            Err(Error::Validation { .. })
        ));

        let edits = EditArgs {
            machinery: vec![("mach-unlisted".to_string(), "5".to_string())],
            ..EditArgs::default()
        };
        assert!(matches!(
            apply_edits(&mut page, &edits),
            Err(Error::Validation { field, .. }) if field == "machinery mach-unlisted"
        ));
    }

    #[test]
    fn test_read_attachment_guesses_mime() {
        let path = std::env::temp_dir().join("article-desk-datasheet.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let attachment = read_attachment(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(attachment.file_name, "article-desk-datasheet.pdf");
        assert_eq!(attachment.mime.as_deref(), Some("application/pdf"));
        assert_eq!(attachment.bytes, b"%PDF");
    }

    #[test]
    fn test_format_page_shows_productivity_and_attachment() {
        let backend = FakeBackend::new();
        let page = ArticlePage::edit(&edit_props());
        let text = format_page(&page, &backend);

        assert!(text.starts_with("ART-001  Tray 30x20"));
        assert!(text.contains("machinery: Color = rosso"));
        assert!(text.contains("actual pieces/hour/station: 25.00000"));
        assert!(text.contains("attachment: http://fake/articles/art-1/attachment"));
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() -> Result<()> {
        let backend = FakeBackend::new();
        let edits = EditArgs {
            set: vec![("code".to_string(), "ART-9".to_string())],
            dry_run: true,
            ..EditArgs::default()
        };
        create(&backend, Some("offer-1"), &edits).await?;
        assert!(backend.created().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_sends_source() -> Result<()> {
        let backend = FakeBackend::new();
        duplicate(&backend, "art-1", &EditArgs::default()).await?;

        let created = backend.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].get("source_article_uuid"), Some("art-1"));
        assert_eq!(created[0].get("production_approval"), Some("0"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_is_an_error() {
        let backend = FakeBackend::new().rejecting("code", "The code has already been taken.");
        let result = update(&backend, "art-1", &EditArgs::default()).await;

        assert!(matches!(result, Err(Error::Validation { field, .. }) if field == "code"));
    }
}
