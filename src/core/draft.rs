//! Article draft - The single editable record behind a create or edit page.
//!
//! All edits go through `ArticleDraft::apply`, so there is exactly one source of
//! truth per page and every mutation can be replayed in tests. Field enums carry
//! the wire names the backend expects, which are also the keys of the error maps.

use crate::{
    core::{
        page::PageConfig,
        rows::{
            CheckMaterialField, CheckMaterialRow, CriticalIssueRow, InstructionRow, MachineryField,
            MachineryRow, MaterialRow, ReferenceField, ReferenceRow, RowId, RowStore,
        },
        serialize::Attachment,
        validation::{ErrorMap, MAX_TEXT_LENGTH, Rule, validate},
        value_kind::ValueKind,
    },
    entities::{Approval, Article, Offer, RelationRef},
};
use std::collections::BTreeMap;

/// Single-valued text inputs and selects of the article form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextField {
    Code,
    Description,
    AdditionalDescriptions,
    CustomerCode,
    Offer,
    Category,
    PalletType,
    CqModel,
    PalletSheet,
    UnitOfMeasure,
    PiecesPerPackage,
    PlanPackaging,
    PalletPlan,
    ActualBoxesPerHourPiece,
    LotAttribution,
    ExpirationAttribution,
    Db,
    LabelsExternal,
    LabelsPvp,
    LabelsIngredients,
    WeightControl,
    Notes,
}

const REQUIRED_TEXT: &[Rule] = &[Rule::Required, Rule::MaxLength(MAX_TEXT_LENGTH)];
const OPTIONAL_TEXT: &[Rule] = &[Rule::MaxLength(MAX_TEXT_LENGTH)];
const QUANTITY: &[Rule] = &[Rule::NonNegativeNumber];

impl TextField {
    pub const ALL: [Self; 22] = [
        Self::Code,
        Self::Description,
        Self::AdditionalDescriptions,
        Self::CustomerCode,
        Self::Offer,
        Self::Category,
        Self::PalletType,
        Self::CqModel,
        Self::PalletSheet,
        Self::UnitOfMeasure,
        Self::PiecesPerPackage,
        Self::PlanPackaging,
        Self::PalletPlan,
        Self::ActualBoxesPerHourPiece,
        Self::LotAttribution,
        Self::ExpirationAttribution,
        Self::Db,
        Self::LabelsExternal,
        Self::LabelsPvp,
        Self::LabelsIngredients,
        Self::WeightControl,
        Self::Notes,
    ];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Description => "description",
            Self::AdditionalDescriptions => "additional_descriptions",
            Self::CustomerCode => "customer_code",
            Self::Offer => "offer_uuid",
            Self::Category => "article_category_uuid",
            Self::PalletType => "pallet_type_uuid",
            Self::CqModel => "cq_model_uuid",
            Self::PalletSheet => "pallet_sheet_uuid",
            Self::UnitOfMeasure => "unit_of_measure",
            Self::PiecesPerPackage => "pieces_per_package",
            Self::PlanPackaging => "plan_packaging",
            Self::PalletPlan => "pallet_plan",
            Self::ActualBoxesPerHourPiece => "actual_boxes_per_hour_piece",
            Self::LotAttribution => "lot_attribution",
            Self::ExpirationAttribution => "expiration_attribution",
            Self::Db => "db",
            Self::LabelsExternal => "labels_external",
            Self::LabelsPvp => "labels_pvp",
            Self::LabelsIngredients => "labels_ingredients",
            Self::WeightControl => "weight_control",
            Self::Notes => "notes",
        }
    }

    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    /// Client-side rules applied to this field
    #[must_use]
    pub const fn rules(self) -> &'static [Rule] {
        match self {
            Self::Code | Self::Description => REQUIRED_TEXT,
            Self::AdditionalDescriptions | Self::CustomerCode | Self::UnitOfMeasure => {
                OPTIONAL_TEXT
            }
            Self::PiecesPerPackage
            | Self::PlanPackaging
            | Self::PalletPlan
            | Self::ActualBoxesPerHourPiece => QUANTITY,
            _ => &[],
        }
    }
}

/// Boolean checkboxes of the article form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagField {
    Visible,
    StockManaged,
    Allergens,
}

impl FlagField {
    pub const ALL: [Self; 3] = [Self::Visible, Self::StockManaged, Self::Allergens];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::StockManaged => "stock_managed",
            Self::Allergens => "allergens",
        }
    }

    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

/// Fixed sign-off phases
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApprovalStage {
    Production,
    Quality,
    Commercial,
    Client,
}

impl ApprovalStage {
    pub const ALL: [Self; 4] = [
        Self::Production,
        Self::Quality,
        Self::Commercial,
        Self::Client,
    ];

    /// Wire name of the stage's approved flag; the other fields append a suffix.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Production => "production_approval",
            Self::Quality => "quality_approval",
            Self::Commercial => "commercial_approval",
            Self::Client => "client_approval",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Text columns of an approval stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalField {
    Employee,
    Date,
    Notes,
}

impl ApprovalField {
    pub const ALL: [Self; 3] = [Self::Employee, Self::Date, Self::Notes];

    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Date => "date",
            Self::Notes => "notes",
        }
    }

    /// Wire name of this column for `stage`, e.g. `quality_approval_date`.
    #[must_use]
    pub fn wire_name(self, stage: ApprovalStage) -> String {
        format!("{}_{}", stage.wire_name(), self.suffix())
    }

    fn rules(self) -> Vec<Rule> {
        match self {
            Self::Employee => vec![Rule::MaxLength(MAX_TEXT_LENGTH)],
            Self::Date => vec![Rule::approval_date()],
            Self::Notes => Vec::new(),
        }
    }
}

/// Editable copy of one approval stage
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalDraft {
    pub approved: bool,
    pub employee: String,
    pub date: String,
    pub notes: String,
}

impl ApprovalDraft {
    fn from_approval(approval: &Approval) -> Self {
        Self {
            approved: approval.approved,
            employee: approval.employee.clone().unwrap_or_default(),
            date: approval
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            notes: approval.notes.clone().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn get(&self, field: ApprovalField) -> &str {
        match field {
            ApprovalField::Employee => &self.employee,
            ApprovalField::Date => &self.date,
            ApprovalField::Notes => &self.notes,
        }
    }

    fn set(&mut self, field: ApprovalField, value: String) {
        match field {
            ApprovalField::Employee => self.employee = value,
            ApprovalField::Date => self.date = value,
            ApprovalField::Notes => self.notes = value,
        }
    }
}

/// Many-valued relations edited as row lists
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationKind {
    Machinery,
    Materials,
    CriticalIssues,
    PackagingInstructions,
    OperatingInstructions,
    PalletizingInstructions,
    CheckMaterials,
}

impl RelationKind {
    pub const ALL: [Self; 7] = [
        Self::Machinery,
        Self::Materials,
        Self::CriticalIssues,
        Self::PackagingInstructions,
        Self::OperatingInstructions,
        Self::PalletizingInstructions,
        Self::CheckMaterials,
    ];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Machinery => "machinery",
            Self::Materials => "materials",
            Self::CriticalIssues => "critical_issues",
            Self::PackagingInstructions => "packaging_instructions",
            Self::OperatingInstructions => "operating_instructions",
            Self::PalletizingInstructions => "palletizing_instructions",
            Self::CheckMaterials => "check_materials",
        }
    }

    /// Column holding the referenced entity's uuid
    #[must_use]
    pub const fn reference_column(self) -> &'static str {
        match self {
            Self::Machinery => "machinery_uuid",
            Self::Materials | Self::CheckMaterials => "material_uuid",
            Self::CriticalIssues => "critical_issue_uuid",
            Self::PackagingInstructions => "packaging_instruction_uuid",
            Self::OperatingInstructions => "operating_instruction_uuid",
            Self::PalletizingInstructions => "palletizing_instruction_uuid",
        }
    }
}

/// Row stores of every relation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relations {
    pub machinery: RowStore<MachineryRow>,
    pub materials: RowStore<MaterialRow>,
    pub critical_issues: RowStore<CriticalIssueRow>,
    pub packaging_instructions: RowStore<InstructionRow>,
    pub operating_instructions: RowStore<InstructionRow>,
    pub palletizing_instructions: RowStore<InstructionRow>,
    pub check_materials: RowStore<CheckMaterialRow>,
}

impl Relations {
    /// Store of a single-reference relation; `None` for machinery and check-materials.
    #[must_use]
    pub const fn references(&self, kind: RelationKind) -> Option<&RowStore<ReferenceRow>> {
        match kind {
            RelationKind::Materials => Some(&self.materials),
            RelationKind::CriticalIssues => Some(&self.critical_issues),
            RelationKind::PackagingInstructions => Some(&self.packaging_instructions),
            RelationKind::OperatingInstructions => Some(&self.operating_instructions),
            RelationKind::PalletizingInstructions => Some(&self.palletizing_instructions),
            RelationKind::Machinery | RelationKind::CheckMaterials => None,
        }
    }

    fn references_mut(&mut self, kind: RelationKind) -> Option<&mut RowStore<ReferenceRow>> {
        match kind {
            RelationKind::Materials => Some(&mut self.materials),
            RelationKind::CriticalIssues => Some(&mut self.critical_issues),
            RelationKind::PackagingInstructions => Some(&mut self.packaging_instructions),
            RelationKind::OperatingInstructions => Some(&mut self.operating_instructions),
            RelationKind::PalletizingInstructions => Some(&mut self.palletizing_instructions),
            RelationKind::Machinery | RelationKind::CheckMaterials => None,
        }
    }

    #[must_use]
    pub fn len(&self, kind: RelationKind) -> usize {
        match kind {
            RelationKind::Machinery => self.machinery.len(),
            RelationKind::CheckMaterials => self.check_materials.len(),
            other => self.references(other).map_or(0, RowStore::len),
        }
    }
}

/// A single edit of the draft
#[derive(Clone, Debug, PartialEq)]
pub enum FormAction {
    SetText(TextField, String),
    SetFlag(FlagField, bool),
    SetApproved(ApprovalStage, bool),
    SetApprovalField(ApprovalStage, ApprovalField, String),
    AddRow(RelationKind),
    RemoveRow(RelationKind, RowId),
    /// Sets the referenced uuid of a materials, critical-issue or instruction row
    SetReference(RelationKind, RowId, String),
    SelectMachinery(RowId, String),
    SetMachineryValue(RowId, String),
    SetCheckMaterial(RowId, CheckMaterialField, String),
    ChooseAttachment(Attachment),
    ClearAttachment,
}

/// Editable state of an article page
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArticleDraft {
    texts: BTreeMap<TextField, String>,
    flags: BTreeMap<FlagField, bool>,
    approvals: [ApprovalDraft; 4],
    pub relations: Relations,
    /// Newly chosen file, replacing any stored attachment on submit
    pub new_attachment: Option<Attachment>,
    /// Attachment already stored on the backend
    pub existing_attachment: Option<String>,
    /// Set when the draft duplicates another article
    pub source_article_uuid: Option<String>,
}

fn or_empty(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

fn reference_rows(refs: &[RelationRef]) -> RowStore<ReferenceRow> {
    RowStore::seeded(refs.iter().map(|r| ReferenceRow {
        uuid: r.uuid.clone(),
    }))
}

impl ArticleDraft {
    /// Empty draft with no offer.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Fresh draft prefilled from the offer it is created for.
    #[must_use]
    pub fn from_offer(offer: &Offer) -> Self {
        let mut draft = Self::blank();
        draft.set_text(TextField::Offer, offer.uuid.clone());
        if let Some(um) = &offer.unit_of_measure {
            draft.set_text(TextField::UnitOfMeasure, um.clone());
        }
        if let Some(pieces) = offer.pieces_per_package {
            draft.set_text(TextField::PiecesPerPackage, pieces.to_string());
        }
        draft
    }

    /// Draft holding an existing article, used by the edit page.
    #[must_use]
    pub fn from_article(article: &Article, config: &PageConfig) -> Self {
        let texts = [
            (TextField::Code, Some(&article.code)),
            (TextField::Description, Some(&article.description)),
            (
                TextField::AdditionalDescriptions,
                article.additional_descriptions.as_ref(),
            ),
            (TextField::CustomerCode, article.customer_code.as_ref()),
            (TextField::Offer, article.offer_uuid.as_ref()),
            (TextField::Category, article.article_category_uuid.as_ref()),
            (TextField::PalletType, article.pallet_type_uuid.as_ref()),
            (TextField::CqModel, article.cq_model_uuid.as_ref()),
            (TextField::PalletSheet, article.pallet_sheet_uuid.as_ref()),
            (TextField::UnitOfMeasure, article.unit_of_measure.as_ref()),
            (TextField::PiecesPerPackage, article.pieces_per_package.as_ref()),
            (TextField::PlanPackaging, article.plan_packaging.as_ref()),
            (TextField::PalletPlan, article.pallet_plan.as_ref()),
            (
                TextField::ActualBoxesPerHourPiece,
                article.actual_boxes_per_hour_piece.as_ref(),
            ),
            (TextField::LotAttribution, article.lot_attribution.as_ref()),
            (
                TextField::ExpirationAttribution,
                article.expiration_attribution.as_ref(),
            ),
            (TextField::Db, article.db.as_ref()),
            (TextField::LabelsExternal, article.labels_external.as_ref()),
            (TextField::LabelsPvp, article.labels_pvp.as_ref()),
            (TextField::LabelsIngredients, article.labels_ingredients.as_ref()),
            (TextField::WeightControl, article.weight_control.as_ref()),
            (TextField::Notes, article.notes.as_ref()),
        ]
        .into_iter()
        .map(|(field, value)| (field, or_empty(value)))
        .collect();

        let flags = [
            (FlagField::Visible, article.visible),
            (FlagField::StockManaged, article.stock_managed),
            (FlagField::Allergens, article.allergens),
        ]
        .into_iter()
        .collect();

        let approvals = [
            &article.production_approval,
            &article.quality_approval,
            &article.commercial_approval,
            &article.client_approval,
        ]
        .map(ApprovalDraft::from_approval);

        let machinery = RowStore::seeded(article.machinery.iter().map(|m| MachineryRow {
            machinery_uuid: m.machinery_uuid.clone(),
            value: or_empty(m.value.as_ref()),
            kind: config.machinery_kind(&m.machinery_uuid),
        }));
        let check_materials =
            RowStore::seeded(article.check_materials.iter().map(|c| CheckMaterialRow {
                material_uuid: c.material_uuid.clone(),
                unit_of_measure: or_empty(c.unit_of_measure.as_ref()),
                quantity_expected: or_empty(c.quantity_expected.as_ref()),
                quantity_effective: or_empty(c.quantity_effective.as_ref()),
            }));

        Self {
            texts,
            flags,
            approvals,
            relations: Relations {
                machinery,
                materials: reference_rows(&article.materials),
                critical_issues: reference_rows(&article.critical_issues),
                packaging_instructions: reference_rows(&article.packaging_instructions),
                operating_instructions: reference_rows(&article.operating_instructions),
                palletizing_instructions: reference_rows(&article.palletizing_instructions),
                check_materials,
            },
            new_attachment: None,
            existing_attachment: article.attachment.clone(),
            source_article_uuid: None,
        }
    }

    /// Draft for a new article copied from `source`. Approvals start over and the
    /// stored attachment is left to the backend, which sees the source id.
    #[must_use]
    pub fn duplicate_of(source: &Article, config: &PageConfig) -> Self {
        let mut draft = Self::from_article(source, config);
        draft.approvals = Default::default();
        draft.existing_attachment = None;
        draft.source_article_uuid = Some(source.uuid.clone());
        draft
    }

    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        self.texts.get(&field).map_or("", String::as_str)
    }

    fn set_text(&mut self, field: TextField, value: String) {
        self.texts.insert(field, value);
    }

    #[must_use]
    pub fn flag(&self, field: FlagField) -> bool {
        self.flags.get(&field).copied().unwrap_or(false)
    }

    #[must_use]
    pub const fn approval(&self, stage: ApprovalStage) -> &ApprovalDraft {
        &self.approvals[stage.index()]
    }

    /// Appends a row to `kind`. Check-material rows start with the offer's unit of
    /// measure when the page has one.
    pub fn add_row(&mut self, kind: RelationKind, config: &PageConfig) -> RowId {
        match kind {
            RelationKind::Machinery => self.relations.machinery.add(),
            RelationKind::CheckMaterials => {
                self.relations.check_materials.add_with(CheckMaterialRow {
                    unit_of_measure: config
                        .default_unit_of_measure()
                        .unwrap_or_default()
                        .to_string(),
                    ..CheckMaterialRow::default()
                })
            }
            RelationKind::Materials => self.relations.materials.add(),
            RelationKind::CriticalIssues => self.relations.critical_issues.add(),
            RelationKind::PackagingInstructions => self.relations.packaging_instructions.add(),
            RelationKind::OperatingInstructions => self.relations.operating_instructions.add(),
            RelationKind::PalletizingInstructions => {
                self.relations.palletizing_instructions.add()
            }
        }
    }

    /// Applies one edit. Returns false when the action targets a row that does
    /// not exist (or a relation that has no such column) and nothing changed.
    pub fn apply(&mut self, action: FormAction, config: &PageConfig) -> bool {
        match action {
            FormAction::SetText(field, value) => {
                self.set_text(field, value);
                true
            }
            FormAction::SetFlag(field, value) => {
                self.flags.insert(field, value);
                true
            }
            FormAction::SetApproved(stage, approved) => {
                self.approvals[stage.index()].approved = approved;
                true
            }
            FormAction::SetApprovalField(stage, field, value) => {
                self.approvals[stage.index()].set(field, value);
                true
            }
            FormAction::AddRow(kind) => {
                self.add_row(kind, config);
                true
            }
            FormAction::RemoveRow(kind, id) => match kind {
                RelationKind::Machinery => self.relations.machinery.remove(id),
                RelationKind::CheckMaterials => self.relations.check_materials.remove(id),
                other => self
                    .relations
                    .references_mut(other)
                    .is_some_and(|store| store.remove(id)),
            },
            FormAction::SetReference(kind, id, uuid) => {
                self.relations.references_mut(kind).is_some_and(|store| {
                    store.update(id, ReferenceField::Uuid, uuid)
                })
            }
            FormAction::SelectMachinery(id, uuid) => {
                let kind = config.machinery_kind(&uuid);
                self.relations
                    .machinery
                    .update_with(id, |row| row.select(uuid, kind))
            }
            // A read-only kind has no input to type into.
            FormAction::SetMachineryValue(id, value) => {
                let editable = self
                    .relations
                    .machinery
                    .get(id)
                    .is_some_and(|row| row.kind.is_editable());
                editable
                    && self
                        .relations
                        .machinery
                        .update(id, MachineryField::Value, value)
            }
            FormAction::SetCheckMaterial(id, field, value) => {
                self.relations.check_materials.update(id, field, value)
            }
            FormAction::ChooseAttachment(attachment) => {
                self.new_attachment = Some(attachment);
                true
            }
            FormAction::ClearAttachment => {
                self.new_attachment = None;
                true
            }
        }
    }

    /// Every client-side error of the draft, shown or not.
    #[must_use]
    pub fn client_errors(&self) -> ErrorMap {
        let mut errors = ErrorMap::new();

        for field in TextField::ALL {
            if let Some(message) = validate(self.text(field), field.rules()) {
                errors.insert(field.wire_name(), message);
            }
        }

        for stage in ApprovalStage::ALL {
            for field in ApprovalField::ALL {
                let value = self.approval(stage).get(field);
                if let Some(message) = validate(value, &field.rules()) {
                    errors.insert(field.wire_name(stage), message);
                }
            }
        }

        // Keys use the submitted index, matching what the backend reports.
        for (index, row) in self.relations.machinery.complete_rows().enumerate() {
            if row.kind.is_editable() && !row.kind.accepts(&row.value) {
                let message = match row.kind {
                    ValueKind::Numeric => "The value must be a number.",
                    _ => "The selected value is invalid.",
                };
                errors.insert(format!("machinery.{index}.value"), message);
            }
        }

        errors
    }
}
