/// Productivity figures derived from the draft
pub mod derived;
/// Editable article state and the actions that change it
pub mod draft;
/// List filters, request sequencing, row actions and the delete dialog
pub mod listing;
/// Create/duplicate/edit page controller
pub mod page;
/// Row collections with stable identities
pub mod rows;
/// Draft to request body
pub mod serialize;
/// Field rules, error maps and touched-field tracking
pub mod validation;
/// Machinery value kinds
pub mod value_kind;
