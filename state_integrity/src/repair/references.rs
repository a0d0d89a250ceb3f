//! Cross-references into the inventory and the resolve-or-null primitive
//! every reference goes through.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use state_rules::ItemCategory;

use crate::error::{Diagnostic, Diagnostics, IntegrityError};

/// Identifier, category and name of every item in a repaired inventory.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    items: BTreeMap<String, (ItemCategory, String)>,
}

impl ItemIndex {
    /// Index a repaired `物品` map. Entries without a valid category or
    /// name are not indexed.
    pub fn from_items(items: &Map<String, Value>) -> Self {
        let items = items
            .iter()
            .filter_map(|(id, entry)| {
                let category = entry
                    .get("类型")
                    .and_then(Value::as_str)
                    .and_then(ItemCategory::from_key)?;
                let name = entry.get("名称").and_then(Value::as_str)?;
                Some((id.clone(), (category, name.to_string())))
            })
            .collect();
        Self { items }
    }

    /// Name of `id` when it exists with `category`.
    pub fn resolve(&self, id: &str, category: ItemCategory) -> Option<&str> {
        self.items
            .get(id)
            .filter(|(c, _)| *c == category)
            .map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Identifier carried by a reference value: a string, a number, or an
/// object with `物品ID`.
pub fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("物品ID").and_then(reference_id),
        _ => None,
    }
}

/// Resolve `reference` against `index`. A reference that does not name an
/// item of `category` is replaced with null. Returns the resolved id and
/// the item's name.
pub fn resolve_or_null<'a>(
    reference: &mut Value,
    index: &'a ItemIndex,
    category: ItemCategory,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> Option<(String, &'a str)> {
    if reference.is_null() {
        return None;
    }

    let resolved = reference_id(reference)
        .and_then(|id| index.resolve(&id, category).map(|name| (id, name)));

    if resolved.is_none() {
        let message = match reference_id(reference) {
            Some(id) => format!("no {} item {:?}, cleared", category.key(), id),
            None => "unreadable reference, cleared".to_string(),
        };
        diagnostics.push(Diagnostic::warning(IntegrityError::reference(path, message)));
        *reference = Value::Null;
    }
    resolved
}
