//! Game document schema.

use super::{ValidationErrors, ValidationLimits};
use crate::model::game::{Counter, CreateGameRequest, Game, Item, ItemContainer};
use crate::model::ids::{is_document_id, is_entity_id, DOCUMENT_ID_LEN, ENTITY_ID_LEN};
use std::collections::HashSet;

/// Validates a full game document before it replaces the stored one.
///
/// # Errors
/// Returns every violated rule, in document order.
pub fn validate_game(game: &Game, limits: &ValidationLimits) -> Result<(), ValidationErrors> {
    let mut checker = Checker::default();

    checker.document_id("_id", &game.id);
    checker.document_id("ownerId", &game.owner_id);
    checker.length_between("title", &game.title, limits.title_min, limits.title_max);
    checker.length_between(
        "description",
        &game.description,
        limits.description_min,
        limits.description_max,
    );

    let mut container_ids = HashSet::new();
    let mut item_ids = HashSet::new();
    for (index, container) in game.containers.iter().enumerate() {
        let path = format!("containers[{index}]");
        if !container_ids.insert(container.id.as_str()) {
            checker.fail(format!("{path}.id"), "duplicate container id");
        }
        checker.container(&path, container, limits, &mut item_ids);
    }

    for (index, counter) in game.counters.iter().enumerate() {
        checker.counter(&format!("counters[{index}]"), counter, limits);
    }

    checker.errors.into_result()
}

/// Validates the payload of a create request.
pub fn validate_create_request(
    request: &CreateGameRequest,
    limits: &ValidationLimits,
) -> Result<(), ValidationErrors> {
    let mut checker = Checker::default();
    checker.length_between("title", &request.title, limits.title_min, limits.title_max);
    checker.length_between(
        "description",
        &request.description,
        limits.description_min,
        limits.description_max,
    );
    checker.errors.into_result()
}

#[derive(Default)]
struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    fn fail(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(path, message);
    }

    fn length_between(&mut self, path: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.fail(path, format!("must contain at least {min} character(s)"));
        } else if len > max {
            self.fail(path, format!("must contain at most {max} character(s)"));
        }
    }

    fn length_at_most(&mut self, path: &str, value: &str, max: usize) {
        self.length_between(path, value, 0, max);
    }

    fn document_id(&mut self, path: &str, value: &str) {
        if !is_document_id(value.trim()) {
            self.fail(
                path,
                format!("must be a {DOCUMENT_ID_LEN}-character hex identifier"),
            );
        }
    }

    fn entity_id(&mut self, path: &str, value: &str) {
        if !is_entity_id(value) {
            self.fail(path, format!("must be a {ENTITY_ID_LEN}-character identifier"));
        }
    }

    fn container<'g>(
        &mut self,
        path: &str,
        container: &'g ItemContainer,
        limits: &ValidationLimits,
        item_ids: &mut HashSet<&'g str>,
    ) {
        self.entity_id(&format!("{path}.id"), &container.id);
        self.length_between(
            &format!("{path}.label"),
            &container.label,
            limits.container_label_min,
            limits.container_label_max,
        );
        self.length_at_most(
            &format!("{path}.description"),
            &container.description,
            limits.container_description_max,
        );
        self.length_at_most(
            &format!("{path}.itemType"),
            &container.item_type,
            limits.container_item_type_max,
        );
        if let Some(owner) = container.owner.as_deref() {
            self.document_id(&format!("{path}.owner"), owner);
        }
        for (index, player) in container.informed_players.iter().enumerate() {
            self.document_id(&format!("{path}.informedPlayers[{index}]"), player);
        }
        for (index, entry) in container.ordered_items.iter().enumerate() {
            // Empty entries are placeholder slots.
            if !entry.is_empty() {
                self.entity_id(&format!("{path}.orderedItems[{index}]"), entry);
            }
        }

        for (index, item) in container.items.iter().enumerate() {
            let item_path = format!("{path}.items[{index}]");
            if !item_ids.insert(item.id.as_str()) {
                self.fail(format!("{item_path}.id"), "duplicate item id");
            }
            self.item(&item_path, item, limits);
        }
    }

    fn item(&mut self, path: &str, item: &Item, limits: &ValidationLimits) {
        self.entity_id(&format!("{path}.id"), &item.id);
        self.length_at_most(&format!("{path}.type"), &item.kind, limits.item_type_max);
        self.length_at_most(&format!("{path}.label"), &item.label, limits.item_label_max);
        self.length_at_most(
            &format!("{path}.statusNote"),
            &item.status_note,
            limits.item_status_note_max,
        );
        self.length_at_most(
            &format!("{path}.description"),
            &item.description,
            limits.item_description_max,
        );
        for (index, parent) in item.parent_items.iter().enumerate() {
            self.entity_id(&format!("{path}.parentItems[{index}]"), parent);
        }
        for (index, child) in item.child_items.iter().enumerate() {
            self.entity_id(&format!("{path}.childItems[{index}]"), child);
        }
        for (index, counter) in item.counters.iter().enumerate() {
            self.counter(&format!("{path}.counters[{index}]"), counter, limits);
        }
    }

    fn counter(&mut self, path: &str, counter: &Counter, limits: &ValidationLimits) {
        self.entity_id(&format!("{path}.id"), &counter.id);
        self.length_at_most(
            &format!("{path}.label"),
            &counter.label,
            limits.counter_label_max,
        );
        if !counter.value.is_finite() {
            self.fail(format!("{path}.value"), "must be a finite number");
        }
    }
}
