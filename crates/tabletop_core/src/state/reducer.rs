//! Pure game-state transitions.
//!
//! # Responsibility
//! - Fold one new or edited container/item/counter into a game.
//! - Apply typed add/edit/delete edits with explicit missing-target errors.
//!
//! # Invariants
//! - Inputs are never mutated; every function returns a new `Game`.
//! - Replacing an entity keeps its position; new entities are appended.
//! - `upsert_*` functions are total: an unknown container id is a no-op.

use crate::model::game::{Counter, Game, Item, ItemContainer};
use crate::model::ids::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from typed edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReducerError {
    /// No container with this id exists in the game.
    ContainerNotFound(EntityId),
    /// No item with this id exists in the target container.
    ItemNotFound {
        container_id: EntityId,
        item_id: EntityId,
    },
    /// `Add` targeted a container id that already exists.
    DuplicateContainer(EntityId),
    /// `Add` targeted an item id that already exists somewhere in the game.
    DuplicateItem(EntityId),
}

impl Display for ReducerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContainerNotFound(id) => write!(f, "container not found: {id}"),
            Self::ItemNotFound {
                container_id,
                item_id,
            } => write!(f, "item {item_id} not found in container {container_id}"),
            Self::DuplicateContainer(id) => write!(f, "container already exists: {id}"),
            Self::DuplicateItem(id) => write!(f, "item already exists: {id}"),
        }
    }
}

impl Error for ReducerError {}

/// Container edit requested by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerEdit {
    Add(ItemContainer),
    Edit(ItemContainer),
    Delete(EntityId),
}

/// Item edit requested by a client, addressed through its container.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    Add {
        container_id: EntityId,
        item: Item,
    },
    Edit {
        container_id: EntityId,
        item: Item,
    },
    Delete {
        container_id: EntityId,
        item_id: EntityId,
    },
}

/// Adds `container` or replaces the container with the same id in place.
pub fn upsert_container(game: &Game, container: ItemContainer) -> Game {
    let mut next = game.clone();
    upsert_by_id(&mut next.containers, container, |c| c.id.as_str());
    next
}

/// Adds `item` to the container `container_id` or replaces the item with the
/// same id in place.
///
/// Returns an unchanged copy of `game` when no container matches.
pub fn upsert_item(game: &Game, item: Item, container_id: &str) -> Game {
    let mut next = game.clone();
    if let Some(container) = next
        .containers
        .iter_mut()
        .find(|container| container.id == container_id)
    {
        upsert_by_id(&mut container.items, item, |i| i.id.as_str());
    }
    next
}

/// Adds a game-level counter or replaces the counter with the same id.
pub fn upsert_counter(game: &Game, counter: Counter) -> Game {
    let mut next = game.clone();
    upsert_by_id(&mut next.counters, counter, |c| c.id.as_str());
    next
}

/// Applies one container edit.
///
/// # Errors
/// - `DuplicateContainer` when adding an id that already exists.
/// - `ContainerNotFound` when editing or deleting an unknown id.
pub fn apply_container_edit(game: &Game, edit: ContainerEdit) -> Result<Game, ReducerError> {
    match edit {
        ContainerEdit::Add(container) => {
            if game.container(&container.id).is_some() {
                return Err(ReducerError::DuplicateContainer(container.id));
            }
            Ok(upsert_container(game, container))
        }
        ContainerEdit::Edit(container) => {
            if game.container(&container.id).is_none() {
                return Err(ReducerError::ContainerNotFound(container.id));
            }
            Ok(upsert_container(game, container))
        }
        ContainerEdit::Delete(container_id) => {
            if game.container(&container_id).is_none() {
                return Err(ReducerError::ContainerNotFound(container_id));
            }
            let mut next = game.clone();
            next.containers.retain(|container| container.id != container_id);
            Ok(next)
        }
    }
}

/// Applies one item edit.
///
/// # Errors
/// - `ContainerNotFound` when the addressed container does not exist.
/// - `DuplicateItem` when adding an id already used anywhere in the game.
/// - `ItemNotFound` when editing or deleting an id absent from the container.
pub fn apply_item_edit(game: &Game, edit: ItemEdit) -> Result<Game, ReducerError> {
    match edit {
        ItemEdit::Add { container_id, item } => {
            require_container(game, &container_id)?;
            if game.find_item(&item.id).is_some() {
                return Err(ReducerError::DuplicateItem(item.id));
            }
            Ok(upsert_item(game, item, &container_id))
        }
        ItemEdit::Edit { container_id, item } => {
            let container = require_container(game, &container_id)?;
            if container.item(&item.id).is_none() {
                return Err(ReducerError::ItemNotFound {
                    container_id,
                    item_id: item.id,
                });
            }
            Ok(upsert_item(game, item, &container_id))
        }
        ItemEdit::Delete {
            container_id,
            item_id,
        } => {
            let container = require_container(game, &container_id)?;
            if container.item(&item_id).is_none() {
                return Err(ReducerError::ItemNotFound {
                    container_id,
                    item_id,
                });
            }

            let mut next = game.clone();
            if let Some(container) = next
                .containers
                .iter_mut()
                .find(|container| container.id == container_id)
            {
                container.items.retain(|item| item.id != item_id);
                container.ordered_items.retain(|entry| *entry != item_id);
            }
            Ok(next)
        }
    }
}

fn require_container<'g>(
    game: &'g Game,
    container_id: &str,
) -> Result<&'g ItemContainer, ReducerError> {
    game.container(container_id)
        .ok_or_else(|| ReducerError::ContainerNotFound(container_id.to_string()))
}

fn upsert_by_id<T>(entries: &mut Vec<T>, value: T, id_of: impl Fn(&T) -> &str) {
    let position = entries
        .iter()
        .position(|existing| id_of(existing) == id_of(&value));
    match position {
        Some(index) => entries[index] = value,
        None => entries.push(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::game::{create_item, create_item_container};

    fn empty_game() -> Game {
        Game::new("g1", "owner", "Title", "Description")
    }

    fn container(id: &str, label: &str) -> ItemContainer {
        let mut container = create_item_container();
        container.id = id.to_string();
        container.label = label.to_string();
        container
    }

    fn item(id: &str, label: &str) -> Item {
        let mut item = create_item();
        item.id = id.to_string();
        item.label = label.to_string();
        item
    }

    #[test]
    fn upsert_container_appends_to_empty_game() {
        let game = empty_game();
        let next = upsert_container(&game, container("c1", "Deck"));

        assert_eq!(next.containers.len(), 1);
        assert_eq!(next.containers[0].id, "c1");
        assert_eq!(next.containers[0].label, "Deck");
        assert!(game.containers.is_empty(), "input must not change");
    }

    #[test]
    fn upsert_container_twice_keeps_single_latest_entry() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));
        let next = upsert_container(&game, container("c1", "Draw pile"));

        let matching: Vec<_> = next.containers.iter().filter(|c| c.id == "c1").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].label, "Draw pile");
    }

    #[test]
    fn upsert_container_keeps_position_on_edit() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));
        let game = upsert_container(&game, container("c2", "Hand"));
        let next = upsert_container(&game, container("c1", "Deck v2"));

        let ids: Vec<_> = next.containers.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(next.containers[0].label, "Deck v2");
    }

    #[test]
    fn upsert_item_with_unknown_container_returns_equal_game() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));
        let next = upsert_item(&game, item("i1", "Card"), "missing");
        assert_eq!(next, game);
    }

    #[test]
    fn upsert_item_replaces_in_place_within_container() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));
        let game = upsert_item(&game, item("i1", "Knight"), "c1");
        let game = upsert_item(&game, item("i2", "Road"), "c1");
        let next = upsert_item(&game, item("i1", "Knight (played)"), "c1");

        let items = &next.containers[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "i1");
        assert_eq!(items[0].label, "Knight (played)");
        assert_eq!(game.containers[0].items[0].label, "Knight");
    }

    #[test]
    fn upsert_counter_adds_then_replaces() {
        let mut counter = Counter::new("Round", 1.0);
        let game = upsert_counter(&empty_game(), counter.clone());
        counter.value = 2.0;
        let next = upsert_counter(&game, counter);

        assert_eq!(next.counters.len(), 1);
        assert_eq!(next.counters[0].value, 2.0);
    }

    #[test]
    fn container_edits_report_missing_and_duplicate_targets() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));

        let err = apply_container_edit(&game, ContainerEdit::Add(container("c1", "Again")))
            .unwrap_err();
        assert_eq!(err, ReducerError::DuplicateContainer("c1".to_string()));

        let err = apply_container_edit(&game, ContainerEdit::Edit(container("c9", "Nope")))
            .unwrap_err();
        assert_eq!(err, ReducerError::ContainerNotFound("c9".to_string()));

        let next = apply_container_edit(&game, ContainerEdit::Delete("c1".to_string())).unwrap();
        assert!(next.containers.is_empty());
    }

    #[test]
    fn item_edits_report_missing_container_and_item() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));

        let err = apply_item_edit(
            &game,
            ItemEdit::Add {
                container_id: "c9".to_string(),
                item: item("i1", "Card"),
            },
        )
        .unwrap_err();
        assert_eq!(err, ReducerError::ContainerNotFound("c9".to_string()));

        let err = apply_item_edit(
            &game,
            ItemEdit::Edit {
                container_id: "c1".to_string(),
                item: item("i1", "Card"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ReducerError::ItemNotFound { .. }));
    }

    #[test]
    fn item_add_rejects_id_used_in_another_container() {
        let game = upsert_container(&empty_game(), container("c1", "Deck"));
        let game = upsert_container(&game, container("c2", "Hand"));
        let game = upsert_item(&game, item("i1", "Card"), "c1");

        let err = apply_item_edit(
            &game,
            ItemEdit::Add {
                container_id: "c2".to_string(),
                item: item("i1", "Card"),
            },
        )
        .unwrap_err();
        assert_eq!(err, ReducerError::DuplicateItem("i1".to_string()));
    }

    #[test]
    fn item_delete_prunes_ordering_hint() {
        let mut deck = container("c1", "Deck");
        deck.ordered_items = vec!["i1".to_string(), String::new(), "i2".to_string()];
        let game = upsert_container(&empty_game(), deck);
        let game = upsert_item(&game, item("i1", "A"), "c1");
        let game = upsert_item(&game, item("i2", "B"), "c1");

        let next = apply_item_edit(
            &game,
            ItemEdit::Delete {
                container_id: "c1".to_string(),
                item_id: "i1".to_string(),
            },
        )
        .unwrap();

        let deck = &next.containers[0];
        assert_eq!(deck.items.len(), 1);
        assert_eq!(deck.ordered_items, vec![String::new(), "i2".to_string()]);
    }
}
