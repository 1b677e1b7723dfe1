//! Game document model.
//!
//! # Responsibility
//! - Define the canonical game tree shared by storage, service and HTTP.
//! - Provide empty/default constructors for new containers and items.
//!
//! # Invariants
//! - Container and item ids are unique within one game. Constructors mint
//!   fresh ids; uniqueness of caller-supplied ids is checked by validation.
//! - `ordered_items` is an ordering hint and may reference ids that are not
//!   in `items`.
//! - Serialized field names follow the camelCase wire format (`_id`,
//!   `ownerId`, `itemType`, ...).

use crate::model::ids::{new_entity_id, normalize_document_id, DocumentId, EntityId};
use serde::{Deserialize, Serialize};

/// Top-level aggregate owned by one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Database-assigned document id.
    #[serde(rename = "_id")]
    pub id: DocumentId,
    /// Player that created the game.
    pub owner_id: DocumentId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub containers: Vec<ItemContainer>,
    /// Game-level counters (scores, round number, ...).
    #[serde(default)]
    pub counters: Vec<Counter>,
    /// Recorded but never interpreted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_history: Vec<Action>,
    /// Storage revision. Optional on input; when present it is checked
    /// against the stored revision before a replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
}

impl Game {
    /// Creates an empty game with no containers, counters or history.
    pub fn new(
        id: impl Into<DocumentId>,
        owner_id: impl Into<DocumentId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: description.into(),
            containers: Vec::new(),
            counters: Vec::new(),
            action_history: Vec::new(),
            revision: None,
        }
    }

    /// Rewrites every document id in the tree (`_id`, `ownerId`, container
    /// `owner`, `informedPlayers`) to its canonical form.
    pub fn normalize_document_ids(&mut self) {
        self.id = normalize_document_id(&self.id);
        self.owner_id = normalize_document_id(&self.owner_id);
        for container in &mut self.containers {
            if let Some(owner) = container.owner.as_mut() {
                *owner = normalize_document_id(owner);
            }
            for player in &mut container.informed_players {
                *player = normalize_document_id(player);
            }
        }
    }

    /// Finds a container by id.
    pub fn container(&self, container_id: &str) -> Option<&ItemContainer> {
        self.containers
            .iter()
            .find(|container| container.id == container_id)
    }

    /// Finds an item anywhere in the game, returning it with its container.
    pub fn find_item(&self, item_id: &str) -> Option<(&ItemContainer, &Item)> {
        self.containers.iter().find_map(|container| {
            container
                .item(item_id)
                .map(|item| (container, item))
        })
    }
}

/// A holder of game pieces: a deck, a hand, a discard pile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContainer {
    pub id: EntityId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Free-text tag describing what the container holds.
    #[serde(default)]
    pub item_type: String,
    /// Owning player, if the container belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<DocumentId>,
    /// Visibility to non-owning players; enforcement is up to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub informed_players: Vec<DocumentId>,
    /// Display order of item ids. Empty strings mark placeholder slots.
    #[serde(default)]
    pub ordered_items: Vec<String>,
}

impl ItemContainer {
    /// Creates an empty, visible container with a fresh id.
    pub fn new() -> Self {
        Self {
            id: new_entity_id(),
            label: String::new(),
            description: String::new(),
            items: Vec::new(),
            item_type: String::new(),
            owner: None,
            hidden: Some(false),
            informed_players: Vec::new(),
            ordered_items: Vec::new(),
        }
    }

    /// Finds an item in this container by id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

impl Default for ItemContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// A game piece. Parent/child ids form a stacking/composition graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: EntityId,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub parent_items: Vec<EntityId>,
    #[serde(default)]
    pub child_items: Vec<EntityId>,
    #[serde(default)]
    pub counters: Vec<Counter>,
}

impl Item {
    /// Creates a blank, visible item with a fresh id.
    pub fn new() -> Self {
        Self {
            id: new_entity_id(),
            kind: String::new(),
            label: String::new(),
            description: String::new(),
            status_note: String::new(),
            hidden: Some(false),
            parent_items: Vec::new(),
            child_items: Vec::new(),
            counters: Vec::new(),
        }
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new()
    }
}

/// Labeled numeric value attached to a game or an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: EntityId,
    pub label: String,
    pub value: f64,
}

impl Counter {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            id: new_entity_id(),
            label: label.into(),
            value,
        }
    }
}

/// History entry. Stored and returned, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement: Option<Movement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub item_id: EntityId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Item moved to another container.
    Container,
    /// Item moved within its container.
    Position,
}

/// Payload for creating an empty game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub title: String,
    pub description: String,
    /// Store in the template library instead of the active games.
    #[serde(default)]
    pub library: Option<bool>,
}

/// Returns a new empty container. See [`ItemContainer::new`].
pub fn create_item_container() -> ItemContainer {
    ItemContainer::new()
}

/// Returns a new blank item. See [`Item::new`].
pub fn create_item() -> Item {
    Item::new()
}
