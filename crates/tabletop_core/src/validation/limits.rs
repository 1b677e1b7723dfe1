//! Length bounds applied by the game schema.

use serde::{Deserialize, Serialize};

pub const GAME_TITLE_MIN_LENGTH: usize = 3;
pub const GAME_TITLE_MAX_LENGTH: usize = 100;
pub const GAME_DESCRIPTION_MIN_LENGTH: usize = 10;
pub const GAME_DESCRIPTION_MAX_LENGTH: usize = 1000;
pub const CONTAINER_LABEL_MIN_LENGTH: usize = 3;
pub const CONTAINER_LABEL_MAX_LENGTH: usize = 50;
pub const CONTAINER_DESCRIPTION_MAX_LENGTH: usize = 500;
pub const CONTAINER_ITEM_TYPE_MAX_LENGTH: usize = 50;
pub const ITEM_LABEL_MAX_LENGTH: usize = 100;
pub const ITEM_TYPE_MAX_LENGTH: usize = 100;
pub const ITEM_STATUS_NOTE_MAX_LENGTH: usize = 500;
pub const ITEM_DESCRIPTION_MAX_LENGTH: usize = 500;
pub const COUNTER_LABEL_MAX_LENGTH: usize = 100;

/// Overridable schema bounds. Every field defaults to the matching constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub title_min: usize,
    pub title_max: usize,
    pub description_min: usize,
    pub description_max: usize,
    pub container_label_min: usize,
    pub container_label_max: usize,
    pub container_description_max: usize,
    pub container_item_type_max: usize,
    pub item_label_max: usize,
    pub item_type_max: usize,
    pub item_status_note_max: usize,
    pub item_description_max: usize,
    pub counter_label_max: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            title_min: GAME_TITLE_MIN_LENGTH,
            title_max: GAME_TITLE_MAX_LENGTH,
            description_min: GAME_DESCRIPTION_MIN_LENGTH,
            description_max: GAME_DESCRIPTION_MAX_LENGTH,
            container_label_min: CONTAINER_LABEL_MIN_LENGTH,
            container_label_max: CONTAINER_LABEL_MAX_LENGTH,
            container_description_max: CONTAINER_DESCRIPTION_MAX_LENGTH,
            container_item_type_max: CONTAINER_ITEM_TYPE_MAX_LENGTH,
            item_label_max: ITEM_LABEL_MAX_LENGTH,
            item_type_max: ITEM_TYPE_MAX_LENGTH,
            item_status_note_max: ITEM_STATUS_NOTE_MAX_LENGTH,
            item_description_max: ITEM_DESCRIPTION_MAX_LENGTH,
            counter_label_max: COUNTER_LABEL_MAX_LENGTH,
        }
    }
}
