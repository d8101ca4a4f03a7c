use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tags::repo_types::Tag;

#[derive(Debug, Deserialize)]
pub struct TagPayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}
