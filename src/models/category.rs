use serde::{Deserialize, Serialize};

/// Category node; `child_id` links to a nested category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub title: String,
    pub child_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub title: String,
    #[serde(default)]
    pub child_id: Option<i32>,
}
