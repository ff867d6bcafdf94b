//! Recipe entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe moderation status.
///
/// Every upload starts `Pending`. Only an admin moves it to `Approved`
/// (visible in the public catalog) or `Rejected` (retained but hidden).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RecipeStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Preparation time in minutes
    pub prep_time: i32,

    /// Cooking time in minutes
    pub cook_time: i32,

    pub servings: i32,

    #[sea_orm(indexed)]
    pub category_id: String,

    /// URL path of the uploaded image, if any
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    /// Ordered list of ingredient strings
    #[sea_orm(column_type = "JsonBinary")]
    pub ingredients: Json,

    /// Ordered list of instruction steps
    #[sea_orm(column_type = "JsonBinary")]
    pub instructions: Json,

    pub status: RecipeStatus,

    /// Uploading user; NULL once the author account is deleted
    #[sea_orm(nullable, indexed)]
    pub author_id: Option<String>,

    /// Admin-promoted placement on the browse page
    #[sea_orm(default_value = false)]
    pub is_featured: bool,

    /// Like count (derived; must equal the number of like rows)
    #[sea_orm(default_value = 0)]
    pub likes_count: i32,

    /// Mean rating rounded to one decimal (derived from rating rows)
    #[sea_orm(default_value = 0.0)]
    pub average_rating: f64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Author,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Ingredient strings, in submission order.
    #[must_use]
    pub fn ingredient_list(&self) -> Vec<String> {
        json_string_list(&self.ingredients)
    }

    /// Instruction steps, in submission order.
    #[must_use]
    pub fn instruction_list(&self) -> Vec<String> {
        json_string_list(&self.instructions)
    }
}

fn json_string_list(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_string_list() {
        let list = json_string_list(&json!(["2 eggs", "1 cup milk"]));
        assert_eq!(list, vec!["2 eggs".to_string(), "1 cup milk".to_string()]);
    }

    #[test]
    fn test_json_string_list_not_an_array() {
        assert!(json_string_list(&json!({"oops": true})).is_empty());
    }
}
