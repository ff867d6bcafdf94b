//! Create recipe table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recipe::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recipe::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Recipe::Description).text().not_null())
                    .col(ColumnDef::new(Recipe::PrepTime).integer().not_null().default(0))
                    .col(ColumnDef::new(Recipe::CookTime).integer().not_null().default(0))
                    .col(ColumnDef::new(Recipe::Servings).integer().not_null().default(0))
                    .col(ColumnDef::new(Recipe::CategoryId).string_len(32).not_null())
                    .col(ColumnDef::new(Recipe::ImageUrl).string_len(1024))
                    .col(ColumnDef::new(Recipe::Ingredients).json_binary().not_null())
                    .col(ColumnDef::new(Recipe::Instructions).json_binary().not_null())
                    .col(
                        ColumnDef::new(Recipe::Status)
                            .string_len(16)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(Recipe::AuthorId).string_len(32))
                    .col(
                        ColumnDef::new(Recipe::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Recipe::LikesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Recipe::AverageRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Recipe::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_category")
                            .from(Recipe::Table, Recipe::CategoryId)
                            .to(Category::Table, Category::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_author")
                            .from(Recipe::Table, Recipe::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: status (catalog shows Approved only)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_status")
                    .table(Recipe::Table)
                    .col(Recipe::Status)
                    .to_owned(),
            )
            .await?;

        // Index: category_id (catalog filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_category_id")
                    .table(Recipe::Table)
                    .col(Recipe::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Index: author_id (per-user recipe counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_author_id")
                    .table(Recipe::Table)
                    .col(Recipe::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (recency ordering, growth buckets)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_created_at")
                    .table(Recipe::Table)
                    .col(Recipe::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recipe::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
    Name,
    Description,
    PrepTime,
    CookTime,
    Servings,
    CategoryId,
    ImageUrl,
    Ingredients,
    Instructions,
    Status,
    AuthorId,
    IsFeatured,
    LikesCount,
    AverageRating,
    CreatedAt,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
