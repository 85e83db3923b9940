pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_table;
mod m20241001_000002_create_reviews;
mod m20241008_000001_add_review_indexes;
pub mod entity_iden;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_table::Migration),
            Box::new(m20241001_000002_create_reviews::Migration),
            Box::new(m20241008_000001_add_review_indexes::Migration),
        ]
    }
}
