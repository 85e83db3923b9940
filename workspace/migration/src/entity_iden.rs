//! Table and column identifiers read from the entity definitions, so the
//! schema created here always matches what the entities query.

use sea_orm::{EntityName, IdenStatic};
use sea_orm_migration::prelude::Alias;

pub trait EntityIden: EntityName + Default {
    /// Identifier of the entity's table.
    fn table() -> Alias {
        Alias::new(Self::default().table_name())
    }

    /// Identifier of one of the entity's columns.
    fn column<C: IdenStatic>(column: C) -> Alias {
        Alias::new(column.as_str())
    }
}

impl<E: EntityName + Default> EntityIden for E {}
