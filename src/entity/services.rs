use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_images::Entity")]
    ServiceImages,
}

impl Related<super::service_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
