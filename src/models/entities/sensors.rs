use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "sensors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub device_id: Uuid,
    pub index: i32,
    #[sea_orm(column_name = "type")]
    pub r#type: String,
    pub descr: String,
    pub class: String,
    pub oid: String,
    pub value: Option<f64>,
    pub prev_value: Option<f64>,
    pub limit_high: Option<f64>,
    pub limit_low: Option<f64>,
    pub warn_high: Option<f64>,
    pub warn_low: Option<f64>,
    pub divisor: f64,
    pub multiplier: f64,
    pub disabled: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::devices::Entity",
        from = "Column::DeviceId",
        to = "super::devices::Column::Id"
    )]
    Device,
}

impl ActiveModelBehavior for ActiveModel {}
