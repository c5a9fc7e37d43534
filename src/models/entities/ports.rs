use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "ports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub device_id: Uuid,
    pub if_index: i32,
    pub name: String,
    pub alias: Option<String>,
    #[sea_orm(column_name = "type")]
    pub r#type: String,
    pub mtu: Option<i32>,
    pub speed_bps: Option<i64>,
    pub admin_status: String,
    pub oper_status: String,
    pub in_octets: i64,
    pub out_octets: i64,
    pub in_ucast: i64,
    pub out_ucast: i64,
    pub in_discards: i64,
    pub out_discards: i64,
    pub in_errors: i64,
    pub out_errors: i64,
    pub hc_in_octets: Option<i64>,
    pub hc_out_octets: Option<i64>,
    pub disabled: bool,
    pub last_polled: Option<DateTime>,
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
