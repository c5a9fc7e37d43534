use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "devices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub hostname: String,
    pub address: String,
    pub snmp_config: Json,
    pub os: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub uptime: Option<i64>,
    pub device_type: Option<String>,
    pub groups: Json,
    pub location: Option<String>,
    pub status: String,
    pub disabled: bool,
    pub last_polled: Option<DateTime>,
    pub last_discovered: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Ports,
    Sensors,
    Alerts,
    Topology,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Ports => super::ports::Relation::Device.def().rev(),
            Self::Sensors => super::sensors::Relation::Device.def().rev(),
            Self::Alerts => super::alerts::Relation::Device.def().rev(),
            Self::Topology => super::topology::Relation::Device.def().rev(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
