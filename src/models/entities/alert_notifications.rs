use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "alert_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub alert_id: Uuid,
    pub transport_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub last_attempt: Option<DateTime>,
    pub sent_at: Option<DateTime>,
    pub error: Option<String>,
    pub response: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Alert,
    Transport,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Alert => Entity::belongs_to(super::alerts::Entity)
                .from(Column::AlertId)
                .to(super::alerts::Column::Id)
                .into(),
            Self::Transport => Entity::belongs_to(super::alert_transports::Entity)
                .from(Column::TransportId)
                .to(super::alert_transports::Column::Id)
                .into(),
        }
    }
}

impl Related<super::alert_transports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
