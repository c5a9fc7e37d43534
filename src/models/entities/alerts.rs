use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rule_id: Uuid,
    pub device_id: Uuid,
    pub severity: String,
    pub state: String,
    pub title: String,
    pub message: String,
    pub details: Json,
    pub first_occurred: DateTime,
    pub last_occurred: DateTime,
    pub occurrences: i32,
    pub acknowledged_at: Option<DateTime>,
    pub acknowledged_by: Option<String>,
    pub resolved_at: Option<DateTime>,
    pub resolved_by: Option<String>,
    pub suppressed_until: Option<DateTime>,
    pub notifications_sent: i32,
    pub last_notification_sent: Option<DateTime>,
    pub escalation_level: i32,
    pub correlation_key: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Rule,
    Device,
    Notifications,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Rule => Entity::belongs_to(super::alert_rules::Entity)
                .from(Column::RuleId)
                .to(super::alert_rules::Column::Id)
                .into(),
            Self::Device => Entity::belongs_to(super::devices::Entity)
                .from(Column::DeviceId)
                .to(super::devices::Column::Id)
                .into(),
            Self::Notifications => super::alert_notifications::Relation::Alert.def().rev(),
        }
    }
}

impl Related<super::alert_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
