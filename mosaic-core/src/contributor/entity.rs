use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::RuntimeContextContributor;
use crate::entity::{EntityFormatters, SerializedEntity};
use crate::error::Result;
use crate::runtime::{keys, AmbientState, RuntimeContext};

/// Claims the first request item whose value is a serialized entity.
///
/// The claimed entity becomes the request's current entity: its snapshot,
/// id, parent id and type replace whatever the data bag held before, its
/// template variables are merged and one formatted block is appended. Ids
/// are only stored when they are valid UUIDs; an id the entity does not
/// carry is removed rather than left over from ambient state. Items that
/// fail to parse stay unhandled, and further entity items fall through to
/// the catch-all.
#[derive(Debug, Clone, Default)]
pub struct SerializedEntityContributor {
    formatters: EntityFormatters,
}

impl SerializedEntityContributor {
    /// Create a contributor using the given formatters.
    pub fn new(formatters: EntityFormatters) -> Self {
        Self { formatters }
    }

    fn apply(&self, runtime: &mut RuntimeContext, entity: SerializedEntity) {
        let data = runtime.data_mut();
        match Uuid::parse_str(&entity.unique) {
            Ok(id) => data.set(keys::ENTITY_ID, id),
            Err(_) => {
                data.remove(keys::ENTITY_ID);
            }
        }
        match entity
            .parent_unique
            .as_deref()
            .and_then(|p| Uuid::parse_str(p).ok())
        {
            Some(parent_id) => data.set(keys::PARENT_ENTITY_ID, parent_id),
            None => {
                data.remove(keys::PARENT_ENTITY_ID);
            }
        }
        data.set(keys::ENTITY_TYPE, entity.entity_type.clone());

        for (name, value) in entity.variables() {
            runtime.set_variable(name, value);
        }
        runtime.add_system_message_part(self.formatters.format(&entity));
        runtime.data_mut().set(keys::SERIALIZED_ENTITY, entity);
    }
}

#[async_trait]
impl RuntimeContextContributor for SerializedEntityContributor {
    fn name(&self) -> &str {
        "serialized-entity"
    }

    async fn contribute(
        &self,
        runtime: &mut RuntimeContext,
        _ambient: &AmbientState,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        let entity = runtime.request_items_mut().claim_first(|item| {
            let value = item.value.as_deref()?;
            match SerializedEntity::parse(value) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    tracing::trace!(description = %item.description, %err, "not a serialized entity");
                    None
                }
            }
        });

        if let Some(entity) = entity {
            self.apply(runtime, entity);
        }
        Ok(())
    }
}
