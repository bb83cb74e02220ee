// lib/src/records/resources.rs

use log::info;
use models::medical::resource::fields;
use models::medical::{NewResource, Resource, ResourceSet};
use models::{Filter, SchedulingResult, Sort};
use uuid::Uuid;

use super::ClinicRecords;

impl ClinicRecords {
    pub async fn create_resource(&self, new_resource: NewResource) -> SchedulingResult<Resource> {
        let resource = Resource::from_new(new_resource)?;
        self.db.insert(&resource).await?;
        info!("Created {} resource '{}' ({})", resource.resource_type, resource.name, resource.id);
        Ok(resource)
    }

    pub async fn resource(&self, id: Uuid) -> SchedulingResult<Resource> {
        self.db.fetch::<Resource>(id).await
    }

    /// Every resource, grouped by type and sorted by name.
    pub async fn resources(&self) -> SchedulingResult<ResourceSet> {
        let resources = self.db.find::<Resource>(Filter::new(), Sort::ascending(fields::NAME)).await?;
        Ok(ResourceSet::partition(resources))
    }
}
