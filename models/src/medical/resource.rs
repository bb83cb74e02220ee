// models/src/medical/resource.rs
use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    documents::Document,
    errors::{ValidationError, ValidationResult},
    identifiers::{Collection, next_id},
    properties::IntoFieldValue,
};

pub mod fields {
    pub const NAME: &str = "name";
}

pub mod reservation_fields {
    pub const APPOINTMENT_ID: &str = "appointmentId";
    pub const RESOURCE_ID: &str = "resourceId";
    pub const RESOURCE_NAME: &str = "resourceName";
    pub const RESOURCE_TYPE: &str = "resourceType";
    pub const START_TIME: &str = "startTime";
    pub const END_TIME: &str = "endTime";
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Facility,
    Equipment,
    Medicine,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Facility => "facility",
            ResourceType::Equipment => "equipment",
            ResourceType::Medicine => "medicine",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        match s {
            "facility" => Ok(ResourceType::Facility),
            "equipment" => Ok(ResourceType::Equipment),
            "medicine" => Ok(ResourceType::Medicine),
            other => Err(ValidationError::UnknownVariant { kind: "resource type", value: other.to_string() }),
        }
    }
}

impl IntoFieldValue for ResourceType {
    fn into_field_value(self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// A shared clinical resource. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

impl Resource {
    pub fn from_new(new_resource: NewResource) -> ValidationResult<Self> {
        if new_resource.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        Ok(Resource { id: next_id(), name: new_resource.name, resource_type: new_resource.resource_type })
    }

    /// Fails with `ResourceTypeMismatch` unless this resource is of `expected` type.
    pub fn ensure_type(&self, expected: ResourceType) -> ValidationResult<()> {
        if self.resource_type == expected {
            Ok(())
        } else {
            Err(ValidationError::ResourceTypeMismatch {
                resource_id: self.id,
                expected,
                found: self.resource_type,
            })
        }
    }
}

impl Document for Resource {
    const COLLECTION: Collection = Collection::Resources;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Resources grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSet {
    #[serde(default)]
    pub facilities: Vec<Resource>,
    #[serde(default)]
    pub equipment: Vec<Resource>,
    #[serde(default)]
    pub medicine: Vec<Resource>,
}

impl ResourceSet {
    /// Groups resources by their type, keeping the input order within a group.
    pub fn partition(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut set = ResourceSet::default();
        for resource in resources {
            set.slot_mut(resource.resource_type).push(resource);
        }
        set
    }

    pub fn slot(&self, resource_type: ResourceType) -> &[Resource] {
        match resource_type {
            ResourceType::Facility => &self.facilities,
            ResourceType::Equipment => &self.equipment,
            ResourceType::Medicine => &self.medicine,
        }
    }

    fn slot_mut(&mut self, resource_type: ResourceType) -> &mut Vec<Resource> {
        match resource_type {
            ResourceType::Facility => &mut self.facilities,
            ResourceType::Equipment => &mut self.equipment,
            ResourceType::Medicine => &mut self.medicine,
        }
    }

    /// All resources, facilities first, then equipment, then medicine.
    pub fn flatten(&self) -> Vec<Resource> {
        self.facilities.iter().chain(&self.equipment).chain(&self.medicine).cloned().collect()
    }

    pub fn sort_by_name(&mut self) {
        for slot in [&mut self.facilities, &mut self.equipment, &mut self.medicine] {
            slot.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    pub fn len(&self) -> usize {
        self.facilities.len() + self.equipment.len() + self.medicine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        ResourceSet::partition(iter)
    }
}

/// Reference to a resource inside a decision request. Extra fields sent by
/// clients (such as a display name) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: Uuid,
}

/// Resources selected for an appointment, grouped by the slot they were
/// requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelection {
    #[serde(default)]
    pub facilities: Vec<ResourceRef>,
    #[serde(default)]
    pub equipment: Vec<ResourceRef>,
    #[serde(default)]
    pub medicine: Vec<ResourceRef>,
}

impl ResourceSelection {
    /// One `(declared type, id)` entry per distinct resource id. The first
    /// slot a duplicate id appears in wins.
    pub fn tagged(&self) -> Vec<(ResourceType, Uuid)> {
        let mut seen = HashSet::new();
        let slots = [
            (ResourceType::Facility, &self.facilities),
            (ResourceType::Equipment, &self.equipment),
            (ResourceType::Medicine, &self.medicine),
        ];
        slots
            .into_iter()
            .flat_map(|(resource_type, refs)| refs.iter().map(move |r| (resource_type, r.id)))
            .filter(|(_, id)| seen.insert(*id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty() && self.equipment.is_empty() && self.medicine.is_empty()
    }
}

/// A time-bounded claim of one resource by one appointment, over the
/// half-open interval `[start_time, end_time)`. Name and type are a snapshot
/// of the resource at reservation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_type: ResourceType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Reservation {
    pub fn new(appointment_id: Uuid, resource: &Resource, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Reservation {
            id: next_id(),
            appointment_id,
            resource_id: resource.id,
            resource_name: resource.name.clone(),
            resource_type: resource.resource_type,
            start_time,
            end_time,
        }
    }

    pub fn snapshot(&self) -> Resource {
        Resource { id: self.resource_id, name: self.resource_name.clone(), resource_type: self.resource_type }
    }
}

/// A request to reserve one resource for an appointment over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub appointment_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Resources assigned to an already booked appointment, at most one per
/// type, reserved from `start` until the appointment ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAssignment {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub equipment_id: Option<Uuid>,
    #[serde(default)]
    pub facility_id: Option<Uuid>,
    #[serde(default)]
    pub medicine_id: Option<Uuid>,
}

impl ResourceAssignment {
    /// Present ids with the slot they were given for, equipment first, then
    /// facility, then medicine.
    pub fn slots(&self) -> Vec<(ResourceType, Uuid)> {
        [
            (ResourceType::Equipment, self.equipment_id),
            (ResourceType::Facility, self.facility_id),
            (ResourceType::Medicine, self.medicine_id),
        ]
        .into_iter()
        .filter_map(|(resource_type, id)| id.map(|id| (resource_type, id)))
        .collect()
    }
}

impl Document for Reservation {
    const COLLECTION: Collection = Collection::Reservations;

    fn id(&self) -> Uuid {
        self.id
    }
}
