//! Mountain and camera metadata served by `GET /api/data`.
//!
//! The API has shipped both a JSON array of mountains and a JSON object
//! keyed by mountain id (with cameras nested the same way). Either shape
//! is accepted and stored keyed by id.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub type MountainId = u32;
pub type CameraId = u32;

/// A camera mounted on a mountain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    #[serde(default)]
    pub elevation_ft: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    /// Minutes between scrapes.
    #[serde(default)]
    pub interval: u32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Camera {
    /// Label used in the camera picker.
    pub fn label(&self) -> String {
        format!("{} ({}ft)", self.name, self.elevation_ft)
    }
}

/// Timezone as reported by the API.
///
/// Older deployments send the Google Time Zone API payload, newer ones an
/// IANA location name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timezone {
    Name(String),
    Offsets {
        #[serde(rename = "timeZoneName")]
        name: String,
        #[serde(rename = "rawOffset", default)]
        raw_offset: f64,
        #[serde(rename = "dstOffset", default)]
        dst_offset: f64,
    },
}

fn seconds_to_hours(seconds: f64) -> i64 {
    (seconds / 3600.0).trunc() as i64
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timezone::Name(name) => f.write_str(name),
            Timezone::Offsets {
                name,
                raw_offset,
                dst_offset,
            } => write!(
                f,
                "{} (UTC{:+}hr, {:+}hr DST)",
                name,
                seconds_to_hours(*raw_offset),
                seconds_to_hours(*dst_offset)
            ),
        }
    }
}

/// A mountain and its cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mountain {
    pub id: MountainId,
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub elevation_ft: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub tz: Option<Timezone>,
    #[serde(default, deserialize_with = "keyed_or_list")]
    pub cams: BTreeMap<CameraId, Camera>,
}

impl Mountain {
    /// Label used in the mountain picker.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.state)
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cams.get(&id)
    }

    /// Cameras in ascending id order.
    pub fn cameras(&self) -> impl Iterator<Item = &Camera> {
        self.cams.values()
    }

    pub fn first_camera(&self) -> Option<&Camera> {
        self.cams.values().next()
    }
}

/// All mountains known to the service, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    mountains: BTreeMap<MountainId, Mountain>,
}

impl Catalog {
    pub fn from_mountains(mountains: impl IntoIterator<Item = Mountain>) -> Self {
        Self {
            mountains: mountains.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn mountain(&self, id: MountainId) -> Option<&Mountain> {
        self.mountains.get(&id)
    }

    pub fn camera(&self, mountain_id: MountainId, camera_id: CameraId) -> Option<&Camera> {
        self.mountain(mountain_id)
            .and_then(|mountain| mountain.camera(camera_id))
    }

    /// Mountains in ascending id order.
    pub fn mountains(&self) -> impl Iterator<Item = &Mountain> {
        self.mountains.values()
    }

    pub fn first_mountain(&self) -> Option<&Mountain> {
        self.mountains.values().next()
    }

    pub fn len(&self) -> usize {
        self.mountains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mountains.is_empty()
    }

    /// Id of the mountain `offset` positions away from `current`, wrapping.
    pub fn cycle_mountain(&self, current: Option<MountainId>, offset: isize) -> Option<MountainId> {
        let ids: Vec<MountainId> = self.mountains.keys().copied().collect();
        cycle_id(&ids, current, offset)
    }

    /// Id of the camera `offset` positions away from `current` on a mountain, wrapping.
    pub fn cycle_camera(
        &self,
        mountain_id: MountainId,
        current: Option<CameraId>,
        offset: isize,
    ) -> Option<CameraId> {
        let mountain = self.mountain(mountain_id)?;
        let ids: Vec<CameraId> = mountain.cams.keys().copied().collect();
        cycle_id(&ids, current, offset)
    }
}

fn cycle_id(ids: &[u32], current: Option<u32>, offset: isize) -> Option<u32> {
    if ids.is_empty() {
        return None;
    }
    let len = ids.len() as isize;
    let position = current
        .and_then(|id| ids.iter().position(|candidate| *candidate == id))
        .map(|p| p as isize)
        .unwrap_or(0);
    let next = (position + offset).rem_euclid(len);
    Some(ids[next as usize])
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mountains = keyed_or_list(deserializer)?;
        Ok(Self { mountains })
    }
}

trait Keyed {
    fn key(&self) -> u32;
}

impl Keyed for Mountain {
    fn key(&self) -> u32 {
        self.id
    }
}

impl Keyed for Camera {
    fn key(&self) -> u32 {
        self.id
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyedOrList<T> {
    List(Vec<T>),
    Keyed(BTreeMap<String, T>),
}

/// Accept either `[item, ...]` or `{"<id>": item, ...}`; the map key is
/// ignored in favor of each item's own id. `null` is an empty map.
fn keyed_or_list<'de, D, T>(deserializer: D) -> Result<BTreeMap<u32, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Keyed,
{
    let items = match Option::<KeyedOrList<T>>::deserialize(deserializer)? {
        Some(KeyedOrList::List(items)) => items,
        Some(KeyedOrList::Keyed(map)) => map.into_values().collect(),
        None => Vec::new(),
    };
    Ok(items.into_iter().map(|item| (item.key(), item)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYED: &str = r#"{
        "2": {"id": 2, "name": "Mt. Hood", "state": "OR", "elevation_ft": 11249,
              "latitude": 45.37, "longitude": -121.69,
              "tz": {"timeZoneName": "Pacific Standard Time", "rawOffset": -28800, "dstOffset": 0},
              "cams": {
                "7": {"id": 7, "name": "Timberline", "elevation_ft": 6000, "latitude": 45.33,
                      "longitude": -121.71, "interval": 10, "comment": "lodge roof", "is_active": true},
                "3": {"id": 3, "name": "Meadows", "elevation_ft": 5300, "latitude": 45.33,
                      "longitude": -121.66, "interval": 15, "comment": null, "is_active": false}
              }},
        "1": {"id": 1, "name": "Mt. Rainier", "state": "WA", "elevation_ft": 14411,
              "latitude": 46.85, "longitude": -121.76, "tz": "America/Los_Angeles", "cams": {}}
    }"#;

    #[test]
    fn test_catalog_from_keyed_object() {
        let catalog: Catalog = serde_json::from_str(KEYED).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.first_mountain().unwrap().name, "Mt. Rainier");

        let hood = catalog.mountain(2).unwrap();
        let ids: Vec<CameraId> = hood.cameras().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 7]);
        assert_eq!(catalog.camera(2, 7).unwrap().comment.as_deref(), Some("lodge roof"));
        assert_eq!(catalog.camera(2, 3).unwrap().comment, None);
        assert!(catalog.camera(1, 7).is_none());
    }

    #[test]
    fn test_catalog_from_list() {
        let json = r#"[{"id": 4, "name": "Shasta", "state": "CA", "elevation_ft": 14179,
                        "latitude": 41.4, "longitude": -122.19, "tz": "America/Los_Angeles",
                        "cams": [{"id": 9, "name": "Bunny Flat", "elevation_ft": 6950,
                                  "latitude": 41.35, "longitude": -122.23, "interval": 30,
                                  "comment": "", "is_active": true}]}]"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.mountain(4).unwrap().first_camera().unwrap().id, 9);
    }

    #[test]
    fn test_labels() {
        let catalog: Catalog = serde_json::from_str(KEYED).unwrap();
        let hood = catalog.mountain(2).unwrap();
        assert_eq!(hood.label(), "Mt. Hood (OR)");
        assert_eq!(hood.camera(7).unwrap().label(), "Timberline (6000ft)");
    }

    #[test]
    fn test_timezone_display() {
        let catalog: Catalog = serde_json::from_str(KEYED).unwrap();
        let hood_tz = catalog.mountain(2).unwrap().tz.as_ref().unwrap().to_string();
        assert_eq!(hood_tz, "Pacific Standard Time (UTC-8hr, +0hr DST)");
        let rainier_tz = catalog.mountain(1).unwrap().tz.as_ref().unwrap().to_string();
        assert_eq!(rainier_tz, "America/Los_Angeles");
    }

    #[test]
    fn test_cycle_ids_wrap() {
        let catalog: Catalog = serde_json::from_str(KEYED).unwrap();
        assert_eq!(catalog.cycle_mountain(Some(1), 1), Some(2));
        assert_eq!(catalog.cycle_mountain(Some(2), 1), Some(1));
        assert_eq!(catalog.cycle_mountain(Some(1), -1), Some(2));
        assert_eq!(catalog.cycle_camera(2, Some(7), 1), Some(3));
        assert_eq!(catalog.cycle_camera(1, None, 1), None);
    }

    #[test]
    fn test_null_cams_is_empty() {
        let catalog: Catalog = serde_json::from_str(
            r#"[{"id": 1, "name": "Mt. Rainier", "state": "WA", "cams": null},
                {"id": 2, "name": "Mt. Hood", "state": "OR",
                 "cams": [{"id": 7, "name": "Timberline", "is_active": true}]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.mountain(1).unwrap().first_camera().is_none());
        assert_eq!(catalog.camera(2, 7).unwrap().name, "Timberline");
    }
}
