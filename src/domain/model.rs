use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value stored under `additional_info` (and unknown `address.*` keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Nested(BTreeMap<String, FieldValue>),
}

pub type AdditionalInfo = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub first_name: String,
    pub last_name: String,
}

impl Name {
    /// Single display string persisted by the stores.
    pub fn display(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    /// Any other `address.*` columns, passed through untouched.
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, FieldValue>,
}

impl Address {
    pub const KNOWN_FIELDS: [&'static str; 6] =
        ["line1", "line2", "city", "state", "country", "pincode"];

    pub fn is_known_field(key: &str) -> bool {
        Self::KNOWN_FIELDS.contains(&key)
    }

    pub(crate) fn known_field_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "line1" => Some(&mut self.line1),
            "line2" => Some(&mut self.line2),
            "city" => Some(&mut self.city),
            "state" => Some(&mut self.state),
            "country" => Some(&mut self.country),
            "pincode" => Some(&mut self.pincode),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: Name,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

/// A person as persisted by a [`RecordStore`](crate::domain::ports::RecordStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPerson {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub address: Option<Address>,
    pub additional_info: Option<AdditionalInfo>,
    pub imported_at: DateTime<Utc>,
}

impl StoredPerson {
    pub fn from_record(id: u64, record: PersonRecord, imported_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: record.name.display(),
            age: record.age,
            address: record.address,
            additional_info: record.additional_info,
            imported_at,
        }
    }
}

/// Half-open age interval `[min, max)`; `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub min: u32,
    pub max: Option<u32>,
}

impl AgeRange {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && self.max.map_or(true, |max| age < max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    Under20,
    From20To40,
    From40To60,
    Over60,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Under20,
        AgeBucket::From20To40,
        AgeBucket::From40To60,
        AgeBucket::Over60,
    ];

    pub fn for_age(age: u32) -> Self {
        match age {
            0..=19 => AgeBucket::Under20,
            20..=39 => AgeBucket::From20To40,
            40..=59 => AgeBucket::From40To60,
            _ => AgeBucket::Over60,
        }
    }

    pub fn range(self) -> AgeRange {
        match self {
            AgeBucket::Under20 => AgeRange { min: 0, max: Some(20) },
            AgeBucket::From20To40 => AgeRange { min: 20, max: Some(40) },
            AgeBucket::From40To60 => AgeRange { min: 40, max: Some(60) },
            AgeBucket::Over60 => AgeRange { min: 60, max: None },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under20 => "< 20",
            AgeBucket::From20To40 => "20 to 40",
            AgeBucket::From40To60 => "40 to 60",
            AgeBucket::Over60 => "> 60",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeCounts {
    pub under_20: u64,
    pub age_20_to_40: u64,
    pub age_40_to_60: u64,
    pub over_60: u64,
    pub total: u64,
}

impl AgeCounts {
    pub fn get(&self, bucket: AgeBucket) -> u64 {
        match bucket {
            AgeBucket::Under20 => self.under_20,
            AgeBucket::From20To40 => self.age_20_to_40,
            AgeBucket::From40To60 => self.age_40_to_60,
            AgeBucket::Over60 => self.over_60,
        }
    }

    pub fn set(&mut self, bucket: AgeBucket, count: u64) {
        match bucket {
            AgeBucket::Under20 => self.under_20 = count,
            AgeBucket::From20To40 => self.age_20_to_40 = count,
            AgeBucket::From40To60 => self.age_40_to_60 = count,
            AgeBucket::Over60 => self.over_60 = count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeDistribution {
    #[serde(rename = "under20")]
    pub under_20: u32,
    #[serde(rename = "age20to40")]
    pub age_20_to_40: u32,
    #[serde(rename = "age40to60")]
    pub age_40_to_60: u32,
    #[serde(rename = "over60")]
    pub over_60: u32,
    pub total: u64,
}

impl AgeDistribution {
    pub fn percentage(&self, bucket: AgeBucket) -> u32 {
        match bucket {
            AgeBucket::Under20 => self.under_20,
            AgeBucket::From20To40 => self.age_20_to_40,
            AgeBucket::From40To60 => self.age_40_to_60,
            AgeBucket::Over60 => self.over_60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub cleared: Option<usize>,
    pub destination: String,
}
