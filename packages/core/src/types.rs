// ABOUTME: Planning entity definitions shared across Planboard packages
// ABOUTME: Projects, sub-projects, activities and the instances placed on the grid

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::DateKey;

/// A named, contiguous range of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub start_date: DateKey,
    pub end_date: DateKey,
    pub length_days: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn contains(&self, day: DateKey) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

/// A partition of a project. Every project owns at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProject {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// A colored row available to every sub-project of its project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// One (sub-project, activity, day) marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: i64,
    pub sub_project_id: i64,
    pub activity_id: i64,
    pub day: DateKey,
    pub created_at: DateTime<Utc>,
}

/// Direction for swapping an entry with its neighbor in a sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl std::str::FromStr for MoveDirection {
    type Err = crate::validation::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            _ => Err(crate::validation::ValidationError::InvalidDirection(
                s.to_string(),
            )),
        }
    }
}
