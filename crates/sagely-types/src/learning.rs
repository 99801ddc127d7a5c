//! Learning targets and recent lessons.

use serde::{Deserialize, Serialize};

/// A tracked skill area with a numeric proficiency value.
///
/// Proficiency is conceptually a 0-100 scale; the client does not clamp it.
/// Targets are unique by `id` within a session and are never deleted during
/// an activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningTarget {
    pub id: i64,
    pub topic_name: String,
    pub proficiency: f64,
}

/// A recorded lesson summary.
///
/// Read-mostly: the list is hydrated from the backend and prepended to when
/// a new lesson is explicitly recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub summary: String,
}
