//! Category Model

use serde::{Deserialize, Serialize};

/// How a category participates in all-you-can-eat accounting.
///
/// `Regular` courses count against the per-participant course limit and are
/// blocked while a submission cooldown is running. `Exempt` categories
/// (typically beverages and desserts sold à la carte) bypass both rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseClass {
    #[default]
    Regular,
    Exempt,
}

impl CourseClass {
    pub fn is_exempt(self) -> bool {
        matches!(self, CourseClass::Exempt)
    }
}

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Explicit course-limit capability (replaces the historical numeric
    /// convention, see [`Category::with_legacy_class`])
    pub course_class: CourseClass,
    pub is_active: bool,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>, course_class: CourseClass) -> Self {
        Self {
            id,
            name: name.into(),
            course_class,
            is_active: true,
        }
    }

    /// Migration constructor for catalogs that never stored the capability:
    /// older data encoded "exempt" as category id >= 100. The numeric rule
    /// lives only here.
    pub fn with_legacy_class(id: i64, name: impl Into<String>) -> Self {
        let course_class = if id >= 100 {
            CourseClass::Exempt
        } else {
            CourseClass::Regular
        };
        Self::new(id, name, course_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_threshold_maps_to_course_class() {
        assert_eq!(
            Category::with_legacy_class(5, "primi").course_class,
            CourseClass::Regular
        );
        assert_eq!(
            Category::with_legacy_class(100, "bevande").course_class,
            CourseClass::Exempt
        );
        assert_eq!(
            Category::with_legacy_class(150, "vini").course_class,
            CourseClass::Exempt
        );
    }
}
