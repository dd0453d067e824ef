//! Engagement rate and quality grade computation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::types::QualifiedVideo;

/// `(likes + comments) / max(views, 1)`.
pub fn engagement_rate(like_count: u64, comment_count: u64, view_count: u64) -> f64 {
    let interactions = like_count.saturating_add(comment_count) as f64;
    interactions / view_count.max(1) as f64
}

/// Reporting-only quality bucket. Variants are declared best-first so the
/// derived `Ord` sorts A+ before C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C")]
    C,
}

/// (grade, minimum engagement rate, minimum views), best band first.
const GRADE_BANDS: [(QualityGrade, f64, u64); 4] = [
    (QualityGrade::APlus, 0.05, 100_000),
    (QualityGrade::A, 0.03, 50_000),
    (QualityGrade::BPlus, 0.02, 10_000),
    (QualityGrade::B, 0.01, 1_000),
];

impl QualityGrade {
    pub const ALL: [QualityGrade; 5] = [
        QualityGrade::APlus,
        QualityGrade::A,
        QualityGrade::BPlus,
        QualityGrade::B,
        QualityGrade::C,
    ];

    /// First band whose engagement and view thresholds are both met.
    pub fn from_metrics(engagement_rate: f64, view_count: u64) -> Self {
        GRADE_BANDS
            .iter()
            .find(|(_, min_rate, min_views)| {
                engagement_rate >= *min_rate && view_count >= *min_views
            })
            .map(|(grade, _, _)| *grade)
            .unwrap_or(QualityGrade::C)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::APlus => "A+",
            QualityGrade::A => "A",
            QualityGrade::BPlus => "B+",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of videos per grade, every grade present (zero if unused).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDistribution(BTreeMap<QualityGrade, usize>);

impl QualityDistribution {
    pub fn from_videos(videos: &[QualifiedVideo]) -> Self {
        let mut counts: BTreeMap<QualityGrade, usize> =
            QualityGrade::ALL.iter().map(|g| (*g, 0)).collect();
        for video in videos {
            *counts.entry(video.quality_grade).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, grade: QualityGrade) -> usize {
        self.0.get(&grade).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Grades best-first with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (QualityGrade, usize)> + '_ {
        self.0.iter().map(|(g, c)| (*g, *c))
    }
}

impl Default for QualityDistribution {
    fn default() -> Self {
        Self::from_videos(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_rate() {
        assert!((engagement_rate(40, 10, 1000) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_engagement_rate_zero_views_uses_floor() {
        assert_eq!(engagement_rate(3, 2, 0), 5.0);
        assert_eq!(engagement_rate(0, 0, 0), 0.0);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(QualityGrade::from_metrics(0.05, 100_000), QualityGrade::APlus);
        assert_eq!(QualityGrade::from_metrics(0.08, 99_999), QualityGrade::A);
        assert_eq!(QualityGrade::from_metrics(0.03, 50_000), QualityGrade::A);
        assert_eq!(QualityGrade::from_metrics(0.02, 10_000), QualityGrade::BPlus);
        assert_eq!(QualityGrade::from_metrics(0.01, 1_000), QualityGrade::B);
        assert_eq!(QualityGrade::from_metrics(0.2, 999), QualityGrade::C);
        assert_eq!(QualityGrade::from_metrics(0.009, 1_000_000), QualityGrade::C);
    }

    #[test]
    fn test_grade_is_monotonic_in_both_inputs() {
        let rates = [0.0, 0.005, 0.01, 0.02, 0.03, 0.05, 0.1];
        let views = [0, 999, 1_000, 10_000, 50_000, 100_000, 1_000_000];
        for (i, r) in rates.iter().enumerate() {
            for (j, v) in views.iter().enumerate() {
                let g = QualityGrade::from_metrics(*r, *v);
                if let Some(r2) = rates.get(i + 1) {
                    assert!(QualityGrade::from_metrics(*r2, *v) <= g);
                }
                if let Some(v2) = views.get(j + 1) {
                    assert!(QualityGrade::from_metrics(*r, *v2) <= g);
                }
            }
        }
    }

    #[test]
    fn test_grade_serialization() {
        assert_eq!(serde_json::to_string(&QualityGrade::APlus).unwrap(), "\"A+\"");
        assert_eq!(QualityGrade::BPlus.to_string(), "B+");
    }

    #[test]
    fn test_empty_distribution_lists_every_grade() {
        let dist = QualityDistribution::default();
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.iter().count(), 5);
        assert_eq!(dist.iter().next().map(|(g, _)| g), Some(QualityGrade::APlus));
    }
}
