use super::ScrollProgress;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("a threshold table needs at least two sections")]
    TooFewSections,
    #[error("threshold {index} ({value}) must lie strictly between 0 and 1")]
    OutOfRange { index: usize, value: f32 },
    #[error("threshold {index} ({value}) must be greater than the one before it")]
    NotIncreasing { index: usize, value: f32 },
    #[error("expected {expected} thresholds for {sections} sections, got {actual}")]
    WrongCount {
        sections: usize,
        expected: usize,
        actual: usize,
    },
}

/// Ordered cut points partitioning `[0, 1]` into contiguous sections.
///
/// `N - 1` strictly increasing values inside `(0, 1)` describe `N` sections.
/// A progress value sitting exactly on a cut point belongs to the upper
/// section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionThresholds {
    cuts: Vec<f32>,
}

impl SectionThresholds {
    pub fn new(cuts: Vec<f32>) -> Result<Self, ThresholdError> {
        if cuts.is_empty() {
            return Err(ThresholdError::TooFewSections);
        }
        let mut previous = 0.0f32;
        for (index, &value) in cuts.iter().enumerate() {
            if !(value > 0.0 && value < 1.0) {
                return Err(ThresholdError::OutOfRange { index, value });
            }
            if index > 0 && value <= previous {
                return Err(ThresholdError::NotIncreasing { index, value });
            }
            previous = value;
        }
        Ok(Self { cuts })
    }

    /// Evenly spaced table: cut `i` sits at `i / sections`.
    pub fn uniform(sections: usize) -> Result<Self, ThresholdError> {
        if sections < 2 {
            return Err(ThresholdError::TooFewSections);
        }
        let cuts = (1..sections)
            .map(|i| i as f32 / sections as f32)
            .collect();
        Self::new(cuts)
    }

    /// Cuts halfway between panel resting offsets, so the section changes
    /// when the next panel fills more than half the viewport.
    pub fn midpoints(sections: usize) -> Result<Self, ThresholdError> {
        if sections < 2 {
            return Err(ThresholdError::TooFewSections);
        }
        let span = (sections - 1) as f32;
        let cuts = (1..sections)
            .map(|i| (i as f32 - 0.5) / span)
            .collect();
        Self::new(cuts)
    }

    /// Validates a custom table against the number of panels on screen.
    pub fn for_sections(cuts: Vec<f32>, sections: usize) -> Result<Self, ThresholdError> {
        let expected = sections.saturating_sub(1);
        if cuts.len() != expected {
            return Err(ThresholdError::WrongCount {
                sections,
                expected,
                actual: cuts.len(),
            });
        }
        Self::new(cuts)
    }

    pub fn section_count(&self) -> usize {
        self.cuts.len() + 1
    }

    pub fn cuts(&self) -> &[f32] {
        &self.cuts
    }

    pub fn classify(&self, progress: ScrollProgress) -> usize {
        classify(progress.get(), &self.cuts)
    }
}

/// Section classifier: index of the interval containing `progress`.
///
/// `progress < cuts[i]` places it below section `i`; equality belongs to the
/// upper interval. Out-of-range input saturates at the first or last section.
pub fn classify(progress: f32, cuts: &[f32]) -> usize {
    if progress.is_nan() {
        return 0;
    }
    cuts.partition_point(|&cut| cut <= progress)
}
