use serde::Serialize;
use shared::domain::Record;

/// How a template is bound to its data argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// No data: the template replaces the target's content verbatim.
    RawInsert,
    /// Empty list: one fixed "no content" row is appended.
    EmptyStateInsert,
    SingleRowInsert,
    MultiRowInsert,
}

impl RenderStrategy {
    pub fn select(data: Option<&[Record]>) -> Self {
        match data {
            None => Self::RawInsert,
            Some([]) => Self::EmptyStateInsert,
            Some([_]) => Self::SingleRowInsert,
            Some(_) => Self::MultiRowInsert,
        }
    }

    /// Whether a dependent script runs after this strategy.
    ///
    /// Only raw and single-row renders load it. Multi-row renders skip the
    /// script as the published pages always have; see DESIGN.md before
    /// changing this.
    pub fn loads_dependent_script(self) -> bool {
        matches!(self, Self::RawInsert | Self::SingleRowInsert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<Record> {
        (0..count)
            .map(|idx| Record::new().with_field("name", idx.to_string()))
            .collect()
    }

    #[test]
    fn selects_by_data_shape() {
        assert_eq!(RenderStrategy::select(None), RenderStrategy::RawInsert);
        assert_eq!(
            RenderStrategy::select(Some(&rows(0))),
            RenderStrategy::EmptyStateInsert
        );
        assert_eq!(
            RenderStrategy::select(Some(&rows(1))),
            RenderStrategy::SingleRowInsert
        );
        assert_eq!(
            RenderStrategy::select(Some(&rows(6))),
            RenderStrategy::MultiRowInsert
        );
    }

    #[test]
    fn selection_is_idempotent() {
        for data in [None, Some(rows(0)), Some(rows(1)), Some(rows(2))] {
            let first = RenderStrategy::select(data.as_deref());
            let second = RenderStrategy::select(data.as_deref());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn only_raw_and_single_row_load_scripts() {
        assert!(RenderStrategy::RawInsert.loads_dependent_script());
        assert!(RenderStrategy::SingleRowInsert.loads_dependent_script());
        assert!(!RenderStrategy::EmptyStateInsert.loads_dependent_script());
        assert!(!RenderStrategy::MultiRowInsert.loads_dependent_script());
    }
}
