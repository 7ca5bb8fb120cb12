// ============================================================
// Layer 4 — Stage Chain
// ============================================================
// Runs an ordered list of stages over one table:
//
//   table ──► stage 1 ──► stage 2 ──► … ──► stage N ──► table
//
// The chain is assembled with PipelineBuilder before any data
// is seen and cannot be changed afterwards; Pipeline only
// exposes run(). The stages live in a Vec owned by the
// Pipeline, and run() walks them with a plain loop, passing the
// table by value from one to the next.
//
// The first stage error stops the run. Later stages never see
// the table.

use crate::domain::error::PipelineResult;
use crate::domain::table::RecordTable;
use crate::domain::traits::Stage;

/// A fixed, ordered chain of stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order and return the final table.
    pub fn run(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
        let total = self.stages.len();

        for (idx, stage) in self.stages.iter_mut().enumerate() {
            let rows_in = table.n_rows();
            tracing::debug!(
                "Stage {}/{} '{}' ({} rows, {} columns)",
                idx + 1,
                total,
                stage.name(),
                rows_in,
                table.n_columns()
            );

            table = stage.process(table).map_err(|e| {
                tracing::error!("Stage '{}' failed: {}", stage.name(), e);
                e
            })?;

            debug_assert_eq!(table.n_rows(), rows_in, "stage '{}' changed the row count", stage.name());
        }

        tracing::info!("Pipeline finished: {} stages, {} rows", total, table.n_rows());
        Ok(table)
    }
}

/// Collects stages in order, then freezes them into a Pipeline.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Append a stage after the ones already added.
    pub fn then(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a stage only when `enabled`.
    pub fn then_if(self, enabled: bool, stage: impl Stage + 'static) -> Self {
        if enabled { self.then(stage) } else { self }
    }

    pub fn build(self) -> Pipeline {
        Pipeline { stages: self.stages }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::PipelineError;
    use crate::domain::table::{Column, ColumnData};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Appends its name to a shared log and adds a marker column.
    struct Recorder {
        name: &'static str,
        log:  Rc<RefCell<Vec<&'static str>>>,
    }

    impl Stage for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process(&mut self, mut table: RecordTable) -> PipelineResult<RecordTable> {
            self.log.borrow_mut().push(self.name);
            let n = table.n_rows();
            table.set_column(self.name, ColumnData::Int(vec![1; n]))?;
            Ok(table)
        }
    }

    struct Failing;

    impl Stage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn process(&mut self, table: RecordTable) -> PipelineResult<RecordTable> {
            table.require(self.name(), "nope")?;
            Ok(table)
        }
    }

    fn one_row_table() -> RecordTable {
        RecordTable::from_columns(vec![Column::new("x", ColumnData::Int(vec![0]))]).unwrap()
    }

    #[test]
    fn test_runs_stages_in_build_order() {
        let log      = Rc::new(RefCell::new(Vec::new()));
        let mut pipe = Pipeline::builder()
            .then(Recorder { name: "a", log: log.clone() })
            .then(Recorder { name: "b", log: log.clone() })
            .then(Recorder { name: "c", log: log.clone() })
            .build();

        let out = pipe.run(one_row_table()).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(out.column_names(), vec!["x", "a", "b", "c"]);
        assert_eq!(pipe.stage_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failure_stops_downstream_stages() {
        let log      = Rc::new(RefCell::new(Vec::new()));
        let mut pipe = Pipeline::builder()
            .then(Recorder { name: "a", log: log.clone() })
            .then(Failing)
            .then(Recorder { name: "c", log: log.clone() })
            .build();

        let err = pipe.run(one_row_table()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(_)));
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_then_if_skips_disabled_stage() {
        let log  = Rc::new(RefCell::new(Vec::new()));
        let pipe = Pipeline::builder()
            .then_if(false, Recorder { name: "a", log: log.clone() })
            .then_if(true, Recorder { name: "b", log })
            .build();
        assert_eq!(pipe.stage_names(), vec!["b"]);
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let mut pipe = Pipeline::builder().build();
        assert!(pipe.stage_names().is_empty());
        assert_eq!(pipe.run(one_row_table()).unwrap(), one_row_table());
    }
}
