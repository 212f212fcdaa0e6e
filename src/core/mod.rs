pub mod derive;
pub mod etl;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod summary;

pub use crate::domain::model::{
    Dataset, ExportOutcome, ExtractedData, Record, SummaryCounts, Table, TransformResult,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
