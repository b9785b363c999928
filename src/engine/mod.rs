pub mod batch_writer;
pub mod scheduler;

pub use batch_writer::{
    BatchWriter, FlushOutcome, PointBatch, PointSender, WriterClosed, WriterConfig,
};
pub use scheduler::{CycleError, PollScheduler};
