mod clock;
mod topic;

pub use clock::{format_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use topic::{
    consumed_marker, is_pending_status, Column, LineEnding, PendingTopic, TopicRecord, TopicTable,
    PENDING_MARKERS,
};
