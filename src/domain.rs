//! Domain module - listing and detail entities, constants and the remote
//! source interfaces the pipeline is written against.

pub mod constants;
pub mod detail_payload;
pub mod enriched_record;
pub mod listing;
pub mod sources;

pub use detail_payload::{DetailField, DetailPayload};
pub use enriched_record::{ColumnCase, EnrichedRecord};
pub use listing::{ListingPage, ListingRecord};
pub use sources::{BatchJobSource, DetailSource, JobDescriptor, JobStatus, ListingSource};
