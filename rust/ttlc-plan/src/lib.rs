// rust/ttlc-plan/src/lib.rs
// The .plan.bin format: one contiguous little-endian image with a
// header, node table, triple array, prefix table, and string pool

mod layout;
mod reader;
mod writer;

pub use layout::{PlanError, HEADER_LEN, MAGIC, VERSION_MAJOR, VERSION_MINOR};
pub use reader::{NodeView, PlanTriple, PlanView};
pub use writer::{serialize, write_file};
