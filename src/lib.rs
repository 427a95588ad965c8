// src/lib.rs
// TTLC: ahead-of-time Turtle/OWL/SHACL compiler
// Parses a semantic specification, computes the OWL closure,
// validates SHACL shapes, and materializes a memory-mappable binary
// execution plan for tick-budgeted hot-path engines

mod error;
mod pipeline;

pub use error::{CompileError, ErrorKind};
pub use pipeline::{
    compile_file, compile_many, compile_str, default_output_path, CompileOptions, CompileOutcome,
    CompileStats,
};

// The component crates, re-exported for embedders.
pub use ttlc_arena as arena;
pub use ttlc_config as config;
pub use ttlc_otel as otel;
pub use ttlc_owl as owl;
pub use ttlc_plan as plan;
pub use ttlc_rdf as rdf;
pub use ttlc_shacl as shacl;
