// src/pipeline.rs
// The compilation pipeline: read -> parse -> closure -> validate ->
// materialize. Single-threaded per compilation; the optional worker
// pool fans out whole files and shares nothing

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use ttlc_arena::{Arena, ArenaFlags};
use ttlc_config::TtlcConfig;
use ttlc_otel::{PhaseTimer, PipelineMetrics};
use ttlc_owl::ClosureBuilder;
use ttlc_plan::{serialize, write_file};
use ttlc_rdf::{Graph, Interner, Parser, ParserOptions, Vocab};
use ttlc_shacl::{ReportJson, ShapeSet, ValidationReport, Validator, ValidatorOptions};

use crate::error::CompileError;

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub config: TtlcConfig,
    /// Abort on the first parse error or validation violation; no
    /// output is written.
    pub strict: bool,
    /// Run SHACL validation (on by default via `CompileOptions::new`).
    pub validate: bool,
    /// Cooperative cancellation; checked before each phase.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl CompileOptions {
    pub fn new(config: TtlcConfig) -> CompileOptions {
        CompileOptions {
            strict: config.compile.strict,
            validate: !config.compile.skip_validation,
            config,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileStats {
    pub triples: usize,
    pub nodes: usize,
    pub prefixes: usize,
    pub parse_errors: usize,
    pub image_bytes: usize,
    pub conforms: Option<bool>,
    pub contradictions: Vec<String>,
    pub metrics: PipelineMetrics,
}

#[derive(Debug)]
pub struct CompileOutcome {
    pub image: Vec<u8>,
    pub report: Option<ReportJson>,
    pub stats: CompileStats,
}

/// Replace the input extension with `.plan.bin`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("plan.bin")
}

/// Compile TTL source text into a plan image.
pub fn compile_str(src: &str, opts: &CompileOptions) -> Result<CompileOutcome, CompileError> {
    let cpt = opts.config.telemetry.cycles_per_tick;
    let mut metrics = PipelineMetrics::new(opts.config.telemetry.tick_budget);

    check_cancel(opts)?;

    let mut arena_flags = ArenaFlags::empty();
    if opts.config.arena.guard_pages {
        arena_flags |= ArenaFlags::GUARD_PAGES;
    }
    let lexeme_arena = Arena::create(
        opts.config.arena.size.max(ttlc_arena::MIN_ARENA_SIZE),
        arena_flags,
    )?;
    let mut interner = Interner::with_arena(lexeme_arena);
    let vocab = Vocab::new(&mut interner)?;
    let mut graph = Graph::new();

    // Parse.
    let timer = PhaseTimer::start("parse");
    let parse_stats = Parser::new(
        src,
        &mut interner,
        &mut graph,
        &vocab,
        ParserOptions {
            strict: opts.strict,
        },
    )
    .parse()?;
    metrics.record(timer.stop(cpt, parse_stats.triples as u64));
    debug!(
        triples = parse_stats.triples,
        errors = parse_stats.errors,
        "parse complete"
    );
    if let Some(semantic) = parse_stats.first_semantic_error.clone() {
        // Semantic errors block output even in permissive mode.
        return Err(CompileError::Parse(semantic));
    }

    check_cancel(opts)?;
    graph.freeze();

    // OWL closure.
    let timer = PhaseTimer::start("closure");
    let closure = ClosureBuilder::build(&graph, &vocab)?;
    metrics.record(timer.stop(cpt, closure.class_count() as u64));
    debug!(
        classes = closure.class_count(),
        properties = closure.property_count(),
        "closure complete"
    );

    let contradictions: Vec<String> = closure
        .contradictions()
        .iter()
        .map(|c| match c.subject {
            Some(s) => format!(
                "{} is an instance of disjoint classes {} and {}",
                interner.str_of(s),
                interner.str_of(c.a),
                interner.str_of(c.b)
            ),
            None => format!(
                "classes {} and {} are both disjoint and ordered by subclass",
                interner.str_of(c.a),
                interner.str_of(c.b)
            ),
        })
        .collect();
    if opts.strict {
        if let Some(c) = closure.contradictions().first() {
            return Err(CompileError::Disjoint {
                subject: c.subject.map(|s| interner.str_of(s).to_string()),
                a: interner.str_of(c.a).to_string(),
                b: interner.str_of(c.b).to_string(),
            });
        }
    }

    check_cancel(opts)?;

    // SHACL validation.
    let mut report: Option<ValidationReport> = None;
    if opts.validate {
        let timer = PhaseTimer::start("validate");
        let shapes = ShapeSet::compile(&graph, &vocab, &interner)?;
        let validation = Validator::new(
            &graph,
            &interner,
            &vocab,
            &closure,
            &shapes,
            ValidatorOptions {
                strict: opts.strict,
            },
        )
        .validate();
        metrics.record(timer.stop(cpt, shapes.len() as u64));
        debug!(
            shapes = shapes.len(),
            violations = validation.violation_count(),
            "validation complete"
        );
        if opts.strict && validation.violation_count() > 0 {
            return Err(CompileError::ValidationFailed {
                violations: validation.violation_count(),
            });
        }
        report = Some(validation);
    }

    check_cancel(opts)?;

    // Materialize.
    let timer = PhaseTimer::start("materialize");
    let image = serialize(&graph, &interner)?;
    metrics.record(timer.stop(cpt, image.len() as u64));
    debug!(bytes = image.len(), "materialization complete");

    let stats = CompileStats {
        triples: graph.len(),
        nodes: interner.len(),
        prefixes: graph.prefixes().len(),
        parse_errors: parse_stats.errors,
        image_bytes: image.len(),
        conforms: report.as_ref().map(|r| r.conforms()),
        contradictions,
        metrics,
    };
    Ok(CompileOutcome {
        image,
        report: report.map(|r| r.resolve(&interner)),
        stats,
    })
}

/// Compile one file to `output`.
///
/// The input is read with a single read; the image goes to a
/// temporary file in the output directory and is renamed into place
/// only after the write succeeds, so no partial output survives a
/// failure.
pub fn compile_file(
    input: &Path,
    output: &Path,
    opts: &CompileOptions,
) -> Result<CompileOutcome, CompileError> {
    if !input.exists() {
        return Err(CompileError::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    let bytes = std::fs::read(input).map_err(|e| CompileError::Read {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;
    let src = String::from_utf8(bytes).map_err(|_| CompileError::InvalidUtf8 {
        path: input.to_path_buf(),
    })?;

    let outcome = compile_str(&src, opts)?;

    let tmp = temp_path(output);
    if let Err(e) = write_file(&tmp, &outcome.image) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&tmp, output) {
        let _ = std::fs::remove_file(&tmp);
        return Err(CompileError::Plan(e.into()));
    }
    Ok(outcome)
}

/// One file per worker; arenas are never shared across workers.
pub fn compile_many(
    jobs: &[(PathBuf, PathBuf)],
    opts: &CompileOptions,
) -> Vec<(PathBuf, Result<CompileOutcome, CompileError>)> {
    jobs.par_iter()
        .map(|(input, output)| (input.clone(), compile_file(input, output, opts)))
        .collect()
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    output.with_file_name(name)
}

fn check_cancel(opts: &CompileOptions) -> Result<(), CompileError> {
    if let Some(flag) = &opts.cancel {
        if flag.load(Ordering::Relaxed) {
            return Err(CompileError::Cancelled);
        }
    }
    Ok(())
}
