// rust/ttlc-shacl/src/validator.rs
// Constraint evaluation: one pass over shapes, one pass over focus
// nodes per shape, one (s,p) index scan per property shape

use std::cell::Cell;

use rustc_hash::FxHashSet;
use ttlc_owl::Closure;
use ttlc_rdf::{Graph, Interner, NodeId, NodeKind, Vocab};

use crate::report::{ReportEntry, RuntimeErrorEntry, ValidationReport};
use crate::shapes::{Constraint, PropertyShape, Shape, ShapeId, ShapeSet, Target};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorOptions {
    /// Abort at the first Violation-severity result.
    pub strict: bool,
}

/// Cyclic sh:node / sh:not chains bottom out here instead of
/// recursing forever; conformance at the cutoff is assumed.
const MAX_SHAPE_RECURSION: u32 = 32;

pub struct Validator<'a> {
    graph: &'a Graph,
    interner: &'a Interner,
    vocab: &'a Vocab,
    closure: &'a Closure,
    shapes: &'a ShapeSet,
    opts: ValidatorOptions,
    depth: Cell<u32>,
}

impl<'a> Validator<'a> {
    pub fn new(
        graph: &'a Graph,
        interner: &'a Interner,
        vocab: &'a Vocab,
        closure: &'a Closure,
        shapes: &'a ShapeSet,
        opts: ValidatorOptions,
    ) -> Validator<'a> {
        Validator {
            graph,
            interner,
            vocab,
            closure,
            shapes,
            opts,
            depth: Cell::new(0),
        }
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        'shapes: for shape in self.shapes.shapes() {
            if shape.deactivated || shape.targets.is_empty() {
                continue;
            }
            for focus in self.focus_nodes(shape) {
                self.check_focus(focus, shape, &mut report);
                if self.opts.strict && report.violation_count() > 0 {
                    break 'shapes;
                }
            }
        }
        report
    }

    /// Union of the shape's target selectors, first-seen order.
    fn focus_nodes(&self, shape: &Shape) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut push = |id: NodeId, out: &mut Vec<NodeId>| {
            if seen.insert(id) {
                out.push(id);
            }
        };
        for target in &shape.targets {
            match *target {
                Target::Node(n) => push(n, &mut out),
                Target::Class(c) | Target::Implicit(c) => {
                    for t in self.graph.with_predicate(self.vocab.rdf_type) {
                        if self.closure.is_subclass(t.o, c) {
                            push(t.s, &mut out);
                        }
                    }
                }
                Target::SubjectsOf(p) => {
                    for t in self.graph.with_predicate(p) {
                        push(t.s, &mut out);
                    }
                }
                Target::ObjectsOf(p) => {
                    for t in self.graph.with_predicate(p) {
                        push(t.o, &mut out);
                    }
                }
            }
        }
        out
    }

    fn check_focus(&self, focus: NodeId, shape: &Shape, report: &mut ValidationReport) {
        for c in &shape.node_constraints {
            self.check_value(focus, focus, shape, None, c, shape.message, report);
        }
        for ps in &shape.properties {
            self.check_property(focus, shape, ps, report);
        }
    }

    fn check_property(
        &self,
        focus: NodeId,
        shape: &Shape,
        ps: &PropertyShape,
        report: &mut ValidationReport,
    ) {
        // One scan of the (s,p) index yields the value set.
        let values: Vec<NodeId> = self.graph.objects(focus, ps.path).map(|t| t.o).collect();
        let message = ps.message.or(shape.message);

        for c in &ps.constraints {
            match c {
                Constraint::MinCount(n) => {
                    if (values.len() as u32) < *n {
                        self.record(focus, shape, Some(ps.path), c, message, report);
                    }
                }
                Constraint::MaxCount(n) => {
                    if (values.len() as u32) > *n {
                        self.record(focus, shape, Some(ps.path), c, message, report);
                    }
                }
                Constraint::HasValue(v) => {
                    if !values.contains(v) {
                        self.record(focus, shape, Some(ps.path), c, message, report);
                    }
                }
                _ => {
                    for &value in &values {
                        self.check_value(focus, value, shape, Some(ps.path), c, message, report);
                    }
                }
            }
        }
    }

    /// Evaluate one value-level constraint; violations and runtime
    /// errors both land in the report, under distinct kinds.
    #[allow(clippy::too_many_arguments)]
    fn check_value(
        &self,
        focus: NodeId,
        value: NodeId,
        shape: &Shape,
        path: Option<NodeId>,
        c: &Constraint,
        message: Option<NodeId>,
        report: &mut ValidationReport,
    ) {
        let ok = match c {
            Constraint::Datatype(dt) => self.datatype_of(value) == Some(*dt),
            Constraint::NodeKind(req) => value
                .kind()
                .map(|k| req.matches(k))
                .unwrap_or(false),
            Constraint::Class(cls) => self.has_type(value, *cls),
            Constraint::Pattern { regex, .. } => match value.kind() {
                Some(NodeKind::Blank) | None => false,
                _ => regex.is_match(self.interner.str_of(value)),
            },
            Constraint::MinInclusive(bound) => {
                match self.numeric_value(value) {
                    Ok(Some(v)) => v >= *bound,
                    Ok(None) => false,
                    Err(detail) => {
                        report.errors.push(RuntimeErrorEntry {
                            focus,
                            shape: shape.id,
                            constraint: c.kind_name(),
                            detail,
                        });
                        return;
                    }
                }
            }
            Constraint::MaxInclusive(bound) => {
                match self.numeric_value(value) {
                    Ok(Some(v)) => v <= *bound,
                    Ok(None) => false,
                    Err(detail) => {
                        report.errors.push(RuntimeErrorEntry {
                            focus,
                            shape: shape.id,
                            constraint: c.kind_name(),
                            detail,
                        });
                        return;
                    }
                }
            }
            Constraint::In(members) => members.binary_search(&value).is_ok(),
            Constraint::HasValue(v) => value == *v,
            Constraint::And(ids) => ids.iter().all(|&s| self.conforms(value, s)),
            Constraint::Or(ids) => ids.iter().any(|&s| self.conforms(value, s)),
            Constraint::Not(id) => !self.conforms(value, *id),
            Constraint::Xone(ids) => {
                ids.iter().filter(|&&s| self.conforms(value, s)).count() == 1
            }
            Constraint::Node(id) => self.conforms(value, *id),
            // Set-level constraints are handled by the caller.
            Constraint::MinCount(_) | Constraint::MaxCount(_) => true,
        };
        if !ok {
            self.record(focus, shape, path, c, message, report);
        }
    }

    /// Does `node` conform to shape `sid`? Used by the compositional
    /// constraints; nothing is recorded.
    fn conforms(&self, node: NodeId, sid: ShapeId) -> bool {
        if self.depth.get() >= MAX_SHAPE_RECURSION {
            return true;
        }
        self.depth.set(self.depth.get() + 1);
        let result = self.conforms_inner(node, sid);
        self.depth.set(self.depth.get() - 1);
        result
    }

    fn conforms_inner(&self, node: NodeId, sid: ShapeId) -> bool {
        let shape = self.shapes.get(sid);
        let mut scratch = ValidationReport::default();
        for c in &shape.node_constraints {
            self.check_value(node, node, shape, None, c, None, &mut scratch);
            if !scratch.entries.is_empty() || !scratch.errors.is_empty() {
                return false;
            }
        }
        for ps in &shape.properties {
            self.check_property(node, shape, ps, &mut scratch);
            if !scratch.entries.is_empty() || !scratch.errors.is_empty() {
                return false;
            }
        }
        true
    }

    fn record(
        &self,
        focus: NodeId,
        shape: &Shape,
        path: Option<NodeId>,
        c: &Constraint,
        message: Option<NodeId>,
        report: &mut ValidationReport,
    ) {
        report.entries.push(ReportEntry {
            focus,
            shape: shape.id,
            path,
            constraint: c.kind_name(),
            severity: shape.severity,
            message,
        });
    }

    /// The effective datatype of a literal value, if any.
    fn datatype_of(&self, value: NodeId) -> Option<NodeId> {
        match value.kind()? {
            NodeKind::TypedLiteral => Some(self.interner.aux_of(value)),
            NodeKind::Literal => {
                let aux = self.interner.aux_of(value);
                if aux.is_valid() {
                    Some(self.vocab.rdf_lang_string)
                } else {
                    Some(self.vocab.xsd_string)
                }
            }
            _ => None,
        }
    }

    fn has_type(&self, value: NodeId, class: NodeId) -> bool {
        self.graph
            .objects(value, self.vocab.rdf_type)
            .any(|t| self.closure.is_subclass(t.o, class))
    }

    /// Numeric interpretation of a value. Ok(None): not a numeric
    /// literal (a plain violation). Err: numeric datatype whose
    /// lexical form does not parse (a runtime error).
    fn numeric_value(&self, value: NodeId) -> Result<Option<f64>, String> {
        if value.kind() != Some(NodeKind::TypedLiteral) {
            return Ok(None);
        }
        let dt = self.interner.aux_of(value);
        let numeric = dt == self.vocab.xsd_integer
            || dt == self.vocab.xsd_decimal
            || dt == self.vocab.xsd_double;
        if !numeric {
            return Ok(None);
        }
        let lexical = self.interner.str_of(value);
        lexical
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("cannot parse {lexical:?} as a number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Severity;
    use ttlc_owl::ClosureBuilder;
    use ttlc_rdf::{Interner, Parser, ParserOptions};

    const HEADER: &str = "@prefix ex: <http://e/> .\n\
        @prefix sh: <http://www.w3.org/ns/shacl#> .\n\
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .\n\
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
        @prefix owl: <http://www.w3.org/2002/07/owl#> .\n";

    struct World {
        interner: Interner,
        vocab: Vocab,
        graph: Graph,
        closure: Closure,
        shapes: ShapeSet,
    }

    fn world(src: &str) -> World {
        let mut interner = Interner::new().unwrap();
        let vocab = Vocab::new(&mut interner).unwrap();
        let mut graph = Graph::new();
        Parser::new(
            src,
            &mut interner,
            &mut graph,
            &vocab,
            ParserOptions { strict: true },
        )
        .parse()
        .expect("parse");
        graph.freeze();
        let closure = ClosureBuilder::build(&graph, &vocab).expect("closure");
        let shapes = ShapeSet::compile(&graph, &vocab, &interner).expect("shapes");
        World {
            interner,
            vocab,
            graph,
            closure,
            shapes,
        }
    }

    fn validate(w: &World) -> ValidationReport {
        Validator::new(
            &w.graph,
            &w.interner,
            &w.vocab,
            &w.closure,
            &w.shapes,
            ValidatorOptions::default(),
        )
        .validate()
    }

    fn iri(w: &World, s: &str) -> NodeId {
        w.interner
            .lookup(NodeKind::Iri, NodeId::INVALID, s)
            .expect("interned")
    }

    #[test]
    fn test_min_count_violation() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 2 ] .\n\
            ex:x ex:p ex:a ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "minCount");
        assert_eq!(r.entries[0].focus, iri(&w, "http://e/x"));
    }

    #[test]
    fn test_min_count_satisfied() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 2 ] .\n\
            ex:x ex:p ex:a , ex:b ."
        ));
        assert!(validate(&w).conforms());
    }

    #[test]
    fn test_max_count_violation() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:p ; sh:maxCount 1 ] .\n\
            ex:x ex:p ex:a , ex:b ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "maxCount");
        assert_eq!(r.entries[0].severity, Severity::Violation);
        assert_eq!(r.entries[0].path, Some(iri(&w, "http://e/p")));
    }

    #[test]
    fn test_datatype_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:age ; sh:datatype xsd:integer ] .\n\
            ex:x ex:age 41 ; ex:age \"old\" ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "datatype");
    }

    #[test]
    fn test_target_class_uses_subclass_closure() {
        let w = world(&format!(
            "{HEADER}\
            ex:A rdfs:subClassOf ex:B . ex:B rdfs:subClassOf ex:C .\n\
            ex:x a ex:A .\n\
            ex:Shape a sh:NodeShape ; sh:targetClass ex:C ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 1 ] ."
        ));
        let r = validate(&w);
        // ex:x is in scope through the closure and has no ex:p.
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].focus, iri(&w, "http://e/x"));
    }

    #[test]
    fn test_class_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:A rdfs:subClassOf ex:B .\n\
            ex:good a ex:A . ex:bad a ex:Other .\n\
            ex:x ex:friend ex:good , ex:bad .\n\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:friend ; sh:class ex:B ] ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
    }

    #[test]
    fn test_node_kind_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:p ; sh:nodeKind sh:IRI ] .\n\
            ex:x ex:p ex:ok ; ex:p \"str\" ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "nodeKind");
    }

    #[test]
    fn test_pattern_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:code ; sh:pattern \"^[A-Z]{{3}}$\" ] .\n\
            ex:x ex:code \"ABC\" ; ex:code \"nope\" ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "pattern");
    }

    #[test]
    fn test_bad_pattern_is_compile_error() {
        let mut interner = Interner::new().unwrap();
        let vocab = Vocab::new(&mut interner).unwrap();
        let mut graph = Graph::new();
        Parser::new(
            &format!(
                "{HEADER}ex:Shape a sh:NodeShape ; sh:property [ sh:path ex:p ; sh:pattern \"[\" ] ."
            ),
            &mut interner,
            &mut graph,
            &vocab,
            ParserOptions { strict: true },
        )
        .parse()
        .unwrap();
        graph.freeze();
        let err = ShapeSet::compile(&graph, &vocab, &interner).unwrap_err();
        assert!(matches!(err, crate::shapes::ShaclError::PatternCompile { .. }));
    }

    #[test]
    fn test_range_constraints() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:age ; sh:minInclusive 0 ; sh:maxInclusive 120 ] .\n\
            ex:x ex:age 200 ; ex:age 30 ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "maxInclusive");
    }

    #[test]
    fn test_in_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:state ; sh:in ( ex:on ex:off ) ] .\n\
            ex:x ex:state ex:on ; ex:state ex:broken ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "in");
    }

    #[test]
    fn test_has_value_constraint() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ;\n\
              sh:property [ sh:path ex:role ; sh:hasValue ex:admin ] .\n\
            ex:x ex:role ex:user ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].constraint, "hasValue");
    }

    #[test]
    fn test_not_composition() {
        let w = world(&format!(
            "{HEADER}\
            ex:Banned a sh:NodeShape ;\n\
              sh:property [ sh:path ex:flag ; sh:hasValue ex:bad ] .\n\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x , ex:y ;\n\
              sh:not ex:Banned .\n\
            ex:x ex:flag ex:bad .\n\
            ex:y ex:flag ex:fine ."
        ));
        let r = validate(&w);
        // ex:x conforms to Banned, so sh:not flags it; ex:y passes.
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].focus, iri(&w, "http://e/x"));
        assert_eq!(r.entries[0].constraint, "not");
    }

    #[test]
    fn test_or_composition() {
        let w = world(&format!(
            "{HEADER}\
            ex:HasName a sh:NodeShape ;\n\
              sh:property [ sh:path ex:name ; sh:minCount 1 ] .\n\
            ex:HasLabel a sh:NodeShape ;\n\
              sh:property [ sh:path ex:label ; sh:minCount 1 ] .\n\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:ok , ex:bad ;\n\
              sh:or ( ex:HasName ex:HasLabel ) .\n\
            ex:ok ex:label \"l\" .\n\
            ex:bad ex:other \"o\" ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].focus, iri(&w, "http://e/bad"));
    }

    #[test]
    fn test_severity_and_deactivation() {
        let w = world(&format!(
            "{HEADER}\
            ex:Warn a sh:NodeShape ; sh:targetNode ex:x ; sh:severity sh:Warning ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 1 ] .\n\
            ex:Off a sh:NodeShape ; sh:targetNode ex:x ; sh:deactivated true ;\n\
              sh:property [ sh:path ex:q ; sh:minCount 9 ] .\n\
            ex:x ex:z ex:z ."
        ));
        let r = validate(&w);
        assert_eq!(r.violation_count(), 0);
        assert_eq!(r.warning_count(), 1);
        assert!(!r.conforms());
    }

    #[test]
    fn test_strict_mode_stops_early() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x , ex:y ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 1 ] ."
        ));
        let r = Validator::new(
            &w.graph,
            &w.interner,
            &w.vocab,
            &w.closure,
            &w.shapes,
            ValidatorOptions { strict: true },
        )
        .validate();
        assert_eq!(r.violation_count(), 1);
    }

    #[test]
    fn test_target_subjects_and_objects_of() {
        let w = world(&format!(
            "{HEADER}\
            ex:S a sh:NodeShape ; sh:targetSubjectsOf ex:p ;\n\
              sh:property [ sh:path ex:name ; sh:minCount 1 ] .\n\
            ex:O a sh:NodeShape ; sh:targetObjectsOf ex:p ;\n\
              sh:property [ sh:path ex:name ; sh:minCount 1 ] .\n\
            ex:a ex:p ex:b .\n\
            ex:a ex:name \"a\" ."
        ));
        let r = validate(&w);
        // ex:b (object of ex:p) has no name; ex:a does.
        assert_eq!(r.violation_count(), 1);
        assert_eq!(r.entries[0].focus, iri(&w, "http://e/b"));
    }

    #[test]
    fn test_report_json_shape() {
        let w = world(&format!(
            "{HEADER}\
            ex:Shape a sh:NodeShape ; sh:targetNode ex:x ; sh:message \"needs p\" ;\n\
              sh:property [ sh:path ex:p ; sh:minCount 1 ] ."
        ));
        let r = validate(&w);
        let json = serde_json::to_value(r.resolve(&w.interner)).unwrap();
        assert_eq!(json["conforms"], false);
        assert_eq!(json["violations"], 1);
        assert_eq!(json["results"][0]["constraint"], "minCount");
        assert_eq!(json["results"][0]["message"], "needs p");
    }
}
