// rust/ttlc-shacl/src/shapes.rs
// Shape records compiled from the sh: vocabulary in the graph
// Patterns are compiled once here; validation never touches regex
// construction

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use ttlc_rdf::{Graph, Interner, NodeId, NodeKind, Vocab};

pub type ShapeId = u32;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaclError {
    #[error("shape {shape}: cannot compile sh:pattern {pattern:?}: {message}")]
    PatternCompile {
        shape: String,
        pattern: String,
        message: String,
    },
    #[error("shape {shape}: bad value {value:?} for {param}")]
    BadParameter {
        shape: String,
        param: &'static str,
        value: String,
    },
    #[error("shape {shape}: rdf list does not terminate")]
    ListCycle { shape: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Violation,
}

/// sh:nodeKind parameter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKindReq {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKindReq {
    pub fn matches(self, kind: NodeKind) -> bool {
        let is_iri = kind == NodeKind::Iri;
        let is_blank = kind == NodeKind::Blank;
        let is_literal = matches!(kind, NodeKind::Literal | NodeKind::TypedLiteral);
        match self {
            NodeKindReq::Iri => is_iri,
            NodeKindReq::BlankNode => is_blank,
            NodeKindReq::Literal => is_literal,
            NodeKindReq::BlankNodeOrIri => is_blank || is_iri,
            NodeKindReq::BlankNodeOrLiteral => is_blank || is_literal,
            NodeKindReq::IriOrLiteral => is_iri || is_literal,
        }
    }
}

/// One constraint parameter; the variant carries exactly its payload.
#[derive(Debug, Clone)]
pub enum Constraint {
    MinCount(u32),
    MaxCount(u32),
    Datatype(NodeId),
    NodeKind(NodeKindReq),
    Class(NodeId),
    Pattern { regex: Regex, source: String },
    MinInclusive(f64),
    MaxInclusive(f64),
    In(Vec<NodeId>),
    HasValue(NodeId),
    And(Vec<ShapeId>),
    Or(Vec<ShapeId>),
    Not(ShapeId),
    Xone(Vec<ShapeId>),
    Node(ShapeId),
}

impl Constraint {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constraint::MinCount(_) => "minCount",
            Constraint::MaxCount(_) => "maxCount",
            Constraint::Datatype(_) => "datatype",
            Constraint::NodeKind(_) => "nodeKind",
            Constraint::Class(_) => "class",
            Constraint::Pattern { .. } => "pattern",
            Constraint::MinInclusive(_) => "minInclusive",
            Constraint::MaxInclusive(_) => "maxInclusive",
            Constraint::In(_) => "in",
            Constraint::HasValue(_) => "hasValue",
            Constraint::And(_) => "and",
            Constraint::Or(_) => "or",
            Constraint::Not(_) => "not",
            Constraint::Xone(_) => "xone",
            Constraint::Node(_) => "node",
        }
    }
}

/// Focus node selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    Class(NodeId),
    SubjectsOf(NodeId),
    ObjectsOf(NodeId),
    /// The shape IRI doubles as a class
    Implicit(NodeId),
}

#[derive(Debug, Clone)]
pub struct PropertyShape {
    pub path: NodeId,
    pub constraints: Vec<Constraint>,
    pub message: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub id: NodeId,
    pub targets: Vec<Target>,
    pub node_constraints: Vec<Constraint>,
    pub properties: Vec<PropertyShape>,
    pub severity: Severity,
    pub deactivated: bool,
    pub message: Option<NodeId>,
}

/// All shapes of a document, frozen before validation. Nested shape
/// references are resolved to dense ShapeIds.
#[derive(Debug)]
pub struct ShapeSet {
    shapes: Vec<Shape>,
    by_iri: FxHashMap<NodeId, ShapeId>,
}

impl ShapeSet {
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn get(&self, id: ShapeId) -> &Shape {
        &self.shapes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Compile every shape reachable from the graph's sh: vocabulary.
    pub fn compile(
        graph: &Graph,
        vocab: &Vocab,
        interner: &Interner,
    ) -> Result<ShapeSet, ShaclError> {
        Compiler {
            graph,
            vocab,
            interner,
        }
        .run()
    }
}

struct Compiler<'a> {
    graph: &'a Graph,
    vocab: &'a Vocab,
    interner: &'a Interner,
}

impl<'a> Compiler<'a> {
    fn run(self) -> Result<ShapeSet, ShaclError> {
        let v = self.vocab;

        // Roots: explicitly typed node shapes plus anything carrying a
        // target or property declaration.
        let mut roots: Vec<NodeId> = Vec::new();
        let mut seen: FxHashMap<NodeId, ()> = FxHashMap::default();
        let add = |roots: &mut Vec<NodeId>, seen: &mut FxHashMap<NodeId, ()>, id: NodeId| {
            if seen.insert(id, ()).is_none() {
                roots.push(id);
            }
        };
        for t in self.graph.triples() {
            if t.p == v.rdf_type && t.o == v.sh_node_shape {
                add(&mut roots, &mut seen, t.s);
            } else if t.p == v.sh_target_node
                || t.p == v.sh_target_class
                || t.p == v.sh_target_subjects_of
                || t.p == v.sh_target_objects_of
                || t.p == v.sh_property
            {
                add(&mut roots, &mut seen, t.s);
            }
        }

        // Follow nested shape references until the worklist drains.
        let mut i = 0;
        while i < roots.len() {
            let shape_node = roots[i];
            i += 1;
            for t in self.graph.with_subject(shape_node) {
                if t.p == v.sh_not || t.p == v.sh_node {
                    add(&mut roots, &mut seen, t.o);
                } else if t.p == v.sh_and || t.p == v.sh_or || t.p == v.sh_xone {
                    for member in self.read_list(t.o, shape_node)? {
                        add(&mut roots, &mut seen, member);
                    }
                } else if t.p == v.sh_property {
                    // Property shapes may nest sh:node references.
                    for pt in self.graph.with_subject(t.o) {
                        if pt.p == v.sh_node || pt.p == v.sh_not {
                            add(&mut roots, &mut seen, pt.o);
                        }
                    }
                }
            }
        }

        let mut by_iri: FxHashMap<NodeId, ShapeId> = FxHashMap::default();
        for (idx, &id) in roots.iter().enumerate() {
            by_iri.insert(id, idx as ShapeId);
        }

        let mut shapes = Vec::with_capacity(roots.len());
        for &root in &roots {
            shapes.push(self.compile_shape(root, &by_iri)?);
        }

        Ok(ShapeSet { shapes, by_iri })
    }

    fn compile_shape(
        &self,
        node: NodeId,
        by_iri: &FxHashMap<NodeId, ShapeId>,
    ) -> Result<Shape, ShaclError> {
        let v = self.vocab;
        let mut shape = Shape {
            id: node,
            targets: Vec::new(),
            node_constraints: Vec::new(),
            properties: Vec::new(),
            severity: Severity::Violation,
            deactivated: false,
            message: None,
        };

        let mut is_class = false;
        for t in self.graph.with_subject(node) {
            if t.p == v.sh_target_node {
                shape.targets.push(Target::Node(t.o));
            } else if t.p == v.sh_target_class {
                shape.targets.push(Target::Class(t.o));
            } else if t.p == v.sh_target_subjects_of {
                shape.targets.push(Target::SubjectsOf(t.o));
            } else if t.p == v.sh_target_objects_of {
                shape.targets.push(Target::ObjectsOf(t.o));
            } else if t.p == v.sh_property {
                shape.properties.push(self.compile_property(t.o, by_iri)?);
            } else if t.p == v.sh_severity {
                shape.severity = self.severity_of(t.o);
            } else if t.p == v.sh_message {
                shape.message = Some(t.o);
            } else if t.p == v.sh_deactivated {
                shape.deactivated = self.interner.str_of(t.o) == "true";
            } else if t.p == v.rdf_type && t.o == v.owl_class {
                is_class = true;
            } else if let Some(c) = self.compile_param(node, t.p, t.o, by_iri)? {
                shape.node_constraints.push(c);
            }
        }
        if is_class {
            shape.targets.push(Target::Implicit(node));
        }
        Ok(shape)
    }

    fn compile_property(
        &self,
        node: NodeId,
        by_iri: &FxHashMap<NodeId, ShapeId>,
    ) -> Result<PropertyShape, ShaclError> {
        let v = self.vocab;
        let mut path = NodeId::INVALID;
        let mut constraints = Vec::new();
        let mut message = None;

        for t in self.graph.with_subject(node) {
            if t.p == v.sh_path {
                path = t.o;
            } else if t.p == v.sh_message {
                message = Some(t.o);
            } else if let Some(c) = self.compile_param(node, t.p, t.o, by_iri)? {
                constraints.push(c);
            }
        }
        if !path.is_valid() {
            return Err(ShaclError::BadParameter {
                shape: self.name(node),
                param: "sh:path",
                value: "(missing)".to_string(),
            });
        }
        Ok(PropertyShape {
            path,
            constraints,
            message,
        })
    }

    /// Decode one constraint parameter, or None when the predicate is
    /// not part of the constraint vocabulary.
    fn compile_param(
        &self,
        shape: NodeId,
        p: NodeId,
        o: NodeId,
        by_iri: &FxHashMap<NodeId, ShapeId>,
    ) -> Result<Option<Constraint>, ShaclError> {
        let v = self.vocab;
        let c = if p == v.sh_min_count {
            Constraint::MinCount(self.u32_param(shape, "sh:minCount", o)?)
        } else if p == v.sh_max_count {
            Constraint::MaxCount(self.u32_param(shape, "sh:maxCount", o)?)
        } else if p == v.sh_datatype {
            Constraint::Datatype(o)
        } else if p == v.sh_node_kind {
            Constraint::NodeKind(self.node_kind_param(shape, o)?)
        } else if p == v.sh_class {
            Constraint::Class(o)
        } else if p == v.sh_pattern {
            let source = self.interner.str_of(o).to_string();
            let regex = Regex::new(&source).map_err(|e| ShaclError::PatternCompile {
                shape: self.name(shape),
                pattern: source.clone(),
                message: e.to_string(),
            })?;
            Constraint::Pattern { regex, source }
        } else if p == v.sh_min_inclusive {
            Constraint::MinInclusive(self.f64_param(shape, "sh:minInclusive", o)?)
        } else if p == v.sh_max_inclusive {
            Constraint::MaxInclusive(self.f64_param(shape, "sh:maxInclusive", o)?)
        } else if p == v.sh_in {
            let mut members = self.read_list(o, shape)?;
            members.sort_unstable();
            Constraint::In(members)
        } else if p == v.sh_has_value {
            Constraint::HasValue(o)
        } else if p == v.sh_and {
            Constraint::And(self.shape_refs(self.read_list(o, shape)?, by_iri))
        } else if p == v.sh_or {
            Constraint::Or(self.shape_refs(self.read_list(o, shape)?, by_iri))
        } else if p == v.sh_xone {
            Constraint::Xone(self.shape_refs(self.read_list(o, shape)?, by_iri))
        } else if p == v.sh_not {
            match by_iri.get(&o) {
                Some(&id) => Constraint::Not(id),
                None => return Ok(None),
            }
        } else if p == v.sh_node {
            match by_iri.get(&o) {
                Some(&id) => Constraint::Node(id),
                None => return Ok(None),
            }
        } else {
            return Ok(None);
        };
        Ok(Some(c))
    }

    fn shape_refs(&self, nodes: Vec<NodeId>, by_iri: &FxHashMap<NodeId, ShapeId>) -> Vec<ShapeId> {
        nodes
            .into_iter()
            .filter_map(|n| by_iri.get(&n).copied())
            .collect()
    }

    fn severity_of(&self, o: NodeId) -> Severity {
        let v = self.vocab;
        if o == v.sh_warning {
            Severity::Warning
        } else if o == v.sh_info {
            Severity::Info
        } else {
            Severity::Violation
        }
    }

    fn node_kind_param(&self, shape: NodeId, o: NodeId) -> Result<NodeKindReq, ShaclError> {
        let v = self.vocab;
        let req = if o == v.sh_kind_iri {
            NodeKindReq::Iri
        } else if o == v.sh_kind_blank {
            NodeKindReq::BlankNode
        } else if o == v.sh_kind_literal {
            NodeKindReq::Literal
        } else if o == v.sh_kind_blank_or_iri {
            NodeKindReq::BlankNodeOrIri
        } else if o == v.sh_kind_blank_or_literal {
            NodeKindReq::BlankNodeOrLiteral
        } else if o == v.sh_kind_iri_or_literal {
            NodeKindReq::IriOrLiteral
        } else {
            return Err(ShaclError::BadParameter {
                shape: self.name(shape),
                param: "sh:nodeKind",
                value: self.name(o),
            });
        };
        Ok(req)
    }

    fn u32_param(&self, shape: NodeId, param: &'static str, o: NodeId) -> Result<u32, ShaclError> {
        self.interner
            .str_of(o)
            .parse()
            .map_err(|_| ShaclError::BadParameter {
                shape: self.name(shape),
                param,
                value: self.interner.str_of(o).to_string(),
            })
    }

    fn f64_param(&self, shape: NodeId, param: &'static str, o: NodeId) -> Result<f64, ShaclError> {
        self.interner
            .str_of(o)
            .parse()
            .map_err(|_| ShaclError::BadParameter {
                shape: self.name(shape),
                param,
                value: self.interner.str_of(o).to_string(),
            })
    }

    /// Follow an rdf:first/rdf:rest chain. Step count is bounded by
    /// the graph size so a malformed cycle cannot hang the compiler.
    fn read_list(&self, head: NodeId, shape: NodeId) -> Result<Vec<NodeId>, ShaclError> {
        let v = self.vocab;
        let mut out = Vec::new();
        let mut cursor = head;
        let mut steps = 0usize;
        while cursor != v.rdf_nil {
            steps += 1;
            if steps > self.graph.len() + 1 {
                return Err(ShaclError::ListCycle {
                    shape: self.name(shape),
                });
            }
            let mut first = None;
            let mut rest = None;
            for t in self.graph.with_subject(cursor) {
                if t.p == v.rdf_first {
                    first = Some(t.o);
                } else if t.p == v.rdf_rest {
                    rest = Some(t.o);
                }
            }
            match (first, rest) {
                (Some(f), Some(r)) => {
                    out.push(f);
                    cursor = r;
                }
                _ => break,
            }
        }
        Ok(out)
    }

    fn name(&self, id: NodeId) -> String {
        if self.interner.contains(id) {
            self.interner.str_of(id).to_string()
        } else {
            format!("node#{}", id.to_bits())
        }
    }
}

impl ShapeSet {
    pub fn id_of(&self, iri: NodeId) -> Option<ShapeId> {
        self.by_iri.get(&iri).copied()
    }
}
