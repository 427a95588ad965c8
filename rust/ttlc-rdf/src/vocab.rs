// rust/ttlc-rdf/src/vocab.rs
// Well-known RDF/RDFS/OWL/SHACL/XSD terms, interned once per pipeline

use crate::id::{NodeId, NodeKind, ObjectKind};
use crate::intern::{InternError, Interner};

pub mod iri {
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
    pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
    pub const OWL_DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
    pub const OWL_INVERSE_OF: &str = "http://www.w3.org/2002/07/owl#inverseOf";
    pub const OWL_TRANSITIVE: &str = "http://www.w3.org/2002/07/owl#TransitiveProperty";
    pub const OWL_SYMMETRIC: &str = "http://www.w3.org/2002/07/owl#SymmetricProperty";
    pub const OWL_FUNCTIONAL: &str = "http://www.w3.org/2002/07/owl#FunctionalProperty";
    pub const OWL_INVERSE_FUNCTIONAL: &str =
        "http://www.w3.org/2002/07/owl#InverseFunctionalProperty";

    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    pub const SH_NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
    pub const SH_PROPERTY_SHAPE: &str = "http://www.w3.org/ns/shacl#PropertyShape";
    pub const SH_TARGET_NODE: &str = "http://www.w3.org/ns/shacl#targetNode";
    pub const SH_TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
    pub const SH_TARGET_SUBJECTS_OF: &str = "http://www.w3.org/ns/shacl#targetSubjectsOf";
    pub const SH_TARGET_OBJECTS_OF: &str = "http://www.w3.org/ns/shacl#targetObjectsOf";
    pub const SH_PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const SH_PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const SH_MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const SH_MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const SH_DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const SH_NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
    pub const SH_CLASS: &str = "http://www.w3.org/ns/shacl#class";
    pub const SH_PATTERN: &str = "http://www.w3.org/ns/shacl#pattern";
    pub const SH_MIN_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#minInclusive";
    pub const SH_MAX_INCLUSIVE: &str = "http://www.w3.org/ns/shacl#maxInclusive";
    pub const SH_IN: &str = "http://www.w3.org/ns/shacl#in";
    pub const SH_HAS_VALUE: &str = "http://www.w3.org/ns/shacl#hasValue";
    pub const SH_AND: &str = "http://www.w3.org/ns/shacl#and";
    pub const SH_OR: &str = "http://www.w3.org/ns/shacl#or";
    pub const SH_NOT: &str = "http://www.w3.org/ns/shacl#not";
    pub const SH_XONE: &str = "http://www.w3.org/ns/shacl#xone";
    pub const SH_NODE: &str = "http://www.w3.org/ns/shacl#node";
    pub const SH_SEVERITY: &str = "http://www.w3.org/ns/shacl#severity";
    pub const SH_MESSAGE: &str = "http://www.w3.org/ns/shacl#message";
    pub const SH_DEACTIVATED: &str = "http://www.w3.org/ns/shacl#deactivated";
    pub const SH_VIOLATION: &str = "http://www.w3.org/ns/shacl#Violation";
    pub const SH_WARNING: &str = "http://www.w3.org/ns/shacl#Warning";
    pub const SH_INFO: &str = "http://www.w3.org/ns/shacl#Info";
    pub const SH_KIND_IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const SH_KIND_BLANK: &str = "http://www.w3.org/ns/shacl#BlankNode";
    pub const SH_KIND_LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
    pub const SH_KIND_BLANK_OR_IRI: &str = "http://www.w3.org/ns/shacl#BlankNodeOrIRI";
    pub const SH_KIND_BLANK_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#BlankNodeOrLiteral";
    pub const SH_KIND_IRI_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#IRIOrLiteral";
}

/// Pre-interned vocabulary handles shared by the parser, closure
/// engine, and validator.
#[derive(Debug, Clone)]
pub struct Vocab {
    pub rdf_type: NodeId,
    pub rdf_first: NodeId,
    pub rdf_rest: NodeId,
    pub rdf_nil: NodeId,
    pub rdf_lang_string: NodeId,

    pub rdfs_sub_class_of: NodeId,
    pub rdfs_sub_property_of: NodeId,
    pub rdfs_domain: NodeId,
    pub rdfs_range: NodeId,

    pub owl_class: NodeId,
    pub owl_equivalent_class: NodeId,
    pub owl_disjoint_with: NodeId,
    pub owl_inverse_of: NodeId,
    pub owl_transitive: NodeId,
    pub owl_symmetric: NodeId,
    pub owl_functional: NodeId,
    pub owl_inverse_functional: NodeId,

    pub xsd_string: NodeId,
    pub xsd_integer: NodeId,
    pub xsd_decimal: NodeId,
    pub xsd_double: NodeId,
    pub xsd_boolean: NodeId,
    pub xsd_date_time: NodeId,

    pub sh_node_shape: NodeId,
    pub sh_property_shape: NodeId,
    pub sh_target_node: NodeId,
    pub sh_target_class: NodeId,
    pub sh_target_subjects_of: NodeId,
    pub sh_target_objects_of: NodeId,
    pub sh_property: NodeId,
    pub sh_path: NodeId,
    pub sh_min_count: NodeId,
    pub sh_max_count: NodeId,
    pub sh_datatype: NodeId,
    pub sh_node_kind: NodeId,
    pub sh_class: NodeId,
    pub sh_pattern: NodeId,
    pub sh_min_inclusive: NodeId,
    pub sh_max_inclusive: NodeId,
    pub sh_in: NodeId,
    pub sh_has_value: NodeId,
    pub sh_and: NodeId,
    pub sh_or: NodeId,
    pub sh_not: NodeId,
    pub sh_xone: NodeId,
    pub sh_node: NodeId,
    pub sh_severity: NodeId,
    pub sh_message: NodeId,
    pub sh_deactivated: NodeId,
    pub sh_violation: NodeId,
    pub sh_warning: NodeId,
    pub sh_info: NodeId,
    pub sh_kind_iri: NodeId,
    pub sh_kind_blank: NodeId,
    pub sh_kind_literal: NodeId,
    pub sh_kind_blank_or_iri: NodeId,
    pub sh_kind_blank_or_literal: NodeId,
    pub sh_kind_iri_or_literal: NodeId,
}

impl Vocab {
    pub fn new(interner: &mut Interner) -> Result<Vocab, InternError> {
        let mut i = |s: &str| interner.intern(NodeKind::Iri, s);
        Ok(Vocab {
            rdf_type: i(iri::RDF_TYPE)?,
            rdf_first: i(iri::RDF_FIRST)?,
            rdf_rest: i(iri::RDF_REST)?,
            rdf_nil: i(iri::RDF_NIL)?,
            rdf_lang_string: i(iri::RDF_LANG_STRING)?,
            rdfs_sub_class_of: i(iri::RDFS_SUB_CLASS_OF)?,
            rdfs_sub_property_of: i(iri::RDFS_SUB_PROPERTY_OF)?,
            rdfs_domain: i(iri::RDFS_DOMAIN)?,
            rdfs_range: i(iri::RDFS_RANGE)?,
            owl_class: i(iri::OWL_CLASS)?,
            owl_equivalent_class: i(iri::OWL_EQUIVALENT_CLASS)?,
            owl_disjoint_with: i(iri::OWL_DISJOINT_WITH)?,
            owl_inverse_of: i(iri::OWL_INVERSE_OF)?,
            owl_transitive: i(iri::OWL_TRANSITIVE)?,
            owl_symmetric: i(iri::OWL_SYMMETRIC)?,
            owl_functional: i(iri::OWL_FUNCTIONAL)?,
            owl_inverse_functional: i(iri::OWL_INVERSE_FUNCTIONAL)?,
            xsd_string: i(iri::XSD_STRING)?,
            xsd_integer: i(iri::XSD_INTEGER)?,
            xsd_decimal: i(iri::XSD_DECIMAL)?,
            xsd_double: i(iri::XSD_DOUBLE)?,
            xsd_boolean: i(iri::XSD_BOOLEAN)?,
            xsd_date_time: i(iri::XSD_DATE_TIME)?,
            sh_node_shape: i(iri::SH_NODE_SHAPE)?,
            sh_property_shape: i(iri::SH_PROPERTY_SHAPE)?,
            sh_target_node: i(iri::SH_TARGET_NODE)?,
            sh_target_class: i(iri::SH_TARGET_CLASS)?,
            sh_target_subjects_of: i(iri::SH_TARGET_SUBJECTS_OF)?,
            sh_target_objects_of: i(iri::SH_TARGET_OBJECTS_OF)?,
            sh_property: i(iri::SH_PROPERTY)?,
            sh_path: i(iri::SH_PATH)?,
            sh_min_count: i(iri::SH_MIN_COUNT)?,
            sh_max_count: i(iri::SH_MAX_COUNT)?,
            sh_datatype: i(iri::SH_DATATYPE)?,
            sh_node_kind: i(iri::SH_NODE_KIND)?,
            sh_class: i(iri::SH_CLASS)?,
            sh_pattern: i(iri::SH_PATTERN)?,
            sh_min_inclusive: i(iri::SH_MIN_INCLUSIVE)?,
            sh_max_inclusive: i(iri::SH_MAX_INCLUSIVE)?,
            sh_in: i(iri::SH_IN)?,
            sh_has_value: i(iri::SH_HAS_VALUE)?,
            sh_and: i(iri::SH_AND)?,
            sh_or: i(iri::SH_OR)?,
            sh_not: i(iri::SH_NOT)?,
            sh_xone: i(iri::SH_XONE)?,
            sh_node: i(iri::SH_NODE)?,
            sh_severity: i(iri::SH_SEVERITY)?,
            sh_message: i(iri::SH_MESSAGE)?,
            sh_deactivated: i(iri::SH_DEACTIVATED)?,
            sh_violation: i(iri::SH_VIOLATION)?,
            sh_warning: i(iri::SH_WARNING)?,
            sh_info: i(iri::SH_INFO)?,
            sh_kind_iri: i(iri::SH_KIND_IRI)?,
            sh_kind_blank: i(iri::SH_KIND_BLANK)?,
            sh_kind_literal: i(iri::SH_KIND_LITERAL)?,
            sh_kind_blank_or_iri: i(iri::SH_KIND_BLANK_OR_IRI)?,
            sh_kind_blank_or_literal: i(iri::SH_KIND_BLANK_OR_LITERAL)?,
            sh_kind_iri_or_literal: i(iri::SH_KIND_IRI_OR_LITERAL)?,
        })
    }

    /// Object tag for a literal with explicit datatype `dt`.
    pub fn object_kind_for_datatype(&self, dt: NodeId) -> ObjectKind {
        if dt == self.xsd_integer {
            ObjectKind::Integer
        } else if dt == self.xsd_decimal {
            ObjectKind::Decimal
        } else if dt == self.xsd_double {
            ObjectKind::Double
        } else if dt == self.xsd_boolean {
            ObjectKind::Boolean
        } else {
            ObjectKind::Typed
        }
    }

    /// Datatype node implied by an object tag, for literals whose tag
    /// already fixes it.
    pub fn datatype_for_object_kind(&self, kind: ObjectKind) -> Option<NodeId> {
        match kind {
            ObjectKind::Integer => Some(self.xsd_integer),
            ObjectKind::Decimal => Some(self.xsd_decimal),
            ObjectKind::Double => Some(self.xsd_double),
            ObjectKind::Boolean => Some(self.xsd_boolean),
            ObjectKind::Plain => Some(self.xsd_string),
            ObjectKind::Lang => Some(self.rdf_lang_string),
            _ => None,
        }
    }
}
