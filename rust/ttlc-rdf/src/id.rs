// rust/ttlc-rdf/src/id.rs
// Kind-tagged 32-bit node identifiers and the 16-byte triple record

use bitflags::bitflags;

/// Node kind, stored in bits 28..32 of a NodeId
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri = 1,
    Blank = 2,
    Literal = 3,
    TypedLiteral = 4,
}

impl NodeKind {
    #[inline]
    pub fn from_bits(bits: u32) -> Option<NodeKind> {
        match bits {
            1 => Some(NodeKind::Iri),
            2 => Some(NodeKind::Blank),
            3 => Some(NodeKind::Literal),
            4 => Some(NodeKind::TypedLiteral),
            _ => None,
        }
    }
}

/// Interned node handle. Zero is reserved for "invalid"; bits 28..32
/// carry the kind and the low 28 bits index the interner's lexeme
/// table.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

const KIND_SHIFT: u32 = 28;
const INDEX_MASK: u32 = (1 << KIND_SHIFT) - 1;

impl NodeId {
    pub const INVALID: NodeId = NodeId(0);
    /// Largest lexeme index addressable by a handle
    pub const MAX_INDEX: u32 = INDEX_MASK;

    #[inline]
    pub fn new(kind: NodeKind, index: u32) -> NodeId {
        debug_assert!(index <= INDEX_MASK);
        NodeId(((kind as u32) << KIND_SHIFT) | index)
    }

    #[inline]
    pub fn kind(self) -> Option<NodeKind> {
        NodeKind::from_bits(self.0 >> KIND_SHIFT)
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0 & INDEX_MASK
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub fn to_bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_bits(bits: u32) -> NodeId {
        NodeId(bits)
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(
            self.kind(),
            Some(NodeKind::Literal) | Some(NodeKind::TypedLiteral)
        )
    }
}

/// Object-kind tag carried on each triple. Well-known numeric
/// datatypes get their own tag so constraint checks are a single
/// byte compare.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Iri = 0,
    Blank = 1,
    Plain = 2,
    Lang = 3,
    Typed = 4,
    Integer = 5,
    Decimal = 6,
    Double = 7,
    Boolean = 8,
}

impl ObjectKind {
    #[inline]
    pub fn from_u8(v: u8) -> Option<ObjectKind> {
        match v {
            0 => Some(ObjectKind::Iri),
            1 => Some(ObjectKind::Blank),
            2 => Some(ObjectKind::Plain),
            3 => Some(ObjectKind::Lang),
            4 => Some(ObjectKind::Typed),
            5 => Some(ObjectKind::Integer),
            6 => Some(ObjectKind::Decimal),
            7 => Some(ObjectKind::Double),
            8 => Some(ObjectKind::Boolean),
            _ => None,
        }
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        !matches!(self, ObjectKind::Iri | ObjectKind::Blank)
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ObjectKind::Integer | ObjectKind::Decimal | ObjectKind::Double
        )
    }
}

bitflags! {
    /// Per-triple flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TripleFlags: u8 {
        /// Object literal carries a language tag
        const LANG_TAGGED = 1 << 0;
        /// Object literal carries an explicit datatype
        const HAS_DATATYPE = 1 << 1;
        /// Triple was inferred rather than asserted
        const INFERRED = 1 << 2;
    }
}

/// One statement: three handles plus the object tag and flags.
#[repr(C, align(8))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple {
    pub s: NodeId,
    pub p: NodeId,
    pub o: NodeId,
    pub kind: u8,
    pub flags: u8,
    pub reserved: u16,
}

const _: () = assert!(std::mem::size_of::<Triple>() == 16);
const _: () = assert!(std::mem::align_of::<Triple>() == 8);

impl Triple {
    #[inline]
    pub fn new(s: NodeId, p: NodeId, o: NodeId, kind: ObjectKind, flags: TripleFlags) -> Triple {
        Triple {
            s,
            p,
            o,
            kind: kind as u8,
            flags: flags.bits(),
            reserved: 0,
        }
    }

    #[inline]
    pub fn object_kind(&self) -> ObjectKind {
        ObjectKind::from_u8(self.kind).unwrap_or(ObjectKind::Iri)
    }

    #[inline]
    pub fn triple_flags(&self) -> TripleFlags {
        TripleFlags::from_bits_truncate(self.flags)
    }
}
