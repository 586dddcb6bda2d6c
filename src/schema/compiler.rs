//! Schema compiler.
//!
//! One depth-first pass over a [`SchemaNode`] tree that:
//! 1. flattens objects into an ordered field list plus a template value,
//! 2. resolves the tag width of every union and literal,
//! 3. collects packing statistics for the bit prefix.
//!
//! The "inside a Packed scope" and "below a runtime-sized construct" flags are
//! carried in a [`Scope`] passed by value, so leaving a node restores the
//! caller's flags without any shared mutable state.

use std::collections::HashSet;
use std::sync::Arc;

use super::{FloatWidth, IntWidth, SchemaNode};
use crate::error::{CodecError, Result};
use crate::leaf::{LeafCodec, LeafRegistry};
use crate::value::{Object, Scalar, Value};

/// Maximum nesting depth accepted by the compiler.
pub const MAX_SCHEMA_DEPTH: usize = 128;

/// Largest union/literal state count a 1-byte tag can address.
pub const MAX_U8_TAG_STATES: usize = 256;

/// Largest union/literal state count a 2-byte tag can address.
pub const MAX_U16_TAG_STATES: usize = 65_536;

/// Resolved encoding of a union or literal tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagWidth {
    /// Single-state literal, nothing written.
    None,
    /// 1-byte index.
    U8,
    /// 2-byte little-endian index.
    U16,
    /// One packed bit, set for the first of exactly two states.
    PackedBit,
}

impl TagWidth {
    /// Byte-sized tag able to index `states` entries.
    fn for_states(states: usize) -> Result<Self> {
        if states <= MAX_U8_TAG_STATES {
            Ok(TagWidth::U8)
        } else if states <= MAX_U16_TAG_STATES {
            Ok(TagWidth::U16)
        } else {
            Err(CodecError::Schema(format!(
                "{states} tag states exceed the 2-byte limit of {MAX_U16_TAG_STATES}"
            )))
        }
    }
}

/// Global packing statistics of a compiled schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackingInfo {
    /// The schema contains at least one Packed node.
    pub has_packing: bool,
    /// Some packed bits sit below a runtime-sized construct.
    pub has_variable_arity_packing: bool,
    /// Packed bits whose count is known from the schema alone.
    pub minimum_guaranteed_bits: usize,
}

impl PackingInfo {
    /// Size of the guaranteed prefix region.
    #[inline]
    pub fn minimum_guaranteed_bytes(&self) -> usize {
        self.minimum_guaranteed_bits.div_ceil(8)
    }

    fn add_packed_bit(&mut self, scope: Scope) {
        if !scope.packed {
            return;
        }
        if scope.size_unknown {
            self.has_variable_arity_packing = true;
        } else {
            self.minimum_guaranteed_bits += 1;
        }
    }
}

/// Flags inherited from enclosing nodes.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    packed: bool,
    size_unknown: bool,
}

impl Scope {
    fn packed(self) -> Self {
        Self {
            packed: true,
            ..self
        }
    }

    fn size_unknown(self) -> Self {
        Self {
            size_unknown: true,
            ..self
        }
    }
}

/// Flattened object layout.
#[derive(Debug)]
pub struct ObjectLayout {
    fields: Vec<(String, CompiledNode)>,
    template: Object,
}

impl ObjectLayout {
    /// Fields in declaration order.
    pub fn fields(&self) -> &[(String, CompiledNode)] {
        &self.fields
    }

    /// Fresh object with every declared key present.
    #[inline]
    pub fn instantiate(&self) -> Object {
        self.template.clone()
    }
}

/// Union with resolved tag width. Variant payloads are always objects.
#[derive(Debug)]
pub struct UnionLayout {
    pub discriminator: String,
    pub variants: Vec<(Value, ObjectLayout)>,
    pub tag: TagWidth,
}

/// Literal table with resolved tag width.
#[derive(Debug)]
pub struct LiteralTable {
    pub values: Vec<Value>,
    pub includes_undefined: bool,
    pub tag: TagWidth,
}

/// Node of a compiled schema.
#[derive(Debug)]
pub enum CompiledNode {
    Int { width: IntWidth, signed: bool },
    Float { width: FloatWidth },
    Bool,
    String,
    Array(Box<CompiledNode>),
    Set(Box<CompiledNode>),
    Map(Box<CompiledNode>, Box<CompiledNode>),
    Tuple {
        fixed: Vec<CompiledNode>,
        rest: Option<Box<CompiledNode>>,
    },
    Object(ObjectLayout),
    Optional(Box<CompiledNode>),
    Union(UnionLayout),
    MixedUnion {
        primitive: Box<CompiledNode>,
        object: Box<CompiledNode>,
    },
    Literal(LiteralTable),
    Packed(Box<CompiledNode>),
    Blob,
    Leaf(Arc<dyn LeafCodec>),
}

/// Immutable, packing-annotated schema shared by encoders and decoders.
#[derive(Debug)]
pub struct CompiledSchema {
    root: CompiledNode,
    packing: PackingInfo,
}

impl CompiledSchema {
    /// Compile a schema that uses no leaf codecs.
    pub fn compile(node: &SchemaNode) -> Result<Self> {
        Self::compile_with(node, &LeafRegistry::new())
    }

    /// Compile a schema, resolving leaf kinds against `registry`.
    pub fn compile_with(node: &SchemaNode, registry: &LeafRegistry) -> Result<Self> {
        let mut compiler = Compiler {
            registry,
            packing: PackingInfo::default(),
        };
        let root = compiler.node(node, Scope::default(), 0)?;
        let packing = compiler.packing;

        tracing::debug!(
            root = node.kind_name(),
            has_packing = packing.has_packing,
            variable = packing.has_variable_arity_packing,
            guaranteed_bits = packing.minimum_guaranteed_bits,
            "schema compiled"
        );

        Ok(Self { root, packing })
    }

    pub fn root(&self) -> &CompiledNode {
        &self.root
    }

    pub fn packing(&self) -> PackingInfo {
        self.packing
    }
}

/// Hashable view of a scalar for duplicate detection.
#[derive(PartialEq, Eq, Hash)]
enum ScalarKey<'a> {
    Bool(bool),
    Int(i64),
    Float(u64),
    String(&'a str),
}

impl<'a> From<&'a Scalar> for ScalarKey<'a> {
    fn from(s: &'a Scalar) -> Self {
        match s {
            Scalar::Bool(b) => ScalarKey::Bool(*b),
            Scalar::Int(n) => ScalarKey::Int(*n),
            Scalar::Float(f) => ScalarKey::Float(f.to_bits()),
            Scalar::String(s) => ScalarKey::String(s),
        }
    }
}

fn ensure_unique<'a>(what: &str, scalars: impl Iterator<Item = &'a Scalar>) -> Result<()> {
    let mut seen = HashSet::new();
    for scalar in scalars {
        if !seen.insert(ScalarKey::from(scalar)) {
            return Err(CodecError::Schema(format!("duplicate {what} {scalar:?}")));
        }
    }
    Ok(())
}

struct Compiler<'r> {
    registry: &'r LeafRegistry,
    packing: PackingInfo,
}

impl Compiler<'_> {
    fn node(&mut self, node: &SchemaNode, scope: Scope, depth: usize) -> Result<CompiledNode> {
        if depth >= MAX_SCHEMA_DEPTH {
            return Err(CodecError::Schema(format!(
                "schema nesting exceeds {MAX_SCHEMA_DEPTH} levels"
            )));
        }
        let depth = depth + 1;

        let compiled = match node {
            SchemaNode::Int { width, signed } => CompiledNode::Int {
                width: *width,
                signed: *signed,
            },
            SchemaNode::Float { width } => CompiledNode::Float { width: *width },
            SchemaNode::Bool => {
                self.packing.add_packed_bit(scope);
                CompiledNode::Bool
            }
            SchemaNode::String => CompiledNode::String,
            SchemaNode::Array { element } => {
                CompiledNode::Array(Box::new(self.node(element, scope.size_unknown(), depth)?))
            }
            SchemaNode::Set { element } => {
                CompiledNode::Set(Box::new(self.node(element, scope.size_unknown(), depth)?))
            }
            SchemaNode::Map { key, value } => CompiledNode::Map(
                Box::new(self.node(key, scope.size_unknown(), depth)?),
                Box::new(self.node(value, scope.size_unknown(), depth)?),
            ),
            SchemaNode::Tuple { fixed, rest } => {
                let fixed = fixed
                    .iter()
                    .map(|element| self.node(element, scope, depth))
                    .collect::<Result<Vec<_>>>()?;
                let rest = match rest {
                    Some(rest) => Some(Box::new(self.node(rest, scope.size_unknown(), depth)?)),
                    None => None,
                };
                CompiledNode::Tuple { fixed, rest }
            }
            SchemaNode::Object { fields } => CompiledNode::Object(self.object(fields, scope, depth)?),
            SchemaNode::Optional { inner } => {
                // Presence flag belongs to the enclosing scope.
                self.packing.add_packed_bit(scope);
                CompiledNode::Optional(Box::new(self.node(inner, scope.size_unknown(), depth)?))
            }
            SchemaNode::Union {
                discriminator,
                variants,
            } => CompiledNode::Union(self.union(discriminator, variants, scope, depth)?),
            SchemaNode::MixedUnion { primitive, object } => CompiledNode::MixedUnion {
                primitive: Box::new(self.node(primitive, scope.size_unknown(), depth)?),
                object: Box::new(self.node(object, scope.size_unknown(), depth)?),
            },
            SchemaNode::Literal {
                values,
                includes_undefined,
            } => CompiledNode::Literal(self.literal(values, *includes_undefined, scope)?),
            SchemaNode::Packed { inner } => {
                self.packing.has_packing = true;
                CompiledNode::Packed(Box::new(self.node(inner, scope.packed(), depth)?))
            }
            SchemaNode::Blob => CompiledNode::Blob,
            SchemaNode::Leaf { name } => {
                let codec = self.registry.get(name).ok_or_else(|| {
                    CodecError::Schema(format!("no leaf codec registered for '{name}'"))
                })?;
                if codec.packs_bit() {
                    self.packing.add_packed_bit(scope);
                }
                CompiledNode::Leaf(codec)
            }
        };

        Ok(compiled)
    }

    fn object(
        &mut self,
        fields: &[(String, SchemaNode)],
        scope: Scope,
        depth: usize,
    ) -> Result<ObjectLayout> {
        let mut template = Object::new();
        let mut flattened = Vec::with_capacity(fields.len());

        for (name, node) in fields {
            if template.insert(name.clone(), Value::Undefined).is_some() {
                return Err(CodecError::Schema(format!("duplicate object field '{name}'")));
            }
            flattened.push((name.clone(), self.node(node, scope, depth)?));
        }

        Ok(ObjectLayout {
            fields: flattened,
            template,
        })
    }

    fn union(
        &mut self,
        discriminator: &str,
        variants: &[(Scalar, SchemaNode)],
        scope: Scope,
        depth: usize,
    ) -> Result<UnionLayout> {
        if variants.is_empty() {
            return Err(CodecError::Schema(format!(
                "union on '{discriminator}' has no variants"
            )));
        }
        ensure_unique("union tag", variants.iter().map(|(tag, _)| tag))?;

        let tag = if scope.packed && variants.len() == 2 {
            self.packing.add_packed_bit(scope);
            TagWidth::PackedBit
        } else {
            TagWidth::for_states(variants.len())?
        };

        // Which payload follows is only known at runtime.
        let payload_scope = scope.size_unknown();
        let mut compiled = Vec::with_capacity(variants.len());
        for (tag_value, payload) in variants {
            let SchemaNode::Object { fields } = payload else {
                return Err(CodecError::Schema(format!(
                    "union variant {tag_value:?} must be an object, got {}",
                    payload.kind_name()
                )));
            };
            if fields.iter().any(|(name, _)| name == discriminator) {
                return Err(CodecError::Schema(format!(
                    "union variant {tag_value:?} redeclares discriminator '{discriminator}'"
                )));
            }
            let layout = self.object(fields, payload_scope, depth)?;
            compiled.push((Value::from(tag_value.clone()), layout));
        }

        Ok(UnionLayout {
            discriminator: discriminator.to_string(),
            variants: compiled,
            tag,
        })
    }

    fn literal(
        &mut self,
        values: &[Scalar],
        includes_undefined: bool,
        scope: Scope,
    ) -> Result<LiteralTable> {
        let states = values.len() + usize::from(includes_undefined);
        if states == 0 {
            return Err(CodecError::Schema("literal has no values".to_string()));
        }
        ensure_unique("literal value", values.iter())?;

        let tag = if scope.packed && values.len() == 2 && !includes_undefined {
            self.packing.add_packed_bit(scope);
            TagWidth::PackedBit
        } else if states == 1 {
            TagWidth::None
        } else {
            TagWidth::for_states(states)?
        };

        Ok(LiteralTable {
            values: values.iter().cloned().map(Value::from).collect(),
            includes_undefined,
            tag,
        })
    }
}
