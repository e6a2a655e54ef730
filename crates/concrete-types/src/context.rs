//! Type context for managing types and type interning

use crate::display::TypeWriter;
use crate::error::TypeError;
use crate::ty::*;
use rustc_hash::FxHashMap;

/// Type context that manages all types of a load session
///
/// Types are interned so structurally equal types share a `TypeId`. Named
/// types are unique per declaration. One context is shared by a package
/// and everything it imports.
#[derive(Debug, Clone)]
pub struct TypeContext {
    /// Storage for all types, indexed by TypeId
    types: Vec<Type>,

    /// Reverse mapping from Type to TypeId for interning
    type_to_id: FxHashMap<Type, TypeId>,

    /// Declared types, indexed by NamedId
    named: Vec<NamedType>,

    /// The predeclared `error` type
    error_type: TypeId,

    /// `interface{}`
    empty_interface: TypeId,

    /// The predeclared `comparable` constraint
    comparable: TypeId,

    /// Opaque named types by package path and name
    opaque: FxHashMap<(String, String), TypeId>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// Create a context holding the predeclared types.
    pub fn new() -> Self {
        let mut ctx = TypeContext {
            types: Vec::new(),
            type_to_id: FxHashMap::default(),
            named: Vec::new(),
            error_type: TypeId(0),
            empty_interface: TypeId(0),
            comparable: TypeId(0),
            opaque: FxHashMap::default(),
        };

        // Pre-intern the basic types so their ids follow BasicKind::ALL
        for kind in BasicKind::ALL {
            ctx.intern(Type::Basic(kind));
        }

        ctx.empty_interface = ctx.intern(Type::Interface(InterfaceType {
            methods: Vec::new(),
            embeddeds: Vec::new(),
            constraint: false,
        }));

        // type error interface { Error() string }
        let string = ctx.basic(BasicKind::String);
        let error_sig = ctx.intern(Type::Signature(Signature {
            params: Vec::new(),
            results: vec![Var::unnamed(string)],
            variadic: false,
        }));
        let error_iface = ctx.intern(Type::Interface(InterfaceType {
            methods: vec![Method {
                name: "Error".to_string(),
                signature: error_sig,
            }],
            embeddeds: Vec::new(),
            constraint: false,
        }));
        let (error_id, error_type) = ctx.declare_named("error", None);
        ctx.set_underlying(error_id, error_iface);
        ctx.error_type = error_type;

        let comparable_iface = ctx.constraint_interface(Vec::new(), Vec::new());
        let (comparable_id, comparable) = ctx.declare_named("comparable", None);
        ctx.set_underlying(comparable_id, comparable_iface);
        ctx.comparable = comparable;

        ctx
    }

    /// Intern a type, returning its TypeId
    ///
    /// If the type already exists, returns the existing TypeId.
    /// Otherwise, allocates a new TypeId and stores the type.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.type_to_id.get(&ty) {
            return id;
        }

        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.type_to_id.insert(ty, id);
        id
    }

    /// Get a type by its TypeId
    ///
    /// Ids are only ever produced by this context, so lookups cannot miss.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    /// Look up a type's ID without interning
    pub fn lookup(&self, ty: &Type) -> Option<TypeId> {
        self.type_to_id.get(ty).copied()
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ========================================================================
    // Named types
    // ========================================================================

    /// Declare a new named type with an unbound underlying type.
    pub fn declare_named(
        &mut self,
        name: impl Into<String>,
        package: Option<PackageRef>,
    ) -> (NamedId, TypeId) {
        let named_id = NamedId(self.named.len() as u32);
        self.named.push(NamedType {
            name: name.into(),
            package,
            underlying: None,
            type_params: Vec::new(),
            opaque: false,
        });
        (named_id, self.intern(Type::Named(named_id)))
    }

    /// Bind the underlying type of a declared type.
    ///
    /// The stored underlying type is always a non-named type: binding to
    /// another named type stores that type's underlying instead. A type
    /// defined from an opaque type is opaque itself.
    pub fn set_underlying(&mut self, id: NamedId, underlying: TypeId) {
        let (resolved, opaque) = match self.get(underlying) {
            Type::Named(other) => {
                let other = &self.named[other.0 as usize];
                (other.underlying, other.opaque)
            }
            _ => (Some(underlying), false),
        };
        let named = &mut self.named[id.0 as usize];
        named.underlying = resolved;
        named.opaque |= opaque;
    }

    /// Record the type parameter names of a generic declaration.
    pub fn set_type_params(&mut self, id: NamedId, names: Vec<String>) {
        self.named[id.0 as usize].type_params = names;
    }

    /// The named type `name` of a package whose declarations are unknown.
    ///
    /// Repeated requests for one name yield the same type.
    pub fn opaque_named(&mut self, name: &str, package: &PackageRef) -> TypeId {
        let key = (package.path.clone(), name.to_string());
        if let Some(&ty) = self.opaque.get(&key) {
            return ty;
        }
        let (named_id, ty) = self.declare_named(name, Some(package.clone()));
        self.named[named_id.0 as usize].opaque = true;
        self.opaque.insert(key, ty);
        ty
    }

    pub fn named(&self, id: NamedId) -> &NamedType {
        &self.named[id.0 as usize]
    }

    /// The named type behind `id`, if it is one.
    pub fn as_named(&self, id: TypeId) -> Option<&NamedType> {
        match self.get(id) {
            Type::Named(named) => Some(self.named(*named)),
            _ => None,
        }
    }

    /// Follow a named type to its underlying type.
    ///
    /// An instantiation `List[int]` has the underlying type of `List`, with
    /// the type parameters left in place. Fails for a named type whose
    /// declaration has not been resolved and for opaque types.
    pub fn underlying(&self, id: TypeId) -> Result<TypeId, TypeError> {
        let mut current = id;
        // Named types and instantiations alternate at most once per declaration
        for _ in 0..=2 * self.named.len() {
            current = match self.get(current) {
                Type::Named(named) => {
                    let named = self.named(*named);
                    if named.opaque {
                        return Err(TypeError::Opaque {
                            name: TypeWriter::new(self).type_string(current),
                        });
                    }
                    named.underlying.ok_or_else(|| TypeError::UndefinedType {
                        name: named.name.clone(),
                    })?
                }
                Type::Instance { base, .. } => *base,
                _ => return Ok(current),
            };
        }
        Err(TypeError::CircularReference {
            cycle: TypeWriter::new(self).type_string(id),
        })
    }

    /// True for generic named types and for types whose method set
    /// depends on type arguments: instantiations and types defined as one.
    pub fn needs_instantiation(&self, id: TypeId) -> bool {
        match self.get(id) {
            Type::Instance { .. } => true,
            Type::Named(named) => {
                let named = self.named(*named);
                named.is_generic()
                    || named
                        .underlying
                        .is_some_and(|u| matches!(self.get(u), Type::Instance { .. }))
            }
            _ => false,
        }
    }

    /// True if `id` is an interface with type-set elements, directly or
    /// through an embedded interface such as `comparable`.
    pub fn is_constraint(&self, id: TypeId) -> bool {
        self.constraint_in(id, &mut Vec::new())
    }

    fn constraint_in(&self, id: TypeId, seen: &mut Vec<TypeId>) -> bool {
        if seen.contains(&id) {
            return false;
        }
        seen.push(id);
        match self.underlying(id).map(|u| self.get(u)) {
            Ok(Type::Interface(iface)) => {
                iface.constraint
                    || iface
                        .embeddeds
                        .iter()
                        .any(|&embedded| self.constraint_in(embedded, seen))
            }
            _ => false,
        }
    }

    /// True if the underlying type of `id` is an interface.
    pub fn is_interface(&self, id: TypeId) -> bool {
        matches!(
            self.underlying(id).map(|u| self.get(u)),
            Ok(Type::Interface(_))
        )
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        self.intern(Type::Basic(kind))
    }

    pub fn error_type(&self) -> TypeId {
        self.error_type
    }

    pub fn empty_interface(&self) -> TypeId {
        self.empty_interface
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Pointer(elem))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.intern(Type::Slice(elem))
    }

    pub fn array(&mut self, len: ArrayLen, elem: TypeId) -> TypeId {
        self.intern(Type::Array { len, elem })
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(Type::Map { key, value })
    }

    pub fn chan(&mut self, dir: ChanDir, elem: TypeId) -> TypeId {
        self.intern(Type::Chan { dir, elem })
    }

    pub fn signature(&mut self, params: Vec<Var>, results: Vec<Var>, variadic: bool) -> TypeId {
        self.intern(Type::Signature(Signature {
            params,
            results,
            variadic,
        }))
    }

    pub fn struct_type(&mut self, fields: Vec<Field>) -> TypeId {
        self.intern(Type::Struct(StructType { fields }))
    }

    pub fn interface(&mut self, methods: Vec<Method>, embeddeds: Vec<TypeId>) -> TypeId {
        self.intern(Type::Interface(InterfaceType {
            methods,
            embeddeds,
            constraint: false,
        }))
    }

    /// An interface with type-set elements; non-interface `embeddeds` are
    /// its type terms.
    pub fn constraint_interface(&mut self, methods: Vec<Method>, embeddeds: Vec<TypeId>) -> TypeId {
        self.intern(Type::Interface(InterfaceType {
            methods,
            embeddeds,
            constraint: true,
        }))
    }

    pub fn type_param(&mut self, name: impl Into<String>) -> TypeId {
        self.intern(Type::Param(name.into()))
    }

    pub fn instance(&mut self, base: TypeId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Instance { base, args })
    }

    /// Predeclared type names and the types they denote.
    ///
    /// `any` is an alias of `interface{}`.
    pub fn universe(&self) -> Vec<(&'static str, TypeId)> {
        let mut names: Vec<(&'static str, TypeId)> = BasicKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| (kind.name(), TypeId(i as u32)))
            .collect();
        names.push(("error", self.error_type));
        names.push(("any", self.empty_interface));
        names.push(("comparable", self.comparable));
        names
    }
}
