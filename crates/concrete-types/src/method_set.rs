//! Interface method sets
//!
//! The complete method set of an interface is built depth first: the
//! method sets of embedded interfaces come first, in embedding order, then
//! the interface's own methods in declaration order. A method reached more
//! than once keeps its first position if the signatures are identical and
//! is a conflict otherwise.
//!
//! Type arguments are never substituted, so generic types and
//! instantiations have no method set here.

use crate::context::TypeContext;
use crate::display::TypeWriter;
use crate::error::TypeError;
use crate::ty::*;
use rustc_hash::FxHashMap;

/// One entry of a complete method set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub name: String,
    /// A `Type::Signature`
    pub signature: TypeId,
}

struct Collector<'a> {
    ctx: &'a TypeContext,
    methods: Vec<MethodEntry>,
    index: FxHashMap<String, usize>,
    /// Named interfaces on the current embedding path
    path: Vec<TypeId>,
}

impl TypeContext {
    /// Compute the complete, ordered method set of an interface type.
    ///
    /// `id` may be a named interface or an interface literal.
    pub fn method_set(&self, id: TypeId) -> Result<Vec<MethodEntry>, TypeError> {
        let mut collector = Collector {
            ctx: self,
            methods: Vec::new(),
            index: FxHashMap::default(),
            path: Vec::new(),
        };
        collector.visit(id)?;
        Ok(collector.methods)
    }
}

impl Collector<'_> {
    fn visit(&mut self, id: TypeId) -> Result<(), TypeError> {
        if self.ctx.needs_instantiation(id) {
            return Err(TypeError::Generic {
                name: TypeWriter::new(self.ctx).type_string(id),
            });
        }

        let is_named = matches!(self.ctx.get(id), Type::Named(_));
        if is_named {
            if let Some(start) = self.path.iter().position(|&seen| seen == id) {
                return Err(TypeError::CircularReference {
                    cycle: self.describe_cycle(start, id),
                });
            }
            self.path.push(id);
        }

        let result = self.visit_underlying(id);

        if is_named {
            self.path.pop();
        }
        result
    }

    fn visit_underlying(&mut self, id: TypeId) -> Result<(), TypeError> {
        let ctx = self.ctx;
        let underlying = ctx.underlying(id)?;
        let iface = match ctx.get(underlying) {
            Type::Interface(iface) => iface,
            other => {
                return Err(TypeError::NotAnInterface {
                    name: TypeWriter::new(ctx).type_string(id),
                    kind: other.kind_name(),
                });
            }
        };

        for &embedded in &iface.embeddeds {
            // Type terms of a constraint contribute no methods
            if iface.constraint && !ctx.is_interface(embedded) {
                continue;
            }
            self.visit(embedded)?;
        }
        for method in &iface.methods {
            self.add(method)?;
        }
        Ok(())
    }

    fn add(&mut self, method: &Method) -> Result<(), TypeError> {
        if let Some(&existing) = self.index.get(&method.name) {
            let first = self.methods[existing].signature;
            if self.ctx.identical(first, method.signature) {
                return Ok(());
            }
            let writer = TypeWriter::new(self.ctx);
            return Err(TypeError::DuplicateMethod {
                method: method.name.clone(),
                first: writer.type_string(first),
                second: writer.type_string(method.signature),
            });
        }

        self.index.insert(method.name.clone(), self.methods.len());
        self.methods.push(MethodEntry {
            name: method.name.clone(),
            signature: method.signature,
        });
        Ok(())
    }

    fn describe_cycle(&self, start: usize, closing: TypeId) -> String {
        let writer = TypeWriter::new(self.ctx);
        self.path[start..]
            .iter()
            .chain(std::iter::once(&closing))
            .map(|&id| writer.type_string(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(methods: &[MethodEntry]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    fn unit_method(ctx: &mut TypeContext, name: &str) -> Method {
        Method {
            name: name.to_string(),
            signature: ctx.signature(Vec::new(), Vec::new(), false),
        }
    }

    fn named_interface(
        ctx: &mut TypeContext,
        name: &str,
        methods: Vec<Method>,
        embeddeds: Vec<TypeId>,
    ) -> TypeId {
        let (named_id, id) = ctx.declare_named(name, Some(PackageRef::new("p", "./p")));
        let iface = ctx.interface(methods, embeddeds);
        ctx.set_underlying(named_id, iface);
        id
    }

    #[test]
    fn test_embedded_methods_come_first() {
        let mut ctx = TypeContext::new();
        let foo = unit_method(&mut ctx, "Foo");
        let bar = unit_method(&mut ctx, "Bar");
        let b = named_interface(&mut ctx, "B", vec![foo], Vec::new());
        let a = named_interface(&mut ctx, "A", vec![bar], vec![b]);

        let set = ctx.method_set(a).unwrap();
        assert_eq!(names(&set), vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let mut ctx = TypeContext::new();
        let methods = ["Zeta", "Alpha", "Mid"]
            .iter()
            .map(|n| unit_method(&mut ctx, n))
            .collect();
        let i = named_interface(&mut ctx, "I", methods, Vec::new());
        assert_eq!(names(&ctx.method_set(i).unwrap()), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_diamond_embedding_deduplicates() {
        let mut ctx = TypeContext::new();
        let close = unit_method(&mut ctx, "Close");
        let read = unit_method(&mut ctx, "Read");
        let write = unit_method(&mut ctx, "Write");
        let closer = named_interface(&mut ctx, "Closer", vec![close], Vec::new());
        let rc = named_interface(&mut ctx, "ReadCloser", vec![read], vec![closer]);
        let wc = named_interface(&mut ctx, "WriteCloser", vec![write], vec![closer]);
        let rwc = named_interface(&mut ctx, "RWC", Vec::new(), vec![rc, wc]);

        let set = ctx.method_set(rwc).unwrap();
        assert_eq!(names(&set), vec!["Close", "Read", "Write"]);
    }

    #[test]
    fn test_conflicting_duplicate_fails() {
        let mut ctx = TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let returns_int = ctx.signature(Vec::new(), vec![Var::unnamed(int)], false);
        let plain = unit_method(&mut ctx, "Len");
        let b = named_interface(&mut ctx, "B", vec![plain], Vec::new());
        let a = named_interface(
            &mut ctx,
            "A",
            vec![Method {
                name: "Len".to_string(),
                signature: returns_int,
            }],
            vec![b],
        );

        let err = ctx.method_set(a).unwrap_err();
        assert!(matches!(err, TypeError::DuplicateMethod { ref method, .. } if method == "Len"));
    }

    #[test]
    fn test_embedding_cycle_fails() {
        let mut ctx = TypeContext::new();
        let pkg = Some(PackageRef::new("p", "./p"));
        let (a_id, a) = ctx.declare_named("A", pkg.clone());
        let (b_id, b) = ctx.declare_named("B", pkg);
        let a_iface = ctx.interface(Vec::new(), vec![b]);
        let b_iface = ctx.interface(Vec::new(), vec![a]);
        ctx.set_underlying(a_id, a_iface);
        ctx.set_underlying(b_id, b_iface);

        let err = ctx.method_set(a).unwrap_err();
        assert_eq!(
            err,
            TypeError::CircularReference {
                cycle: "p.A -> p.B -> p.A".to_string()
            }
        );
    }

    #[test]
    fn test_non_interface_embed_fails() {
        let mut ctx = TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let (n_id, n) = ctx.declare_named("Number", Some(PackageRef::new("p", "./p")));
        ctx.set_underlying(n_id, int);
        let i = named_interface(&mut ctx, "I", Vec::new(), vec![n]);

        let err = ctx.method_set(i).unwrap_err();
        assert!(matches!(err, TypeError::NotAnInterface { kind: "basic type", .. }));
    }

    #[test]
    fn test_opaque_embed_fails() {
        let mut ctx = TypeContext::new();
        let scanner = ctx.opaque_named("Scanner", &PackageRef::new("scan", "example.com/scan"));
        let i = named_interface(&mut ctx, "I", Vec::new(), vec![scanner]);
        let err = ctx.method_set(i).unwrap_err();
        assert_eq!(
            err,
            TypeError::Opaque {
                name: "scan.Scanner".to_string()
            }
        );
    }

    #[test]
    fn test_instantiated_embed_fails() {
        let mut ctx = TypeContext::new();
        let t = ctx.type_param("T");
        let get = ctx.signature(Vec::new(), vec![Var::unnamed(t)], false);
        let getter = named_interface(
            &mut ctx,
            "Getter",
            vec![Method {
                name: "Get".to_string(),
                signature: get,
            }],
            Vec::new(),
        );
        if let Type::Named(id) = *ctx.get(getter) {
            ctx.set_type_params(id, vec!["T".to_string()]);
        }
        let int = ctx.basic(BasicKind::Int);
        let int_getter = ctx.instance(getter, vec![int]);
        let i = named_interface(&mut ctx, "I", Vec::new(), vec![int_getter]);

        let err = ctx.method_set(i).unwrap_err();
        assert!(matches!(err, TypeError::Generic { ref name } if name == "p.Getter[int]"));
        assert!(matches!(ctx.method_set(getter), Err(TypeError::Generic { .. })));
    }

    #[test]
    fn test_constraint_terms_are_skipped() {
        let mut ctx = TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let string = ctx.basic(BasicKind::String);
        let error = ctx.error_type();
        let foo = unit_method(&mut ctx, "Foo");
        let c = ctx.constraint_interface(vec![foo], vec![int, string, error]);
        assert_eq!(names(&ctx.method_set(c).unwrap()), vec!["Error", "Foo"]);
    }

    #[test]
    fn test_method_set_is_idempotent() {
        let mut ctx = TypeContext::new();
        let foo = unit_method(&mut ctx, "Foo");
        let error = ctx.error_type();
        let i = named_interface(&mut ctx, "I", vec![foo], vec![error]);
        let first = ctx.method_set(i).unwrap();
        let second = ctx.method_set(i).unwrap();
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["Error", "Foo"]);
    }
}
