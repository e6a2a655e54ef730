//! Type identity
//!
//! Two types are identical when they have the same structure, with named
//! types compared by declaration. Parameter and result names are ignored.

use crate::context::TypeContext;
use crate::ty::*;

impl TypeContext {
    /// Report whether `a` and `b` denote identical types.
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }

        match (self.get(a), self.get(b)) {
            (Type::Basic(x), Type::Basic(y)) => x.canonical() == y.canonical(),
            (Type::Pointer(x), Type::Pointer(y)) | (Type::Slice(x), Type::Slice(y)) => {
                self.identical(*x, *y)
            }
            (Type::Array { len: la, elem: ea }, Type::Array { len: lb, elem: eb }) => {
                la == lb && self.identical(*ea, *eb)
            }
            (Type::Map { key: ka, value: va }, Type::Map { key: kb, value: vb }) => {
                self.identical(*ka, *kb) && self.identical(*va, *vb)
            }
            (Type::Chan { dir: da, elem: ea }, Type::Chan { dir: db, elem: eb }) => {
                da == db && self.identical(*ea, *eb)
            }
            (Type::Signature(x), Type::Signature(y)) => self.identical_signatures(x, y),
            (Type::Struct(x), Type::Struct(y)) => {
                x.fields.len() == y.fields.len()
                    && x.fields.iter().zip(&y.fields).all(|(f, g)| {
                        f.name == g.name
                            && f.embedded == g.embedded
                            && f.tag == g.tag
                            && self.identical(f.ty, g.ty)
                    })
            }
            (Type::Interface(_), Type::Interface(_)) => self.identical_interfaces(a, b),
            (Type::Instance { base: x, args: xs }, Type::Instance { base: y, args: ys }) => {
                x == y
                    && xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(a, b)| self.identical(*a, *b))
            }
            // Distinct named types (and named vs unnamed) are never identical
            _ => false,
        }
    }

    fn identical_signatures(&self, x: &Signature, y: &Signature) -> bool {
        x.variadic == y.variadic
            && self.identical_vars(&x.params, &y.params)
            && self.identical_vars(&x.results, &y.results)
    }

    fn identical_vars(&self, x: &[Var], y: &[Var]) -> bool {
        x.len() == y.len() && x.iter().zip(y).all(|(a, b)| self.identical(a.ty, b.ty))
    }

    /// Interfaces are identical when their complete method sets match by
    /// name and signature, regardless of declaration order.
    fn identical_interfaces(&self, a: TypeId, b: TypeId) -> bool {
        let (Ok(mut xs), Ok(mut ys)) = (self.method_set(a), self.method_set(b)) else {
            return false;
        };
        if xs.len() != ys.len() {
            return false;
        }
        xs.sort_by(|m, n| m.name.cmp(&n.name));
        ys.sort_by(|m, n| m.name.cmp(&n.name));
        xs.iter()
            .zip(&ys)
            .all(|(m, n)| m.name == n.name && self.identical(m.signature, n.signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_identical_to_uint8() {
        let mut ctx = TypeContext::new();
        let byte = ctx.basic(BasicKind::Byte);
        let uint8 = ctx.basic(BasicKind::Uint8);
        let a = ctx.slice(byte);
        let b = ctx.slice(uint8);
        assert_ne!(a, b);
        assert!(ctx.identical(a, b));
    }

    #[test]
    fn test_parameter_names_ignored() {
        let mut ctx = TypeContext::new();
        let string = ctx.basic(BasicKind::String);
        let error = ctx.error_type();
        let a = ctx.signature(
            vec![Var::new(Some("s".to_string()), string)],
            vec![Var::unnamed(error)],
            false,
        );
        let b = ctx.signature(
            vec![Var::unnamed(string)],
            vec![Var::new(Some("err".to_string()), error)],
            false,
        );
        assert!(ctx.identical(a, b));
    }

    #[test]
    fn test_variadic_flag_matters() {
        let mut ctx = TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let ints = ctx.slice(int);
        let a = ctx.signature(vec![Var::unnamed(ints)], Vec::new(), true);
        let b = ctx.signature(vec![Var::unnamed(ints)], Vec::new(), false);
        assert!(!ctx.identical(a, b));
    }

    #[test]
    fn test_distinct_named_types() {
        let mut ctx = TypeContext::new();
        let int = ctx.basic(BasicKind::Int);
        let (a_id, a) = ctx.declare_named("A", None);
        let (b_id, b) = ctx.declare_named("B", None);
        ctx.set_underlying(a_id, int);
        ctx.set_underlying(b_id, int);
        assert!(!ctx.identical(a, b));
        assert!(!ctx.identical(a, int));
    }

    #[test]
    fn test_instantiations_compare_by_arguments() {
        let mut ctx = TypeContext::new();
        let (_, list) = ctx.declare_named("List", None);
        let byte = ctx.basic(BasicKind::Byte);
        let uint8 = ctx.basic(BasicKind::Uint8);
        let int = ctx.basic(BasicKind::Int);
        let bytes = ctx.instance(list, vec![byte]);
        let uint8s = ctx.instance(list, vec![uint8]);
        let ints = ctx.instance(list, vec![int]);
        assert!(ctx.identical(bytes, uint8s));
        assert!(!ctx.identical(bytes, ints));
    }

    #[test]
    fn test_interfaces_compare_by_method_set() {
        let mut ctx = TypeContext::new();
        let sig = ctx.signature(Vec::new(), Vec::new(), false);
        let m = |name: &str| Method {
            name: name.to_string(),
            signature: sig,
        };
        let ab = ctx.interface(vec![m("A"), m("B")], Vec::new());
        let ba = ctx.interface(vec![m("B"), m("A")], Vec::new());
        let a = ctx.interface(vec![m("A")], Vec::new());
        assert!(ctx.identical(ab, ba));
        assert!(!ctx.identical(ab, a));
    }
}
