//! Type strings
//!
//! `TypeWriter` renders types as Go source. Named types declared in the
//! package the text is written for appear unqualified; every other named
//! type is qualified with its package name.

use crate::context::TypeContext;
use crate::ty::*;
use std::fmt::Write;

/// Renders types relative to a destination package.
#[derive(Debug, Clone, Copy)]
pub struct TypeWriter<'a> {
    ctx: &'a TypeContext,
    /// Path of the package the text is written for
    local: Option<&'a str>,
}

impl<'a> TypeWriter<'a> {
    /// A writer that qualifies every declared type.
    pub fn new(ctx: &'a TypeContext) -> Self {
        Self { ctx, local: None }
    }

    /// A writer for text living in the package at `path`.
    pub fn relative_to(ctx: &'a TypeContext, path: &'a str) -> Self {
        Self {
            ctx,
            local: Some(path),
        }
    }

    pub fn type_string(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    /// Render the `T` of a variadic parameter whose type is `[]T`.
    pub fn variadic_elem_string(&self, id: TypeId) -> String {
        match self.ctx.get(id) {
            Type::Slice(elem) => self.type_string(*elem),
            _ => self.type_string(id),
        }
    }

    /// Qualified name of a named type, e.g. `io.Reader` or `Local`.
    fn write_named(&self, out: &mut String, named: &NamedType) {
        if let Some(package) = &named.package {
            if self.local != Some(package.path.as_str()) {
                out.push_str(&package.name);
                out.push('.');
            }
        }
        out.push_str(&named.name);
    }

    fn write_type(&self, out: &mut String, id: TypeId) {
        match self.ctx.get(id) {
            Type::Basic(kind) => out.push_str(kind.name()),
            Type::Named(named) => self.write_named(out, self.ctx.named(*named)),
            Type::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem);
            }
            Type::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem);
            }
            Type::Array { len, elem } => {
                let _ = write!(out, "[{}]", len);
                self.write_type(out, *elem);
            }
            Type::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, *key);
                out.push(']');
                self.write_type(out, *value);
            }
            Type::Chan { dir, elem } => {
                let parens = *dir == ChanDir::Both
                    && matches!(self.ctx.get(*elem), Type::Chan { dir: ChanDir::Recv, .. });
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                if parens {
                    out.push('(');
                }
                self.write_type(out, *elem);
                if parens {
                    out.push(')');
                }
            }
            Type::Signature(sig) => {
                out.push_str("func");
                self.write_signature(out, sig);
            }
            Type::Struct(st) => {
                out.push_str("struct{");
                for (i, field) in st.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(&field.name);
                        out.push(' ');
                    }
                    self.write_type(out, field.ty);
                    if let Some(tag) = &field.tag {
                        let _ = write!(out, " {:?}", tag);
                    }
                }
                out.push('}');
            }
            Type::Interface(iface) => {
                out.push_str("interface{");
                let mut first = true;
                for method in &iface.methods {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    out.push_str(&method.name);
                    if let Type::Signature(sig) = self.ctx.get(method.signature) {
                        self.write_signature(out, sig);
                    }
                }
                for &embedded in &iface.embeddeds {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    self.write_type(out, embedded);
                }
                out.push('}');
            }
            Type::Param(name) => out.push_str(name),
            Type::Instance { base, args } => {
                self.write_type(out, *base);
                out.push('[');
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_type(out, arg);
                }
                out.push(']');
            }
        }
    }

    fn write_signature(&self, out: &mut String, sig: &Signature) {
        self.write_vars(out, &sig.params, sig.variadic);

        match sig.results.as_slice() {
            [] => {}
            [only] if only.name.is_none() => {
                out.push(' ');
                self.write_type(out, only.ty);
            }
            results => {
                out.push(' ');
                self.write_vars(out, results, false);
            }
        }
    }

    fn write_vars(&self, out: &mut String, vars: &[Var], variadic: bool) {
        out.push('(');
        for (i, var) in vars.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(name) = &var.name {
                out.push_str(name);
                out.push(' ');
            }
            if variadic && i == vars.len() - 1 {
                out.push_str("...");
                out.push_str(&self.variadic_elem_string(var.ty));
            } else {
                self.write_type(out, var.ty);
            }
        }
        out.push(')');
    }

    /// Source text of the zero value of a type.
    ///
    /// `nil` for pointers, slices, maps, channels, functions and interfaces,
    /// `0`, `""` or `false` for basic types, and a composite literal `T{}`
    /// for struct and array types. Types of unknown shape, such as opaque
    /// types and type parameters, get `*new(T)`.
    pub fn zero_value(&self, id: TypeId) -> String {
        let underlying = match self.ctx.underlying(id) {
            Ok(underlying) => underlying,
            Err(_) => return format!("*new({})", self.type_string(id)),
        };

        match self.ctx.get(underlying) {
            Type::Basic(BasicKind::Bool) => "false".to_string(),
            Type::Basic(BasicKind::String) => "\"\"".to_string(),
            Type::Basic(_) => "0".to_string(),
            Type::Struct(_) | Type::Array { .. } => format!("{}{{}}", self.type_string(id)),
            Type::Named(_)
            | Type::Pointer(_)
            | Type::Slice(_)
            | Type::Map { .. }
            | Type::Chan { .. }
            | Type::Signature(_)
            | Type::Interface(_) => "nil".to_string(),
            Type::Param(_) | Type::Instance { .. } => format!("*new({})", self.type_string(id)),
        }
    }
}
