//! Human-readable names for subjects: function signatures, variable
//! declarations, and the access/linkage vocabulary the reporter's prose
//! uses throughout (spec §4.7).

use abidiff_core::Context;
use abidiff_ir::{Decl, FunctionDecl, FunctionType, SubjectId, Type, VariableDecl};

pub(crate) fn function_decl(ctx: &Context, id: SubjectId) -> Option<&FunctionDecl> {
    match ctx.env.get(id).as_decl()? {
        Decl::Function(f) => Some(f),
        _ => None,
    }
}

pub(crate) fn variable_decl(ctx: &Context, id: SubjectId) -> Option<&VariableDecl> {
    match ctx.env.get(id).as_decl()? {
        Decl::Variable(v) => Some(v),
        _ => None,
    }
}

fn function_type_of<'a>(ctx: &'a Context, f: &FunctionDecl) -> Option<&'a FunctionType> {
    match ctx.env.get(f.function_type).as_type()? {
        Type::FunctionType(ft) => Some(ft),
        _ => None,
    }
}

/// `"void foo(int, char*)"` — return type, declared name, parameter types
/// (`this` already excluded by the IR), `...` appended for variadics.
pub(crate) fn function_signature(ctx: &Context, id: SubjectId) -> String {
    let f = match function_decl(ctx, id) {
        Some(f) => f,
        None => return String::from("<unknown function>"),
    };
    let ft = function_type_of(ctx, f);
    let ret = ft
        .map(|ft| ctx.env.get(ft.return_type).qualified_name(ctx.env).to_string())
        .unwrap_or_else(|| "void".to_string());
    let mut parts: Vec<String> = ft
        .map(|ft| {
            ft.parameters
                .iter()
                .filter_map(|&p| match ctx.env.get(p).as_decl() {
                    Some(Decl::FunctionParameter(pd)) => {
                        Some(ctx.env.get(pd.param_type).qualified_name(ctx.env).to_string())
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    if ft.map(|ft| ft.is_variadic).unwrap_or(false) {
        parts.push("...".to_string());
    }
    format!("{} {}({})", ret, f.name, parts.join(", "))
}

/// `"int foo"` — type name followed by the declared name.
pub(crate) fn variable_signature(ctx: &Context, id: SubjectId) -> String {
    let v = match variable_decl(ctx, id) {
        Some(v) => v,
        None => return String::from("<unknown variable>"),
    };
    format!("{} {}", ctx.env.get(v.var_type).qualified_name(ctx.env), v.name)
}

pub(crate) fn quote(name: impl std::fmt::Display) -> String {
    format!("'{}'", name)
}
