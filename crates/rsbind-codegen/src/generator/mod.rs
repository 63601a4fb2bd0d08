//! Entity generators.
//!
//! Each generator turns one IR entity into code model nodes through a
//! [`Backend`]. They share the call-site protocol below: convert each wire
//! argument, call, convert the result, return it.

mod callback_gen;
mod struct_gen;
mod trait_gen;

pub use callback_gen::CallbackGenerator;
pub use struct_gen::StructGenerator;
pub use trait_gen::TraitGenerator;

use crate::backend::{Backend, BindingContext, CallArg};
use crate::error::CodegenResult;
use crate::marshal::{Marshal, MethodPlan};
use crate::model::{CodeBlock, ParamSpec, TypeRef};
use crate::naming::to_camel_case;
use rsbind_ir::{AstType, MethodDesc};

/// Host-facing parameters of `method`
pub(crate) fn host_params(backend: &dyn Backend, method: &MethodDesc) -> Vec<ParamSpec> {
    method
        .wire_args()
        .map(|arg| ParamSpec::new(backend.host_name(&arg.name), backend.host_type(&arg.ty)))
        .collect()
}

/// Host-facing return type; `None` for `Void`
pub(crate) fn host_return(backend: &dyn Backend, ty: &AstType) -> Option<TypeRef> {
    (!ty.is_void()).then(|| backend.host_type(ty))
}

/// Wire-typed parameter named after the host parameter
pub(crate) fn wire_param(
    backend: &dyn Backend,
    ctx: &BindingContext<'_>,
    name: &str,
    marshal: &Marshal,
) -> Option<ParamSpec> {
    backend
        .wire_type(ctx, marshal)
        .map(|ty| ParamSpec::new(backend.host_name(name), ty))
}

/// Call-site local for an argument.
///
/// Built from the camelCase name, which never contains `_`, so the
/// underscore suffixes the backends append (`_handle`, `_buf`) cannot
/// land on another argument's local.
fn arg_local(prefix: &str, name: &str) -> String {
    format!("{prefix}_{}", to_camel_case(name))
}

/// Body of a host-to-native call.
///
/// `leading` arguments (such as a proxy's handle) are passed before the
/// converted wire arguments.
pub(crate) fn native_call_body(
    backend: &dyn Backend,
    ctx: &BindingContext<'_>,
    plan: &MethodPlan<'_>,
    callee: &str,
    leading: &[&str],
) -> CodegenResult<CodeBlock> {
    let mut body = CodeBlock::builder();
    let mut args: Vec<CallArg> = leading.iter().map(|a| CallArg::positional(*a)).collect();

    for arg in &plan.args {
        let wire = arg_local("w", &arg.arg.name);
        body = body.append(backend.convert(
            ctx,
            &arg.marshal,
            &backend.host_name(&arg.arg.name),
            &wire,
        )?);
        args.push(CallArg::positional(wire));
    }

    let call = backend.call(callee, &args);
    if plan.ret.is_void() {
        return Ok(body.line(call).build());
    }

    Ok(body
        .line(backend.bind("native_ret", &call))
        .append(backend.convert(ctx, &plan.ret, "native_ret", "host_ret")?)
        .line("return host_ret")
        .build())
}

/// Body of a trampoline invoking a host callback held in `registry`
pub(crate) fn trampoline_body(
    backend: &dyn Backend,
    ctx: &BindingContext<'_>,
    plan: &MethodPlan<'_>,
    registry: &str,
) -> CodegenResult<CodeBlock> {
    let lookup = backend.call(
        &format!("{registry}.lookup"),
        &[CallArg::positional("callback_handle")],
    );
    let mut body = CodeBlock::builder().line(backend.bind("host_callback", &lookup));
    let mut args = Vec::new();

    for arg in &plan.args {
        let host = arg_local("h", &arg.arg.name);
        let param = backend.host_name(&arg.arg.name);
        body = body.append(backend.convert(ctx, &arg.marshal, &param, &host)?);
        args.push(CallArg::labeled(param, host));
    }

    let callee = format!("host_callback.{}", backend.host_name(&plan.method.name));
    let call = backend.call(&callee, &args);
    if plan.ret.is_void() {
        return Ok(body.line(call).build());
    }

    Ok(body
        .line(backend.bind("host_ret", &call))
        .append(backend.convert(ctx, &plan.ret, "host_ret", "wire_ret")?)
        .line("return wire_ret")
        .build())
}
