//! Service type generation.
//!
//! A service trait becomes one host type holding, in order:
//! - the library initializer, when the backend needs one
//! - one public static method per trait method
//! - trampolines for every callback interface the trait accepts, emitted
//!   at first use: one per callback method, then the free trampoline
//! - native declarations, when the backend needs them
//!
//! Callback interfaces the trait returns additionally get a proxy type,
//! emitted after the service type by whichever service claims it first.

use super::{host_params, host_return, native_call_body, trampoline_body, wire_param};
use crate::backend::{
    Backend, BindingContext, CallArg, NativeSymbol, free_trampoline_name, proxy_name,
    registry_name, trampoline_name,
};
use crate::error::{CodegenError, CodegenResult};
use crate::marshal::{MarshalEngine, MethodPlan};
use crate::model::{
    CodeBlock, FieldSpec, Member, MethodSpec, Modifier, ParamSpec, TypeKind, TypeSpec,
};
use rsbind_ir::{AstType, TraitDesc};

/// Generates service types and the proxies they own
pub struct TraitGenerator<'a> {
    backend: &'a dyn Backend,
    engine: MarshalEngine,
}

impl<'a> TraitGenerator<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            engine: MarshalEngine::new(backend.string_ownership()),
        }
    }

    /// Generate the service type for `desc`, followed by a proxy for every
    /// callback in `proxies`
    pub fn generate(
        &self,
        ctx: &BindingContext<'_>,
        desc: &TraitDesc,
        proxies: &[&str],
    ) -> CodegenResult<Vec<TypeSpec>> {
        let mut members: Vec<Member> = Vec::new();

        if let Some(init) = self.backend.namespace_init(ctx) {
            members.push(init.into());
        }

        let mut natives = Vec::new();
        for method in &desc.methods {
            let plan = self.engine.native_call(method)?;
            members.push(self.host_method(ctx, &plan)?.into());
            natives.extend(self.native_declaration(
                ctx,
                NativeSymbol::Method(&method.name),
                Modifier::Private,
                &plan,
                None,
            ));
        }

        for callback in desc.callback_args() {
            members.extend(self.trampolines(ctx, callback)?);
        }

        let mut proxy_specs = Vec::new();
        for callback in proxies {
            let (proxy, proxy_natives) = self.proxy(ctx, callback)?;
            proxy_specs.push(proxy);
            natives.extend(proxy_natives);
        }
        members.extend(natives.into_iter().map(Member::from));

        let service = TypeSpec::builder(TypeKind::Namespace, desc.name.as_str())
            .modifier(Modifier::Public)
            .modifier(Modifier::Final)
            .doc(format!(
                "Bindings for `{}::{}::{}`.",
                desc.crate_name, desc.module, desc.name
            ))
            .members(members)
            .build();

        tracing::debug!(
            service = %desc.name,
            methods = desc.methods.len(),
            proxies = proxy_specs.len(),
            "generated service"
        );

        let mut specs = vec![service];
        specs.extend(proxy_specs);
        Ok(specs)
    }

    fn host_method(
        &self,
        ctx: &BindingContext<'_>,
        plan: &MethodPlan<'_>,
    ) -> CodegenResult<MethodSpec> {
        let method = plan.method;
        let callee = self
            .backend
            .native_callee(ctx, NativeSymbol::Method(&method.name));
        let body = native_call_body(self.backend, ctx, plan, &callee, &[])?;

        Ok(MethodSpec::builder(self.backend.host_name(&method.name))
            .modifier(Modifier::Public)
            .modifier(Modifier::Static)
            .params(host_params(self.backend, method))
            .returns_opt(host_return(self.backend, &method.return_type))
            .body(body)
            .build())
    }

    /// Wire-typed native declaration; `handle` names a leading handle parameter
    fn native_declaration(
        &self,
        ctx: &BindingContext<'_>,
        symbol: NativeSymbol<'_>,
        visibility: Modifier,
        plan: &MethodPlan<'_>,
        handle: Option<&str>,
    ) -> Option<MethodSpec> {
        let handle = handle.map(|name| ParamSpec::new(name, self.backend.handle_type()));
        let params = handle
            .into_iter()
            .chain(
                plan.args
                    .iter()
                    .filter_map(|arg| wire_param(self.backend, ctx, &arg.arg.name, &arg.marshal)),
            )
            .collect();

        self.backend.native_declaration(
            self.backend.native_name(ctx, symbol),
            visibility,
            params,
            self.backend.wire_type(ctx, &plan.ret),
        )
    }

    fn trampolines(&self, ctx: &BindingContext<'_>, callback: &str) -> CodegenResult<Vec<Member>> {
        let desc = ctx.ast.callback(callback).ok_or_else(|| {
            CodegenError::UnsupportedShape(format!("callback `{callback}` is not declared"))
        })?;
        let registry = registry_name(callback);
        let handle = || ParamSpec::new("callback_handle", self.backend.handle_type());

        let mut members = Vec::new();
        for method in &desc.methods {
            let plan = self.engine.trampoline(method)?;
            let params = std::iter::once(handle())
                .chain(
                    plan.args
                        .iter()
                        .filter_map(|arg| wire_param(self.backend, ctx, &arg.arg.name, &arg.marshal)),
                )
                .collect();

            members.push(self.backend.trampoline(
                trampoline_name(callback, &method.name),
                params,
                self.backend.wire_type(ctx, &plan.ret),
                trampoline_body(self.backend, ctx, &plan, &registry)?,
            ));
        }

        let remove = self.backend.call(
            &format!("{registry}.remove"),
            &[CallArg::positional("callback_handle")],
        );
        members.push(self.backend.trampoline(
            free_trampoline_name(callback),
            vec![handle()],
            None,
            CodeBlock::builder().line(remove).build(),
        ));

        Ok(members)
    }

    /// Proxy type for a native-owned callback, plus the native declarations
    /// it calls through
    fn proxy(
        &self,
        ctx: &BindingContext<'_>,
        callback: &str,
    ) -> CodegenResult<(TypeSpec, Vec<MethodSpec>)> {
        let desc = ctx.ast.callback(callback).ok_or_else(|| {
            CodegenError::UnsupportedShape(format!("callback `{callback}` is not declared"))
        })?;

        let mut spec = TypeSpec::builder(TypeKind::Class, proxy_name(callback))
            .modifier(Modifier::Public)
            .modifier(Modifier::Final)
            .supertype(self.backend.host_type(&AstType::Callback(callback.into())))
            .constructor_modifier(Modifier::Internal)
            .property(
                FieldSpec::builder("native_handle", self.backend.handle_type())
                    .modifier(Modifier::Private)
                    .build(),
            )
            .doc(format!("`{callback}` implemented by native code."));
        for supertype in self.backend.proxy_supertypes() {
            spec = spec.supertype(supertype);
        }

        let mut natives = Vec::new();
        for method in &desc.methods {
            let plan = self.engine.native_call(method)?;
            let symbol = NativeSymbol::CallbackMethod {
                callback,
                method: &method.name,
            };
            let callee = self.backend.native_callee(ctx, symbol);
            let body = native_call_body(self.backend, ctx, &plan, &callee, &["native_handle"])?;

            spec = spec.method(
                MethodSpec::builder(self.backend.host_name(&method.name))
                    .modifier(Modifier::Public)
                    .modifier(Modifier::Override)
                    .params(host_params(self.backend, method))
                    .returns_opt(host_return(self.backend, &method.return_type))
                    .body(body)
                    .build(),
            );
            natives.extend(self.native_declaration(
                ctx,
                symbol,
                Modifier::Public,
                &plan,
                Some("handle"),
            ));
        }

        let free = NativeSymbol::CallbackFree(callback);
        let free_call = self.backend.call(
            &self.backend.native_callee(ctx, free),
            &[CallArg::positional("native_handle")],
        );
        spec = spec.members(self.backend.proxy_release(&free_call));

        natives.extend(self.backend.native_declaration(
            self.backend.native_name(ctx, free),
            Modifier::Public,
            vec![ParamSpec::new("handle", self.backend.handle_type())],
            None,
        ));

        Ok((spec.build(), natives))
    }
}
