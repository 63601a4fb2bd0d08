use super::{host_params, host_return};
use crate::backend::Backend;
use crate::model::{MethodSpec, Modifier, TypeKind, TypeSpec};
use rsbind_ir::TraitDesc;

/// Generates the host interface for a callback trait
pub struct CallbackGenerator<'a> {
    backend: &'a dyn Backend,
}

impl<'a> CallbackGenerator<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn generate(&self, desc: &TraitDesc) -> TypeSpec {
        let methods = desc.methods.iter().map(|method| {
            MethodSpec::builder(self.backend.host_name(&method.name))
                .params(host_params(self.backend, method))
                .returns_opt(host_return(self.backend, &method.return_type))
                .build()
        });

        methods
            .fold(
                TypeSpec::builder(TypeKind::Interface, desc.name.as_str())
                    .modifier(Modifier::Public)
                    .doc(format!(
                        "Implemented by the host, invoked from `{}::{}`.",
                        desc.crate_name, desc.module
                    )),
                |spec, method| spec.method(method),
            )
            .build()
    }
}
