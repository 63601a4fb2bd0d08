use crate::backend::Backend;
use crate::model::{FieldSpec, Modifier, TypeKind, TypeSpec};
use rsbind_ir::StructDesc;

/// Generates one serializable record per native struct.
///
/// Field names are kept verbatim so that the host encoder produces the
/// same JSON keys the native side expects.
pub struct StructGenerator<'a> {
    backend: &'a dyn Backend,
}

impl<'a> StructGenerator<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    pub fn generate(&self, desc: &StructDesc) -> TypeSpec {
        let spec = TypeSpec::builder(TypeKind::Record, desc.name.as_str())
            .modifier(Modifier::Public)
            .constructor_modifier(Modifier::Public);

        let spec = desc
            .fields
            .iter()
            .filter(|field| !field.ty.is_void())
            .fold(spec, |spec, field| {
                spec.property(
                    FieldSpec::builder(field.name.as_str(), self.backend.host_type(&field.ty))
                        .modifier(Modifier::Public)
                        .build(),
                )
            });

        self.backend.serializable(spec).build()
    }
}
