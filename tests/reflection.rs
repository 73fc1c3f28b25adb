//! Integration tests for reflective field reads through `Field.get(Object)`.
//!
//! Every test goes through [`VirtualMachine::invoke`], the way the opcode loop reaches the
//! handler, and inspects the return register afterwards.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use dexscope::{emulation::platform_exception, prelude::*};

const LOCAL: &str = "Lside_effects_test;";

/// Counts `<clinit>` runs per class.
#[derive(Default)]
struct RecordingInitializer {
    runs: Mutex<HashMap<TypeDescriptor, usize>>,
}

impl RecordingInitializer {
    fn runs(&self, class: &str) -> usize {
        self.runs
            .lock()
            .unwrap()
            .get(&TypeDescriptor::class(class))
            .copied()
            .unwrap_or(0)
    }
}

impl ClassInitializer for RecordingInitializer {
    fn initialize(
        &self,
        class: &TypeDescriptor,
        statics: &StaticFieldStore,
        context: &mut ExecutionContext,
    ) -> Result<()> {
        *self.runs.lock().unwrap().entry(class.clone()).or_insert(0) += 1;
        // <clinit> overwrites the declared initial value of `computed`.
        if class == &TypeDescriptor::class(LOCAL) {
            statics.put_field(
                context,
                &FieldId::parse("Lside_effects_test;->computed:I")?,
                Value::int(42),
            )?;
        }
        Ok(())
    }
}

fn registry() -> Arc<ClassRegistry> {
    let int = TypeDescriptor::int;
    Arc::new(
        ClassRegistry::from_definitions(vec![ClassDef::new(TypeDescriptor::class(LOCAL))
            .static_field("F", int(), AccessFlags::PUBLIC, Value::int(1))
            .static_field("P", int(), AccessFlags::PRIVATE, Value::int(2))
            .static_field("computed", int(), AccessFlags::PUBLIC, Value::int(0))
            .field("i", int(), AccessFlags::PUBLIC)
            .field("secret", int(), AccessFlags::PRIVATE)])
        .unwrap(),
    )
}

fn platform() -> ReflectionTable {
    let describe =
        |reference: &str, flags| FieldDescriptor::new(FieldId::parse(reference).unwrap(), flags);

    ReflectionTable::new()
        .with_static_field(
            describe(
                "Ljava/lang/Integer;->MAX_VALUE:I",
                AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
            ),
            Value::int(i32::MAX),
        )
        .with_static_field(
            describe(
                "Landroid/os/Build;->MODEL:Ljava/lang/String;",
                AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
            ),
            Value::string("Pixel"),
        )
        .with_field(describe(
            "Ljava/lang/Integer;->value:I",
            AccessFlags::PRIVATE | AccessFlags::FINAL,
        ))
        .with_field(describe(
            "Ljava/lang/System;->lineSeparator:Ljava/lang/String;",
            AccessFlags::PRIVATE | AccessFlags::STATIC,
        ))
}

fn machine(config: VmConfig) -> (VirtualMachine, Arc<RecordingInitializer>) {
    let initializer = Arc::new(RecordingInitializer::default());
    let vm = VirtualMachine::builder(registry())
        .config(config)
        .initializer(initializer.clone())
        .reflection(Arc::new(platform()))
        .build();
    (vm, initializer)
}

fn handle(reference: &str) -> Value {
    let id = FieldId::parse(reference).unwrap();
    if id.defining_class() == &TypeDescriptor::class(LOCAL) {
        Value::field_handle(Arc::new(LocalFieldHandle::new(id)))
    } else {
        Value::field_handle(Arc::new(OpaqueFieldHandle::new(id)))
    }
}

fn null() -> Value {
    Value::null(TypeDescriptor::object()).unwrap()
}

fn context(vm: &VirtualMachine, reference: &str, instance: Value) -> ExecutionContext {
    vm.new_context(RegisterFile::with_parameters(vec![handle(reference), instance]))
}

/// Calls `Field.get` on a fresh argument window of `ctx`, keeping its lineage state.
fn get(
    vm: &VirtualMachine,
    ctx: &mut ExecutionContext,
    reference: &str,
    instance: Value,
) -> InvokeOutcome {
    *ctx.registers_mut() = RegisterFile::with_parameters(vec![handle(reference), instance]);
    vm.invoke(reflect::FIELD_GET, ctx).unwrap()
}

fn returned(ctx: &ExecutionContext) -> &Value {
    ctx.registers().read_return_register().unwrap()
}

#[test]
fn test_public_static_local_field() {
    let (vm, init) = machine(VmConfig::default());
    let mut ctx = context(&vm, "Lside_effects_test;->F:I", null());

    let outcome = vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
    assert_eq!(outcome, InvokeOutcome::Completed);

    let value = returned(&ctx);
    assert_eq!(value.declared_type(), &TypeDescriptor::object());
    assert_eq!(value.unboxed(), &Value::int(1));
    assert_eq!(value.unboxed().to_string(), "Known(1, I)");
    assert!(ctx.is_class_initialized(&TypeDescriptor::class(LOCAL)));
    assert_eq!(init.runs(LOCAL), 1);
}

#[test]
fn test_private_static_local_field_denied() {
    let (vm, _) = machine(VmConfig::default());
    let mut ctx = context(&vm, "Lside_effects_test;->P:I", null());

    let outcome = vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
    match outcome {
        InvokeOutcome::Threw {
            exception_class,
            condition,
        } => {
            assert_eq!(exception_class, platform_exception::ILLEGAL_ACCESS);
            assert_eq!(
                condition,
                EmulationError::AccessDenied {
                    field: FieldId::parse("Lside_effects_test;->P:I").unwrap(),
                    visibility: Visibility::Private,
                }
            );
        }
        other => panic!("expected IllegalAccessException, got {other:?}"),
    }
    assert_eq!(returned(&ctx), &Value::unknown(TypeDescriptor::object()));
}

#[test]
fn test_public_instance_field_of_symbolic_instance() {
    let (vm, _) = machine(VmConfig::default());
    let symbolic = Value::unknown(TypeDescriptor::class(LOCAL));
    let mut ctx = context(&vm, "Lside_effects_test;->i:I", symbolic);

    let outcome = vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
    assert_eq!(outcome, InvokeOutcome::Completed);
    assert_eq!(returned(&ctx), &Value::unknown(TypeDescriptor::object()));
}

#[test]
fn test_public_instance_field_of_concrete_instance() {
    let (vm, _) = machine(VmConfig::default());
    let field = FieldId::parse("Lside_effects_test;->i:I").unwrap();
    let object = Instance::new(TypeDescriptor::class(LOCAL)).with_field(field, Value::int(7));
    let mut ctx = context(&vm, "Lside_effects_test;->i:I", Value::object(object));

    vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
    assert_eq!(returned(&ctx).unboxed(), &Value::int(7));

    // Field state the instance model never recorded is unknown.
    let mut ctx = context(
        &vm,
        "Lside_effects_test;->i:I",
        Value::object(Instance::new(TypeDescriptor::class(LOCAL))),
    );
    vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
    assert_eq!(returned(&ctx), &Value::unknown(TypeDescriptor::object()));
}

#[test]
fn test_non_local_public_static_initialized_once_per_lineage() {
    let (vm, _) = machine(VmConfig::default());
    let mut ctx = context(&vm, "Ljava/lang/Integer;->MAX_VALUE:I", null());

    for _ in 0..3 {
        let outcome = get(&vm, &mut ctx, "Ljava/lang/Integer;->MAX_VALUE:I", null());
        assert_eq!(outcome, InvokeOutcome::Completed);

        let value = returned(&ctx);
        assert_eq!(value.declared_type(), &TypeDescriptor::object());
        assert_eq!(value.unboxed().declared_type(), &TypeDescriptor::int());
        assert_eq!(value.unboxed().as_int(), Some(i32::MAX));
    }

    let integer = TypeDescriptor::class("Ljava/lang/Integer;");
    assert_eq!(
        ctx.initialized_classes()
            .into_iter()
            .filter(|c| *c == integer)
            .count(),
        1
    );

    get(&vm, &mut ctx, "Landroid/os/Build;->MODEL:Ljava/lang/String;", null());
    assert_eq!(returned(&ctx).unboxed().as_str(), Some("Pixel"));
    assert_eq!(
        returned(&ctx).unboxed().declared_type(),
        &TypeDescriptor::string()
    );
}

#[test]
fn test_private_fields_denied_everywhere() {
    let (vm, _) = machine(VmConfig::default());
    let local = Value::object(Instance::new(TypeDescriptor::class(LOCAL)));
    let boxed = Value::object(Instance::new(TypeDescriptor::class("Ljava/lang/Integer;")));

    let cases = [
        ("Lside_effects_test;->P:I", null()),
        ("Lside_effects_test;->secret:I", local),
        ("Ljava/lang/Integer;->value:I", boxed),
        ("Ljava/lang/System;->lineSeparator:Ljava/lang/String;", null()),
    ];

    for (reference, instance) in cases {
        let mut ctx = context(&vm, reference, instance);
        let outcome = vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap();
        assert!(
            matches!(
                outcome,
                InvokeOutcome::Threw {
                    condition: EmulationError::AccessDenied { .. },
                    ..
                }
            ),
            "{reference}: {outcome:?}"
        );
        assert_eq!(returned(&ctx), &Value::unknown(TypeDescriptor::object()));
    }
}

#[test]
fn test_local_static_initializes_once() {
    let (vm, init) = machine(VmConfig::default());
    let mut ctx = context(&vm, "Lside_effects_test;->computed:I", null());

    get(&vm, &mut ctx, "Lside_effects_test;->computed:I", null());
    assert_eq!(returned(&ctx).unboxed(), &Value::int(42));
    assert_eq!(init.runs(LOCAL), 1);

    get(&vm, &mut ctx, "Lside_effects_test;->computed:I", null());
    get(&vm, &mut ctx, "Lside_effects_test;->F:I", null());
    assert_eq!(init.runs(LOCAL), 1);
}

#[test]
fn test_init_order() {
    let private = "Lside_effects_test;->P:I";
    let class = TypeDescriptor::class(LOCAL);

    let (vm, init) = machine(VmConfig::default());
    let mut ctx = context(&vm, private, null());
    assert!(vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap().is_throw());
    assert!(ctx.is_class_initialized(&class));
    assert_eq!(init.runs(LOCAL), 1);

    let (vm, init) = machine(VmConfig::strict_jdk());
    let mut ctx = context(&vm, private, null());
    assert!(vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap().is_throw());
    assert!(!ctx.is_class_initialized(&class));
    assert_eq!(init.runs(LOCAL), 0);
}

#[test]
fn test_platform_exceptions() {
    let (vm, _) = machine(VmConfig::default());

    let cases = [
        ("Lside_effects_test;->missing:I", null(), platform_exception::NO_SUCH_FIELD),
        ("Ljava/lang/Integer;->missing:I", null(), platform_exception::NO_SUCH_FIELD),
        ("Lside_effects_test;->i:I", null(), platform_exception::NULL_POINTER),
        (
            "Lside_effects_test;->i:I",
            Value::string("not an instance"),
            platform_exception::ILLEGAL_ARGUMENT,
        ),
    ];

    for (reference, instance, expected) in cases {
        let mut ctx = context(&vm, reference, instance);
        match vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap() {
            InvokeOutcome::Threw {
                exception_class, ..
            } => assert_eq!(exception_class, expected, "{reference}"),
            other => panic!("{reference}: expected {expected}, got {other:?}"),
        }
        assert!(returned(&ctx).is_unknown());
    }
}

#[test]
fn test_malformed_receiver_is_an_error() {
    let (vm, _) = machine(VmConfig::default());
    let mut ctx = vm.new_context(RegisterFile::with_parameters(vec![Value::int(3), null()]));

    let err = vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap_err();
    assert!(matches!(
        err.emulation(),
        Some(EmulationError::UnexpectedParameter { index: 0, .. })
    ));
}

#[test]
fn test_outer_type_is_always_object() {
    let (vm, _) = machine(VmConfig::default());
    let object = Value::object(Instance::new(TypeDescriptor::class(LOCAL)));

    let reads = [
        ("Lside_effects_test;->F:I", null()),
        ("Lside_effects_test;->i:I", object),
        ("Ljava/lang/Integer;->MAX_VALUE:I", null()),
        ("Landroid/os/Build;->MODEL:Ljava/lang/String;", null()),
        ("Lside_effects_test;->i:I", Value::unknown(TypeDescriptor::class(LOCAL))),
    ];

    for (reference, instance) in reads {
        let mut ctx = context(&vm, reference, instance);
        assert_eq!(
            vm.invoke(reflect::FIELD_GET, &mut ctx).unwrap(),
            InvokeOutcome::Completed
        );
        assert_eq!(
            returned(&ctx).declared_type(),
            &TypeDescriptor::object(),
            "{reference}"
        );
    }
}

#[test]
fn test_companion_handlers() {
    let (vm, _) = machine(VmConfig::default());

    let mut ctx = vm.new_context(RegisterFile::with_parameters(vec![handle(
        "Ljava/lang/Integer;->MAX_VALUE:I",
    )]));
    assert_eq!(
        vm.invoke(reflect::FIELD_GET_NAME, &mut ctx).unwrap(),
        InvokeOutcome::Completed
    );
    assert_eq!(returned(&ctx).as_str(), Some("MAX_VALUE"));

    assert_eq!(
        vm.invoke(reflect::FIELD_GET_MODIFIERS, &mut ctx).unwrap(),
        InvokeOutcome::Completed
    );
    // public static final
    assert_eq!(returned(&ctx).as_int(), Some(0x19));
}

#[test]
fn test_not_emulated() {
    let (vm, _) = machine(VmConfig::default());
    let mut ctx = vm.new_context(RegisterFile::default());
    assert_eq!(
        vm.invoke("Ljava/lang/System;->nanoTime()J", &mut ctx).unwrap(),
        InvokeOutcome::NotEmulated
    );
}
