#![no_main]

use autowire_di::{
    Arguments, BindingSpec, Container, ParameterDescriptor, Signature, TypeDescriptor, TypeTable,
    VariantSpec,
};
use libfuzzer_sys::fuzz_target;

const TYPES: [&str; 4] = ["A", "B", "C", "D"];

// Each byte pair wires one constructor parameter or binding; cycles and
// missing bindings must come back as errors, never as panics or overflows.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut table = TypeTable::new().with(TypeDescriptor::interface("IAny"));
    for (i, name) in TYPES.iter().enumerate() {
        let mut signature = Signature::new();
        for pair in data.chunks(2).filter(|p| p.len() == 2 && p[0] as usize % TYPES.len() == i) {
            let target = if pair[1] % 5 == 4 { "IAny" } else { TYPES[pair[1] as usize % TYPES.len()] };
            let mut parameter = ParameterDescriptor::typed(format!("p{}", signature.parameters.len()), target);
            if pair[1] & 0x80 != 0 {
                parameter = parameter.optional();
            }
            signature = signature.param(parameter);
        }
        table.register(
            TypeDescriptor::concrete(*name)
                .implements("IAny")
                .constructor(signature, |_: &Arguments| Ok(())),
        );
    }

    let container = Container::new(table);
    let target = TYPES[data[0] as usize % TYPES.len()];
    let spec = if data[1] & 1 == 0 {
        BindingSpec::from(VariantSpec::new(target).singleton())
    } else {
        BindingSpec::tagged([("x", "A"), ("y", target)])
    };
    container.bind("IAny", spec);

    for name in TYPES {
        let _ = container.instantiate(name);
    }
    let _ = container.instantiate("IAny");
});
