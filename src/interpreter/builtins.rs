//! Host-provided callables, registered into an environment by the host.

use crate::interpreter::environment::Env;
use crate::interpreter::object::Object;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Self::Len => "len",
        }
    }

    pub(crate) fn call(self, arguments: Vec<Object>) -> Object {
        match self {
            Self::Len => builtin_len(arguments),
        }
    }
}

fn builtin_len(arguments: Vec<Object>) -> Object {
    if arguments.len() != 1 {
        return Object::Error(format!(
            "Wrong number of arguments. Expected 1, got {}.",
            arguments.len()
        ));
    }
    match &arguments[0] {
        Object::String(value) => Object::Integer(value.len() as i64),
        Object::Array(items) => Object::Integer(items.len() as i64),
        other => Object::Error(format!(
            "Type builtin function \"len\" expects a string or array, got {}.",
            other.type_name()
        )),
    }
}

/// Registers every builtin under its name; called once per top-level
/// environment by the host.
pub fn inject_builtin_functions(environment: &Env) {
    for builtin in [Builtin::Len] {
        environment
            .borrow_mut()
            .declare(builtin.name(), Object::Builtin(builtin));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::environment::Environment;

    #[test]
    fn injection_binds_len() {
        let environment = Environment::new(None);
        inject_builtin_functions(&environment);
        let object = environment.borrow().get("len");
        assert!(matches!(object, Some(Object::Builtin(Builtin::Len))));
    }

    #[test]
    fn len_measures_strings_in_bytes_and_arrays_in_items() {
        let of_string = Builtin::Len.call(vec![Object::String("Hello, World!".to_string())]);
        assert_eq!(of_string.inspect(), "13");

        let of_array = Builtin::Len.call(vec![Object::Array(vec![
            Object::Integer(1),
            Object::Null,
        ])]);
        assert_eq!(of_array.inspect(), "2");
    }

    #[test]
    fn len_rejects_other_types_and_arities() {
        let wrong_type = Builtin::Len.call(vec![Object::Integer(2)]);
        assert_eq!(
            wrong_type.inspect(),
            "Type builtin function \"len\" expects a string or array, got integer."
        );

        let wrong_arity = Builtin::Len.call(vec![]);
        assert_eq!(
            wrong_arity.inspect(),
            "Wrong number of arguments. Expected 1, got 0."
        );
    }
}
