//! Tree-walking evaluator.
//!
//! Walks the syntax tree against a lexically-scoped environment and yields
//! tagged runtime objects. `return` travels as a [`Object::ReturnValue`]
//! wrapper that compounds propagate untouched and function application
//! unwraps; errors are plain values that operators refuse through their own
//! type checks.

use std::rc::Rc;

use crate::parser::ast::{
    Compound, Expression, Identifier, InfixOperator, PrefixOperator, Statement,
};

mod builtins;
mod environment;
mod object;

pub use builtins::{Builtin, inject_builtin_functions};
pub use environment::{Env, Environment};
pub use object::{Function, Object};

/// Evaluates a program root against the given environment.
pub fn eval(environment: &Env, compound: &Compound) -> Object {
    eval_compound(environment, compound)
}

fn eval_compound(environment: &Env, compound: &Compound) -> Object {
    let mut last = Object::Null;
    for statement in &compound.statements {
        last = eval_statement(environment, statement);
        if matches!(last, Object::ReturnValue(_)) {
            return last;
        }
    }
    last
}

fn eval_statement(environment: &Env, statement: &Statement) -> Object {
    match statement {
        Statement::Expression { expression, .. } => eval_expression(environment, expression),
        Statement::Let {
            identifier, value, ..
        } => eval_let_statement(environment, identifier, value.as_ref()),
        Statement::Return { value, .. } => {
            let inner = match value {
                Some(expression) => eval_expression(environment, expression),
                None => Object::Null,
            };
            Object::ReturnValue(Box::new(inner))
        }
    }
}

fn eval_let_statement(
    environment: &Env,
    identifier: &Identifier,
    value: Option<&Expression>,
) -> Object {
    if environment.borrow().contains(&identifier.name) {
        return error_already_declared(&identifier.name);
    }
    let object = match value {
        Some(expression) => eval_expression(environment, expression),
        None => Object::Null,
    };
    environment.borrow_mut().declare(&identifier.name, object);
    Object::Null
}

fn eval_expression(environment: &Env, expression: &Expression) -> Object {
    match expression {
        Expression::Integer { value, .. } => Object::Integer(*value),
        Expression::Boolean { value, .. } => Object::Boolean(*value),
        Expression::String { value, .. } => Object::String(value.clone()),
        Expression::Identifier(identifier) => eval_identifier(environment, identifier),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(environment, right);
            eval_prefix_operation(*operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(environment, left);
            let right = eval_expression(environment, right);
            eval_infix_operation(left, *operator, right)
        }
        Expression::Array { items, .. } => Object::Array(eval_expressions(environment, items)),
        Expression::Hash { pairs, .. } => eval_hash_literal(environment, pairs),
        Expression::Index { left, index, .. } => eval_index_expression(environment, left, index),
        Expression::FunctionDefinition {
            parameters, body, ..
        } => eval_function_definition(environment, parameters, body),
        Expression::FunctionCall {
            function,
            arguments,
            ..
        } => eval_function_call(environment, function, arguments),
        Expression::IfElse {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            let condition = eval_expression(environment, condition);
            if condition.truthiness() {
                eval_compound(environment, then_branch)
            } else if let Some(else_branch) = else_branch {
                eval_compound(environment, else_branch)
            } else {
                Object::Null
            }
        }
        Expression::Invalid { .. } => Object::Error("Expected expression.".to_string()),
    }
}

fn eval_expressions(environment: &Env, expressions: &[Expression]) -> Vec<Object> {
    expressions
        .iter()
        .map(|expression| eval_expression(environment, expression))
        .collect()
}

fn eval_identifier(environment: &Env, identifier: &Identifier) -> Object {
    match environment.borrow().get(&identifier.name) {
        Some(object) => object,
        None => Object::Error(format!("Identifier not found: \"{}\".", identifier.name)),
    }
}

fn eval_prefix_operation(operator: PrefixOperator, right: Object) -> Object {
    match operator {
        PrefixOperator::Not => Object::Boolean(!right.truthiness()),
        PrefixOperator::Negate => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            right => Object::Error(format!("Type mismatch: -{}.", right.type_name())),
        },
    }
}

fn eval_infix_operation(left: Object, operator: InfixOperator, right: Object) -> Object {
    match operator {
        InfixOperator::Plus => eval_addition(left, right),
        InfixOperator::Equals | InfixOperator::NotEquals => eval_equality(left, operator, right),
        _ => eval_integer_operation(left, operator, right),
    }
}

fn eval_addition(left: Object, right: Object) -> Object {
    match (left, right) {
        (Object::String(left), Object::String(right)) => Object::String(left + &right),
        (Object::Integer(left), Object::Integer(right)) => {
            Object::Integer(left.wrapping_add(right))
        }
        (left, right) => {
            if left.type_name() != right.type_name() {
                error_infix_type_mismatch(&left, InfixOperator::Plus, &right)
            } else {
                error_unknown_infix_operator(&left, InfixOperator::Plus, &right)
            }
        }
    }
}

fn eval_integer_operation(left: Object, operator: InfixOperator, right: Object) -> Object {
    let (Object::Integer(left_value), Object::Integer(right_value)) = (&left, &right) else {
        return error_infix_type_mismatch(&left, operator, &right);
    };
    let (left_value, right_value) = (*left_value, *right_value);
    match operator {
        InfixOperator::Minus => Object::Integer(left_value.wrapping_sub(right_value)),
        InfixOperator::Asterisk => Object::Integer(left_value.wrapping_mul(right_value)),
        InfixOperator::Slash => {
            if right_value == 0 {
                Object::Error("Division by zero.".to_string())
            } else {
                Object::Integer(left_value.wrapping_div(right_value))
            }
        }
        InfixOperator::Greater => Object::Boolean(left_value > right_value),
        InfixOperator::GreaterOrEquals => Object::Boolean(left_value >= right_value),
        InfixOperator::Less => Object::Boolean(left_value < right_value),
        InfixOperator::LessOrEquals => Object::Boolean(left_value <= right_value),
        _ => error_unknown_infix_operator(&left, operator, &right),
    }
}

fn eval_equality(left: Object, operator: InfixOperator, right: Object) -> Object {
    if left.type_name() != right.type_name() {
        return error_infix_type_mismatch(&left, operator, &right);
    }
    let equal = match (&left, &right) {
        (Object::Integer(left), Object::Integer(right)) => left == right,
        (Object::Boolean(left), Object::Boolean(right)) => left == right,
        _ => return error_unknown_infix_operator(&left, operator, &right),
    };
    match operator {
        InfixOperator::Equals => Object::Boolean(equal),
        _ => Object::Boolean(!equal),
    }
}

fn eval_hash_literal(environment: &Env, pairs: &[(Expression, Expression)]) -> Object {
    let mut keys = Vec::with_capacity(pairs.len());
    let mut values = Vec::with_capacity(pairs.len());
    for (key_expression, value_expression) in pairs {
        let key = eval_expression(environment, key_expression);
        if !is_valid_index(&key) {
            return error_unsupported_index(&key);
        }
        let value = eval_expression(environment, value_expression);
        // Duplicate keys are kept; lookup returns the first match.
        keys.push(key);
        values.push(value);
    }
    Object::Hash { keys, values }
}

fn eval_index_expression(environment: &Env, left: &Expression, index: &Expression) -> Object {
    let target = eval_expression(environment, left);
    let index = eval_expression(environment, index);
    if !is_valid_index(&index) {
        return error_unsupported_index(&index);
    }
    match target {
        Object::Array(items) => match index {
            Object::Integer(position) => {
                if position < 0 || position >= items.len() as i64 {
                    Object::Null
                } else {
                    items[position as usize].clone()
                }
            }
            index => error_unsupported_index(&index),
        },
        Object::Hash { keys, values } => {
            for (stored, value) in keys.iter().zip(&values) {
                if index_keys_equal(stored, &index) {
                    return value.clone();
                }
            }
            Object::Null
        }
        _ => Object::Error(format!("Expression \"{left}\" is not a indexable.")),
    }
}

fn is_valid_index(object: &Object) -> bool {
    matches!(
        object,
        Object::Integer(_) | Object::String(_) | Object::Boolean(_)
    )
}

fn index_keys_equal(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Integer(left), Object::Integer(right)) => left == right,
        (Object::Boolean(left), Object::Boolean(right)) => left == right,
        (Object::String(left), Object::String(right)) => left == right,
        _ => false,
    }
}

fn eval_function_definition(
    environment: &Env,
    parameters: &[Identifier],
    body: &Compound,
) -> Object {
    for parameter in parameters {
        if environment.borrow().contains(&parameter.name) {
            return error_already_declared(&parameter.name);
        }
    }
    Object::Function(Rc::new(Function {
        parameters: parameters.to_vec(),
        body: body.clone(),
        environment: Rc::clone(environment),
    }))
}

fn eval_function_call(
    environment: &Env,
    function: &Expression,
    arguments: &[Expression],
) -> Object {
    let callee = eval_expression(environment, function);
    match callee {
        Object::Builtin(builtin) => {
            let arguments = eval_expressions(environment, arguments);
            builtin.call(arguments)
        }
        Object::Function(callee) => {
            let arguments = eval_expressions(environment, arguments);
            apply_function(&callee, arguments)
        }
        _ => Object::Error(format!("Expression \"{function}\" is not a callable.")),
    }
}

fn apply_function(function: &Function, arguments: Vec<Object>) -> Object {
    if arguments.len() != function.parameters.len() {
        return Object::Error(format!(
            "Wrong number of arguments. Expected {}, got {}.",
            function.parameters.len(),
            arguments.len()
        ));
    }
    // The call environment descends from the environment captured at
    // definition time, never from the caller's.
    let local = Environment::new(Some(Rc::clone(&function.environment)));
    for (parameter, argument) in function.parameters.iter().zip(arguments) {
        local.borrow_mut().declare(&parameter.name, argument);
    }
    match eval_compound(&local, &function.body) {
        Object::ReturnValue(inner) => *inner,
        object => object,
    }
}

fn error_already_declared(name: &str) -> Object {
    Object::Error(format!(
        "Identifier already declared in this scope: \"{name}\"."
    ))
}

fn error_infix_type_mismatch(left: &Object, operator: InfixOperator, right: &Object) -> Object {
    Object::Error(format!(
        "Type mismatch: {} {operator} {}.",
        left.type_name(),
        right.type_name()
    ))
}

fn error_unknown_infix_operator(left: &Object, operator: InfixOperator, right: &Object) -> Object {
    Object::Error(format!(
        "Unknown operator: {} {operator} {}.",
        left.type_name(),
        right.type_name()
    ))
}

fn error_unsupported_index(object: &Object) -> Object {
    Object::Error(format!(
        "Unsupported index, must be of type integer, string, or boolean, got type {}.",
        object.type_name()
    ))
}
