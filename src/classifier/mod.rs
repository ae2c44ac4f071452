/// Built-in function registry and function-call classification.
pub mod function_registry;
