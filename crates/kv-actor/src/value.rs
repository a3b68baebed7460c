use std::collections::HashMap;

/// A value stored under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}
