pub mod field;
pub mod visibility;

pub use field::{
    FieldOption, FieldSchema, FieldType, RuleValue, ValidationRules, find_field,
};
pub use visibility::{Condition, Logic, Operator, VisibilityRule};
