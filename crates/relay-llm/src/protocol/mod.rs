//! Wire format types for upstream endpoints

pub mod openai;
