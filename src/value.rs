#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    String(String),
    None,
}
