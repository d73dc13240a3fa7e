#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate method {name}{descriptor} in {class}")]
    DuplicateMethod {
        class: String,
        name: String,
        descriptor: String,
    },
    #[error("duplicate attribute {name} in {class}")]
    DuplicateAttribute { class: String, name: String },
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
