use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Entity '{0}' is not registered in the metadata catalog")]
    UnknownEntity(String),

    #[error("Entity '{entity}' has no property '{property}' in its metadata")]
    UnknownProperty { entity: String, property: String },

    #[error("Failed to parse entity metadata: {0}")]
    MetadataLoad(#[from] serde_yaml::Error),
}
