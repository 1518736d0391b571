//! Loadable migration script resources
//!
//! Discovery and loading of scripts from filesystem, classpath-style bundles
//! or the network belongs to external providers; the engine only consumes
//! this narrow interface.

use async_trait::async_trait;

use crate::error::CoreResult;

/// A migration script whose content can be loaded on demand
#[async_trait]
pub trait LoadableResource: Send + Sync + std::fmt::Debug {
    /// File name of the resource, without any directory component
    fn filename(&self) -> String;

    /// Physical location used in diagnostics
    fn absolute_path(&self) -> String;

    /// Load the full script content
    async fn load_as_string(&self) -> CoreResult<String>;
}

/// In-memory resource for programmatic migrations and tests
#[derive(Debug, Clone)]
pub struct StringResource {
    name: String,
    content: String,
}

impl StringResource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl LoadableResource for StringResource {
    fn filename(&self) -> String {
        self.name.clone()
    }

    fn absolute_path(&self) -> String {
        format!("<memory>/{}", self.name)
    }

    async fn load_as_string(&self) -> CoreResult<String> {
        Ok(self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_string_resource_roundtrip() {
        let resource = StringResource::new("V1__init.sql", "CREATE TABLE users (id INT);");
        assert_eq!(resource.filename(), "V1__init.sql");
        assert_eq!(resource.absolute_path(), "<memory>/V1__init.sql");
        assert_eq!(
            resource.load_as_string().await.unwrap(),
            "CREATE TABLE users (id INT);"
        );
    }
}
