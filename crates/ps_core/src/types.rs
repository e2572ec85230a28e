use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` like a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An article as returned by the Prepr `Articles` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_slug")]
    pub slug: String,
    #[serde(rename = "_changed_on")]
    pub changed_on: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Author>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_slug")]
    pub slug: String,
    /// The category title.
    pub body: String,
}

/// One unit of an article body, discriminated by the GraphQL `__typename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum ContentBlock {
    Assets {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        items: Option<Vec<Asset>>,
    },
    CodeBlock {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        format: Option<String>,
    },
    Text {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        body: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "_type", default)]
    pub asset_type: Option<String>,
}

/// The normalized `Article` node persisted by the content engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleNode {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub authors: Vec<NodeAuthor>,
    pub categories: Vec<NodeCategory>,
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAuthor {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCategory {
    pub id: String,
    pub slug: String,
    pub title: String,
}
