use ps_core::{Article, ArticleNode, Author, Category, NodeAuthor, NodeCategory};
use crate::flatten::flatten_content;

/// Maps an API article onto the `Article` node shape.
pub fn transform_article(article: Article) -> ArticleNode {
    let body = flatten_content(&article.content);
    ArticleNode {
        id: article.id,
        slug: article.slug,
        title: article.title,
        body,
        authors: article.authors.into_iter().map(transform_author).collect(),
        categories: article.categories.into_iter().map(transform_category).collect(),
        updated: article.changed_on,
    }
}

pub fn transform_articles(articles: Vec<Article>) -> Vec<ArticleNode> {
    articles.into_iter().map(transform_article).collect()
}

fn transform_author(author: Author) -> NodeAuthor {
    NodeAuthor {
        id: author.id,
        name: author.full_name,
        bio: author.bio,
    }
}

fn transform_category(category: Category) -> NodeCategory {
    NodeCategory {
        id: category.id,
        slug: category.slug,
        title: category.body,
    }
}
