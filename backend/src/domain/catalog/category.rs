//! Product category entity and the two-level navigation tree.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{CatalogValidationError, ensure_non_negative, validate_slug, validate_text};

/// Input payload for [`Category::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    /// Primary key.
    pub id: Uuid,
    /// URL slug, e.g. `brake-discs`.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Parent category, absent for root sections.
    pub parent_id: Option<Uuid>,
    /// Ordering weight within the parent.
    pub position: i32,
}

/// A catalog category. Categories form a two-level tree: root sections
/// (braking, filters, suspension, …) and their leaf categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    id: Uuid,
    slug: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<Uuid>,
    position: i32,
}

impl Category {
    /// Validate and construct a category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogValidationError`] for invalid slug, name, or
    /// position.
    pub fn new(draft: CategoryDraft) -> Result<Self, CatalogValidationError> {
        Self::try_from(draft)
    }

    /// Primary key.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// URL slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Parent category id, absent for roots.
    #[must_use]
    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    /// Ordering weight within the parent.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }

    /// `true` for root sections.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl TryFrom<CategoryDraft> for Category {
    type Error = CatalogValidationError;

    fn try_from(draft: CategoryDraft) -> Result<Self, Self::Error> {
        Ok(Self {
            id: draft.id,
            slug: validate_slug(draft.slug, "category.slug")?,
            name: validate_text(draft.name, "category.name")?,
            parent_id: draft.parent_id,
            position: ensure_non_negative(draft.position, "category.position")?,
        })
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        CategoryDraft::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

/// A root section with its child categories, ready for navigation rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    /// The root section.
    pub section: Category,
    /// Leaf categories under the section, in position order.
    pub children: Vec<Category>,
}

/// Assemble the navigation tree from a flat category list.
///
/// Roots and children are each ordered by `(position, slug)`. Children whose
/// parent is missing from the input are dropped rather than surfaced as
/// phantom roots; the persistence layer's foreign keys make that case a data
/// bug, not a user error.
#[must_use]
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let (roots, children): (Vec<Category>, Vec<Category>) =
        categories.into_iter().partition(Category::is_root);

    let mut nodes: Vec<CategoryNode> = roots
        .into_iter()
        .map(|section| CategoryNode {
            section,
            children: Vec::new(),
        })
        .collect();
    nodes.sort_by(|a, b| {
        (a.section.position(), a.section.slug()).cmp(&(b.section.position(), b.section.slug()))
    });

    for child in children {
        if let Some(node) = nodes
            .iter_mut()
            .find(|node| Some(node.section.id()) == child.parent_id())
        {
            node.children.push(child);
        }
    }
    for node in &mut nodes {
        node.children
            .sort_by(|a, b| (a.position(), a.slug()).cmp(&(b.position(), b.slug())));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(slug: &str, parent_id: Option<Uuid>, position: i32) -> Category {
        Category::new(CategoryDraft {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            name: slug.to_uppercase(),
            parent_id,
            position,
        })
        .expect("valid category fixture")
    }

    #[test]
    fn tree_groups_children_under_their_sections() {
        let braking = category("braking", None, 0);
        let filters = category("filters", None, 1);
        let discs = category("brake-discs", Some(braking.id()), 1);
        let pads = category("brake-pads", Some(braking.id()), 0);
        let oil = category("oil-filters", Some(filters.id()), 0);

        let tree = build_category_tree(vec![oil, discs, filters, pads, braking]);

        let slugs: Vec<&str> = tree.iter().map(|node| node.section.slug()).collect();
        assert_eq!(slugs, vec!["braking", "filters"]);
        let braking_children: Vec<&str> = tree
            .first()
            .map(|node| node.children.iter().map(Category::slug).collect())
            .unwrap_or_default();
        assert_eq!(braking_children, vec!["brake-pads", "brake-discs"]);
    }

    #[test]
    fn orphaned_children_are_dropped() {
        let orphan = category("loose-leaf", Some(Uuid::new_v4()), 0);
        let tree = build_category_tree(vec![orphan]);
        assert!(tree.is_empty());
    }

    #[test]
    fn rejects_negative_position() {
        let error = Category::new(CategoryDraft {
            id: Uuid::new_v4(),
            slug: "braking".to_owned(),
            name: "Braking".to_owned(),
            parent_id: None,
            position: -1,
        })
        .expect_err("negative position should be rejected");
        assert!(matches!(error, CatalogValidationError::OutOfRange { .. }));
    }
}
