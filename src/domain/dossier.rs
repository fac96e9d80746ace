//! The personal-information tree: categories own items, items own details.
//!
//! Every operation here takes the current list of categories and returns a rewritten
//! list. Removing a node drops its whole subtree in the same rewrite.

use super::{new_id, require_text};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalSubItem {
    pub id: String,
    pub heading: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sub_items: Vec<PersonalSubItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<PersonalItem>,
}

impl PersonalCategory {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            name: require_text("name", name)?,
            items: Vec::new(),
        })
    }

    /// Number of entities in this subtree, the category included
    pub fn node_count(&self) -> usize {
        1 + self
            .items
            .iter()
            .map(|item| 1 + item.sub_items.len())
            .sum::<usize>()
    }
}

impl PersonalItem {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            name: require_text("name", name)?,
            sub_items: Vec::new(),
        })
    }
}

impl PersonalSubItem {
    pub fn new(heading: &str, value: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: new_id(),
            heading: require_text("heading", heading)?,
            value: require_text("value", value)?,
        })
    }
}

/// Address of a node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePath<'a> {
    Category(&'a str),
    Item { category: &'a str, item: &'a str },
    SubItem { category: &'a str, item: &'a str, sub_item: &'a str },
}

fn find_category<'a>(
    categories: &'a [PersonalCategory],
    id: &str,
) -> Result<&'a PersonalCategory, ValidationError> {
    categories
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ValidationError::unknown("category", id))
}

fn find_item<'a>(category: &'a PersonalCategory, id: &str) -> Result<&'a PersonalItem, ValidationError> {
    category
        .items
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| ValidationError::unknown("item", id))
}

/// Rewrite one category, leaving the others untouched
fn rewrite_category<F>(
    categories: &[PersonalCategory],
    id: &str,
    f: F,
) -> Result<Vec<PersonalCategory>, ValidationError>
where
    F: FnOnce(&PersonalCategory) -> Result<PersonalCategory, ValidationError>,
{
    let target = find_category(categories, id)?;
    let replacement = f(target)?;
    Ok(categories
        .iter()
        .map(|c| if c.id == id { replacement.clone() } else { c.clone() })
        .collect())
}

/// Rewrite one item inside one category
fn rewrite_item<F>(
    categories: &[PersonalCategory],
    category_id: &str,
    item_id: &str,
    f: F,
) -> Result<Vec<PersonalCategory>, ValidationError>
where
    F: FnOnce(&PersonalItem) -> Result<PersonalItem, ValidationError>,
{
    rewrite_category(categories, category_id, |category| {
        let target = find_item(category, item_id)?;
        let replacement = f(target)?;
        Ok(PersonalCategory {
            items: category
                .items
                .iter()
                .map(|i| if i.id == item_id { replacement.clone() } else { i.clone() })
                .collect(),
            ..category.clone()
        })
    })
}

pub fn add_category(categories: &[PersonalCategory], name: &str) -> Result<Vec<PersonalCategory>, ValidationError> {
    let mut next = categories.to_vec();
    next.push(PersonalCategory::new(name)?);
    Ok(next)
}

pub fn rename_category(
    categories: &[PersonalCategory],
    id: &str,
    name: &str,
) -> Result<Vec<PersonalCategory>, ValidationError> {
    let name = require_text("name", name)?;
    rewrite_category(categories, id, |c| {
        Ok(PersonalCategory {
            name,
            ..c.clone()
        })
    })
}

pub fn add_item(
    categories: &[PersonalCategory],
    category_id: &str,
    name: &str,
) -> Result<Vec<PersonalCategory>, ValidationError> {
    let item = PersonalItem::new(name)?;
    rewrite_category(categories, category_id, |c| {
        let mut items = c.items.clone();
        items.push(item);
        Ok(PersonalCategory { items, ..c.clone() })
    })
}

pub fn rename_item(
    categories: &[PersonalCategory],
    category_id: &str,
    item_id: &str,
    name: &str,
) -> Result<Vec<PersonalCategory>, ValidationError> {
    let name = require_text("name", name)?;
    rewrite_item(categories, category_id, item_id, |i| {
        Ok(PersonalItem { name, ..i.clone() })
    })
}

pub fn add_sub_item(
    categories: &[PersonalCategory],
    category_id: &str,
    item_id: &str,
    heading: &str,
    value: &str,
) -> Result<Vec<PersonalCategory>, ValidationError> {
    let sub_item = PersonalSubItem::new(heading, value)?;
    rewrite_item(categories, category_id, item_id, |i| {
        let mut sub_items = i.sub_items.clone();
        sub_items.push(sub_item);
        Ok(PersonalItem { sub_items, ..i.clone() })
    })
}

pub fn edit_sub_item(
    categories: &[PersonalCategory],
    category_id: &str,
    item_id: &str,
    sub_item_id: &str,
    heading: &str,
    value: &str,
) -> Result<Vec<PersonalCategory>, ValidationError> {
    let heading = require_text("heading", heading)?;
    let value = require_text("value", value)?;
    rewrite_item(categories, category_id, item_id, |i| {
        if !i.sub_items.iter().any(|s| s.id == sub_item_id) {
            return Err(ValidationError::unknown("detail", sub_item_id));
        }
        Ok(PersonalItem {
            sub_items: i
                .sub_items
                .iter()
                .map(|s| {
                    if s.id == sub_item_id {
                        PersonalSubItem {
                            id: s.id.clone(),
                            heading: heading.clone(),
                            value: value.clone(),
                        }
                    } else {
                        s.clone()
                    }
                })
                .collect(),
            ..i.clone()
        })
    })
}

/// Remove the node at `path` together with everything it owns
pub fn remove(categories: &[PersonalCategory], path: NodePath<'_>) -> Result<Vec<PersonalCategory>, ValidationError> {
    match path {
        NodePath::Category(id) => {
            find_category(categories, id)?;
            Ok(categories.iter().filter(|c| c.id != id).cloned().collect())
        }
        NodePath::Item { category, item } => rewrite_category(categories, category, |c| {
            find_item(c, item)?;
            Ok(PersonalCategory {
                items: c.items.iter().filter(|i| i.id != item).cloned().collect(),
                ..c.clone()
            })
        }),
        NodePath::SubItem {
            category,
            item,
            sub_item,
        } => rewrite_item(categories, category, item, |i| {
            if !i.sub_items.iter().any(|s| s.id == sub_item) {
                return Err(ValidationError::unknown("detail", sub_item));
            }
            Ok(PersonalItem {
                sub_items: i.sub_items.iter().filter(|s| s.id != sub_item).cloned().collect(),
                ..i.clone()
            })
        }),
    }
}

const CATEGORY_SEPARATOR: &str = "\n========================\n\n";

/// Plain-text rendering of the whole dossier, suitable for pasting elsewhere
pub fn export_text(categories: &[PersonalCategory]) -> String {
    categories
        .iter()
        .map(|cat| {
            let items = cat
                .items
                .iter()
                .map(|item| {
                    let details = item
                        .sub_items
                        .iter()
                        .map(|sub| format!("  {}: {}", sub.heading, sub.value))
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("[Item] {}\n{}", item.name, details)
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("### CATEGORY: {} ###\n{}\n", cat.name.to_uppercase(), items)
        })
        .collect::<Vec<_>>()
        .join(CATEGORY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// One category with `items` items of `subs` details each
    fn build_tree(items: usize, subs: usize) -> Vec<PersonalCategory> {
        let mut tree = add_category(&[], "Education").unwrap();
        let cat_id = tree[0].id.clone();
        for i in 0..items {
            tree = add_item(&tree, &cat_id, &format!("Degree {}", i)).unwrap();
            let item_id = tree[0].items[i].id.clone();
            for s in 0..subs {
                tree = add_sub_item(&tree, &cat_id, &item_id, &format!("Field {}", s), "value").unwrap();
            }
        }
        tree
    }

    fn count_nodes(tree: &[PersonalCategory]) -> usize {
        tree.iter().map(PersonalCategory::node_count).sum()
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let tree = build_tree(3, 0);
        let names: Vec<_> = tree[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Degree 0", "Degree 1", "Degree 2"]);
    }

    #[test]
    fn test_cascade_delete_category() {
        let mut tree = build_tree(3, 4);
        let keep = add_category(&[], "Work").unwrap().remove(0);
        tree.push(keep.clone());
        assert_eq!(count_nodes(&tree), 3 * 4 + 3 + 1 + 1);

        let doomed = tree[0].clone();
        let after = remove(&tree, NodePath::Category(&doomed.id)).unwrap();

        assert_eq!(count_nodes(&tree) - count_nodes(&after), 3 * 4 + 3 + 1);
        assert_eq!(after, vec![keep]);
        let item_ids: Vec<_> = doomed.items.iter().map(|i| i.id.clone()).collect();
        assert!(after
            .iter()
            .flat_map(|c| c.items.iter())
            .all(|i| !item_ids.contains(&i.id)));
    }

    #[test]
    fn test_cascade_delete_item() {
        let tree = build_tree(2, 3);
        let cat_id = tree[0].id.clone();
        let item_id = tree[0].items[0].id.clone();

        let after = remove(&tree, NodePath::Item { category: &cat_id, item: &item_id }).unwrap();
        assert_eq!(after[0].items.len(), 1);
        assert_eq!(after[0].items[0].name, "Degree 1");
        assert_eq!(count_nodes(&after), 1 + 1 + 3);
    }

    #[test]
    fn test_delete_sub_item() {
        let tree = build_tree(1, 2);
        let cat_id = tree[0].id.clone();
        let item_id = tree[0].items[0].id.clone();
        let sub_id = tree[0].items[0].sub_items[0].id.clone();

        let after = remove(
            &tree,
            NodePath::SubItem { category: &cat_id, item: &item_id, sub_item: &sub_id },
        )
        .unwrap();
        assert_eq!(after[0].items[0].sub_items.len(), 1);
        assert_eq!(after[0].items[0].sub_items[0].heading, "Field 1");
    }

    #[test]
    fn test_remove_unknown_node_is_rejected() {
        let tree = build_tree(1, 1);
        let err = remove(&tree, NodePath::Category("missing")).unwrap_err();
        assert_eq!(err, ValidationError::unknown("category", "missing"));

        let cat_id = tree[0].id.clone();
        assert!(remove(&tree, NodePath::Item { category: &cat_id, item: "nope" }).is_err());
    }

    #[test]
    fn test_rename_preserves_children() {
        let tree = build_tree(2, 2);
        let cat_id = tree[0].id.clone();
        let renamed = rename_category(&tree, &cat_id, "Schooling").unwrap();
        assert_eq!(renamed[0].name, "Schooling");
        assert_eq!(renamed[0].items, tree[0].items);

        let item_id = tree[0].items[1].id.clone();
        let renamed = rename_item(&tree, &cat_id, &item_id, "PhD").unwrap();
        assert_eq!(renamed[0].items[1].name, "PhD");
        assert_eq!(renamed[0].items[1].sub_items, tree[0].items[1].sub_items);
    }

    #[test]
    fn test_sub_item_requires_heading_and_value() {
        let tree = build_tree(1, 0);
        let cat_id = tree[0].id.clone();
        let item_id = tree[0].items[0].id.clone();
        assert_eq!(
            add_sub_item(&tree, &cat_id, &item_id, "CGPA", " ").unwrap_err(),
            ValidationError::EmptyField("value")
        );
        assert_eq!(
            add_sub_item(&tree, &cat_id, &item_id, "", "3.9").unwrap_err(),
            ValidationError::EmptyField("heading")
        );
    }

    #[test]
    fn test_edit_sub_item() {
        let tree = build_tree(1, 1);
        let cat_id = tree[0].id.clone();
        let item_id = tree[0].items[0].id.clone();
        let sub_id = tree[0].items[0].sub_items[0].id.clone();

        let after = edit_sub_item(&tree, &cat_id, &item_id, &sub_id, "CGPA", "3.9").unwrap();
        let sub = &after[0].items[0].sub_items[0];
        assert_eq!(sub.id, sub_id);
        assert_eq!((sub.heading.as_str(), sub.value.as_str()), ("CGPA", "3.9"));
    }

    #[test]
    fn test_export_text() {
        let mut tree = add_category(&[], "Education").unwrap();
        let cat = tree[0].id.clone();
        tree = add_item(&tree, &cat, "MSc").unwrap();
        let item = tree[0].items[0].id.clone();
        tree = add_sub_item(&tree, &cat, &item, "CGPA", "3.9").unwrap();
        tree = add_sub_item(&tree, &cat, &item, "Year", "2020").unwrap();
        tree = add_item(&tree, &cat, "BSc").unwrap();
        tree = add_category(&tree, "Work").unwrap();

        let expected = "### CATEGORY: EDUCATION ###\n[Item] MSc\n  CGPA: 3.9\n  Year: 2020\n\n[Item] BSc\n\n\
                        \n========================\n\n### CATEGORY: WORK ###\n\n";
        assert_eq!(export_text(&tree), expected);
    }
}
