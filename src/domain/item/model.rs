use chrono::{DateTime, Utc};

/// Upper bound on a listing price in minor units (one billion in major units).
pub const MAX_PRICE: i64 = 100_000_000_000;

/// Product listing. Prices are integer minor units (cents).
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub large_image: Option<String>,
    pub price: i64,
    /// Creator of the listing.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub large_image: Option<String>,
    pub price: i64,
    pub user_id: String,
}

/// Partial update. The id is not part of the payload, so it can never change.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub large_image: Option<String>,
    pub price: Option<i64>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.large_image.is_none()
            && self.price.is_none()
    }

    pub fn apply(self, item: &mut Item) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(image) = self.image {
            item.image = Some(image);
        }
        if let Some(large_image) = self.large_image {
            item.large_image = Some(large_image);
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }
}

/// Listing order for the item catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    PriceAsc,
    PriceDesc,
    TitleAsc,
    TitleDesc,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: "item-1".into(),
            title: "Wool socks".into(),
            description: "Warm".into(),
            image: None,
            large_image: None,
            price: 1500,
            user_id: "user-1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn apply_touches_only_supplied_fields() {
        let mut item = sample_item();
        ItemChanges {
            title: Some("Merino socks".into()),
            ..Default::default()
        }
        .apply(&mut item);

        assert_eq!(item.id, "item-1");
        assert_eq!(item.title, "Merino socks");
        assert_eq!(item.description, "Warm");
        assert_eq!(item.price, 1500);
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(ItemChanges::default().is_empty());
        assert!(!ItemChanges {
            price: Some(0),
            ..Default::default()
        }
        .is_empty());
    }
}
