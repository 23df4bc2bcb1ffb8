//! Delete confirmation
//!
//! [`ResourceManager::delete`](super::ResourceManager::delete) only accepts a
//! [`ConfirmedDelete`], and the only way to obtain one is
//! [`DeleteRequest::confirm`], so a delete cannot be issued without going
//! through the confirmation dialog.

/// A pending delete awaiting the user's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub resource_key: String,
    pub id: String,
    /// Identifying label of the target ("Blue Shirt")
    pub label: String,
    pub singular: String,
}

impl DeleteRequest {
    /// Dialog prompt, e.g. `Delete product 'Blue Shirt'?`
    pub fn message(&self) -> String {
        format!("Delete {} '{}'?", self.singular, self.label)
    }

    /// Explicit affirmative answer
    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete {
            resource_key: self.resource_key,
            id: self.id,
            label: self.label,
        }
    }
}

/// Proof that the user confirmed a [`DeleteRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
    resource_key: String,
    id: String,
    label: String,
}

impl ConfirmedDelete {
    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shows_label() {
        let request = DeleteRequest {
            resource_key: "products".to_string(),
            id: "p1".to_string(),
            label: "Blue Shirt".to_string(),
            singular: "product".to_string(),
        };
        assert_eq!(request.message(), "Delete product 'Blue Shirt'?");

        let confirmed = request.confirm();
        assert_eq!(confirmed.id(), "p1");
        assert_eq!(confirmed.resource_key(), "products");
    }
}
