use super::Key;


/// A client as it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Client {
    pub(crate) key: Key,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
}

/// Data required to create a new client. The key is assigned by the store.
#[derive(Debug, Clone)]
pub(crate) struct NewClient {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
}

/// A partial update of a client. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub(crate) struct ClientPatch {
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone: Option<String>,
}

impl Client {
    pub(crate) fn create(key: Key, new: NewClient) -> Self {
        Self {
            key,
            name: new.name,
            email: new.email,
            phone: new.phone,
        }
    }

    /// Overwrites all fields that are set in `patch`.
    pub(crate) fn apply(&mut self, patch: ClientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
    }
}

impl ClientPatch {
    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
