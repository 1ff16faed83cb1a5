use std::fmt;

/// Delimiter of the persisted recipient string
pub const DELIMITER: &str = ";";

/// Token the host writes when no chat was ever configured
pub const UNASSIGNED_TOKEN: &str = "-1";

/// A destination chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// Chat id as Telegram reports it (numeric, or `@channelname`)
    Chat(String),
    /// The `-1` placeholder. Kept in storage, never sent to.
    Unassigned,
}

impl Recipient {
    pub fn parse(token: &str) -> Self {
        if token == UNASSIGNED_TOKEN {
            Recipient::Unassigned
        } else {
            Recipient::Chat(token.to_string())
        }
    }

    pub fn chat_id(&self) -> Option<&str> {
        match self {
            Recipient::Chat(id) => Some(id),
            Recipient::Unassigned => None,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Chat(id) => f.write_str(id),
            Recipient::Unassigned => f.write_str(UNASSIGNED_TOKEN),
        }
    }
}

/// Insertion-ordered recipient set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientList {
    entries: Vec<Recipient>,
}

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the persisted form. Empty tokens are dropped, duplicates keep their
    /// first position.
    pub fn parse(raw: &str) -> Self {
        let mut list = Self::new();
        list.extend(
            raw.split(DELIMITER)
                .filter(|token| !token.is_empty())
                .map(Recipient::parse),
        );
        list
    }

    /// Add a recipient unless already present. Returns whether it was added.
    pub fn insert(&mut self, recipient: Recipient) -> bool {
        if self.entries.contains(&recipient) {
            return false;
        }
        self.entries.push(recipient);
        true
    }

    /// Add recipients in order, skipping known ones. Returns how many were new.
    pub fn extend(&mut self, recipients: impl IntoIterator<Item = Recipient>) -> usize {
        recipients
            .into_iter()
            .filter(|r| self.insert(r.clone()))
            .count()
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(DELIMITER)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> {
        self.entries.iter()
    }

    /// Chat ids that can actually be sent to
    pub fn chat_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(Recipient::chat_id)
    }

    pub fn contains(&self, recipient: &Recipient) -> bool {
        self.entries.contains(recipient)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
